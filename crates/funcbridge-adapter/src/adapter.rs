//! The invocation pipeline: decode, synthesize, invoke, reassemble.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, warn};

use funcbridge_core::Settings;
use funcbridge_envelope::{codec, EnvelopeError, EnvelopeResult, ResponseEnvelope};
use funcbridge_exchange::{synthesize, Scope, ScopedContext, StatusCode};

use crate::dump;
use crate::handler::{Handler, HandlerFailure};
use crate::invoke::invoke;
use crate::mapper::{error_body, failure_envelope, transport_status};
use crate::reassemble::reassemble;

/// What goes back to the host over the real transport.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterReply {
    pub status: StatusCode,
    /// JSON: either a response envelope or an error object.
    pub body: Bytes,
}

impl AdapterReply {
    /// A 200 carrying `envelope`.
    pub fn from_envelope(envelope: &ResponseEnvelope) -> Self {
        match codec::encode(envelope) {
            Ok(body) => Self {
                status: StatusCode::OK,
                body,
            },
            Err(err) => {
                error!(error = %err, "failed to encode response envelope");
                Self::from_error(&err)
            }
        }
    }

    pub fn from_error(err: &EnvelopeError) -> Self {
        Self {
            status: transport_status(err),
            body: error_body(err),
        }
    }

    pub fn from_result(result: EnvelopeResult<ResponseEnvelope>) -> Self {
        match result {
            Ok(envelope) => Self::from_envelope(&envelope),
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "rejected invocation envelope");
                Self::from_error(&err)
            }
        }
    }
}

/// Wraps one handler so it can be invoked through the host's envelope.
///
/// Holds no mutable state; one adapter serves any number of concurrent
/// invocations.
pub struct Adapter {
    binding: String,
    handler: Arc<dyn Handler>,
    outer: Arc<Scope>,
    body_dump: bool,
}

impl Adapter {
    /// Adapt `handler`, reading the HTTP trigger from binding `binding`.
    pub fn new(binding: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            binding: binding.into(),
            handler: Arc::new(handler),
            outer: Arc::new(Scope::new()),
            body_dump: false,
        }
    }

    pub fn from_settings(settings: &Settings, handler: impl Handler) -> Self {
        Self::new(settings.http_binding.clone(), handler).with_body_dump(settings.body_dump)
    }

    /// Scope used as the outer scope when the caller supplies none.
    pub fn with_outer_scope(mut self, outer: Arc<Scope>) -> Self {
        self.outer = outer;
        self
    }

    pub fn with_body_dump(mut self, enabled: bool) -> Self {
        self.body_dump = enabled;
        self
    }

    pub fn binding(&self) -> &str {
        &self.binding
    }

    pub fn outer_scope(&self) -> Arc<Scope> {
        self.outer.clone()
    }

    /// Process one raw invocation against the adapter's own outer scope.
    pub async fn process(&self, raw: &[u8]) -> AdapterReply {
        self.process_in(raw, self.outer.clone()).await
    }

    /// Process one raw invocation whose handler context falls through to `outer`.
    pub async fn process_in(&self, raw: &[u8], outer: Arc<Scope>) -> AdapterReply {
        let reply = AdapterReply::from_result(self.run(raw, outer).await);
        if self.body_dump {
            dump::log_body_dump(raw, &reply.body);
        }
        reply
    }

    async fn run(&self, raw: &[u8], outer: Arc<Scope>) -> EnvelopeResult<ResponseEnvelope> {
        let envelope = codec::decode(raw)?;
        let payload = codec::extract_binding(&envelope, &self.binding)?;
        let trigger = codec::decode_trigger(payload)?;
        let mut exchange = synthesize(trigger)?;
        let mut ctx = ScopedContext::new(outer);

        match invoke(self.handler.as_ref(), &mut exchange, &mut ctx).await {
            Ok(()) => {
                let envelope = reassemble(exchange, &ctx);
                debug!(
                    status = envelope.return_value.as_ref().map(|rv| rv.status),
                    outputs = envelope.outputs.len(),
                    "handler completed"
                );
                Ok(envelope)
            }
            Err(failure) => {
                match &failure {
                    HandlerFailure::Classified { status, message } => {
                        warn!(status = status.as_u16(), %message, "handler returned classified failure");
                    }
                    HandlerFailure::Unclassified(err) => {
                        error!(error = ?err, "handler failed");
                    }
                }
                Ok(failure_envelope(&failure))
            }
        }
    }
}
