//! Functions served by funcbridged.
//!
//! Everything except [`process`] is an ordinary HTTP handler run through
//! the adapter. `process` is queue-triggered and reads the envelope
//! directly.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use serde_json::Value;
use tracing::info;

use funcbridge_adapter::route::MAX_ENVELOPE_BYTES;
use funcbridge_adapter::{AdapterReply, BoxFuture, Handler, HandlerFailure, HandlerResult};
use funcbridge_core::Settings;
use funcbridge_envelope::{codec, EnvelopeError, EnvelopeResult, EventGridEvent, ResponseEnvelope};
use funcbridge_exchange::{ScopedContext, StatusCode, VirtualExchange, CONTENT_TYPE, TEXT_PLAIN_UTF8};

/// Output binding that receives published events.
pub const EVENT_OUTPUT: &str = "outEvent";
/// Settings key naming the event type of published events.
pub const EVENT_TYPE_VAR: &str = "EVENT_TYPE";
pub const EVENT_DATA_VERSION: &str = "1";

pub fn hello(exchange: &mut VirtualExchange, _ctx: &mut ScopedContext) -> HandlerResult {
    exchange.response.text(StatusCode::OK, "Hello, World!");
    Ok(())
}

/// Reply with the request body and content type.
pub fn echo(exchange: &mut VirtualExchange, _ctx: &mut ScopedContext) -> HandlerResult {
    let content_type = exchange
        .request
        .headers()
        .get(CONTENT_TYPE)
        .unwrap_or(TEXT_PLAIN_UTF8)
        .to_string();
    let body = exchange.request.body_bytes().clone();

    let response = &mut exchange.response;
    response.headers_mut().set(CONTENT_TYPE, content_type);
    response.set_status(StatusCode::OK);
    response.write_bytes(&body);
    Ok(())
}

fn json_body(exchange: &VirtualExchange) -> Result<Value, HandlerFailure> {
    serde_json::from_slice(exchange.request.body_bytes())
        .map_err(|e| HandlerFailure::bad_request(format!("request body is not JSON: {e}")))
}

/// Forward a JSON document to the queue output binding.
pub struct EnqueueHandler {
    settings: Arc<Settings>,
}

impl EnqueueHandler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Handler for EnqueueHandler {
    fn call<'a>(
        &'a self,
        exchange: &'a mut VirtualExchange,
        ctx: &'a mut ScopedContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let message = json_body(exchange)?;
            ctx.set_output(self.settings.queue_binding.clone(), &message)?;
            exchange.response.no_content(StatusCode::ACCEPTED);
            Ok::<_, HandlerFailure>(())
        })
    }
}

/// Wrap a JSON document in an Event Grid event on the event output binding.
pub struct PublishHandler {
    settings: Arc<Settings>,
}

impl PublishHandler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl Handler for PublishHandler {
    fn call<'a>(
        &'a self,
        exchange: &'a mut VirtualExchange,
        ctx: &'a mut ScopedContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let data = json_body(exchange)?;
            let event_type = self.settings.var(EVENT_TYPE_VAR)?;
            let event = EventGridEvent::new(
                exchange.request.path(),
                event_type,
                EVENT_DATA_VERSION,
                &data,
            )?;
            ctx.set_output(EVENT_OUTPUT, &event)?;
            exchange.response.no_content(StatusCode::ACCEPTED);
            Ok::<_, HandlerFailure>(())
        })
    }
}

/// Queue-triggered function: log the message and acknowledge it.
///
/// Envelopes get the same size limit as on adapted routes.
pub async fn process(State(settings): State<Arc<Settings>>, body: Body) -> AdapterReply {
    let result = match axum::body::to_bytes(body, MAX_ENVELOPE_BYTES).await {
        Ok(raw) => consume_queue_message(&settings, &raw),
        Err(err) => Err(EnvelopeError::MalformedEnvelope(err.to_string())),
    };
    AdapterReply::from_result(result)
}

fn consume_queue_message(settings: &Settings, raw: &[u8]) -> EnvelopeResult<ResponseEnvelope> {
    let envelope = codec::decode(raw)?;
    let payload = codec::extract_binding(&envelope, &settings.queue_binding)?;
    let message: Value = codec::decode_binding(payload)?;
    info!(binding = %settings.queue_binding, %message, "queue message received");
    Ok(ResponseEnvelope::empty())
}
