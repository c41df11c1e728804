//! axum integration: serve an [`Adapter`] as the host-facing route of one function.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};

use funcbridge_envelope::EnvelopeError;
use funcbridge_exchange::Scope;

use crate::adapter::{Adapter, AdapterReply};

/// Largest invocation body accepted from the host.
pub const MAX_ENVELOPE_BYTES: usize = 100 * 1024 * 1024;

impl IntoResponse for AdapterReply {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// A POST route invoking `adapter` with the request body as the envelope.
///
/// If an earlier layer put an `Arc<Scope>` into the request extensions,
/// it becomes the outer scope of the invocation; otherwise the adapter's
/// own outer scope is used.
pub fn invocation_route<S>(adapter: Arc<Adapter>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    post(move |request: Request| {
        let adapter = adapter.clone();
        async move { serve(&adapter, request).await }
    })
}

async fn serve(adapter: &Adapter, request: Request<Body>) -> AdapterReply {
    let outer = request
        .extensions()
        .get::<Arc<Scope>>()
        .cloned()
        .unwrap_or_else(|| adapter.outer_scope());

    match axum::body::to_bytes(request.into_body(), MAX_ENVELOPE_BYTES).await {
        Ok(raw) => adapter.process_in(&raw, outer).await,
        Err(err) => AdapterReply::from_result(Err(EnvelopeError::MalformedEnvelope(err.to_string()))),
    }
}
