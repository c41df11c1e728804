//! funcbridged — custom handler process for the functions host.
//!
//! The host forwards every invocation as a POST to `/<function name>` with
//! an invocation envelope as body, and expects a response envelope back.
//!
//! # Routes
//!
//! | Method | Path | Function |
//! |---|---|---|
//! | POST | `/hello` | adapted: `200 Hello, World!` |
//! | POST | `/echo` | adapted: echoes body and content type |
//! | POST | `/enqueue` | adapted: JSON body to the queue output binding |
//! | POST | `/publish` | adapted: JSON body as an Event Grid event |
//! | POST | `/process` | queue-triggered, reads the queue binding |
//! | GET | `/` | liveness probe |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, MethodRouter};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use funcbridge_adapter::{handler_fn, invocation_route, Adapter, Handler};
use funcbridge_core::Settings;
use funcbridge_exchange::Scope;

use crate::handlers::{EnqueueHandler, PublishHandler};

/// Header carrying the host's id for the current invocation.
pub const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";
/// Scope key under which handlers find the invocation id.
pub const INVOCATION_ID_KEY: &str = "InvocationId";

/// Build the host-facing router.
pub fn build_router(settings: Arc<Settings>) -> Router {
    Router::new()
        .route("/hello", adapted(&settings, handler_fn(handlers::hello)))
        .route("/echo", adapted(&settings, handler_fn(handlers::echo)))
        .route("/enqueue", adapted(&settings, EnqueueHandler::new(settings.clone())))
        .route("/publish", adapted(&settings, PublishHandler::new(settings.clone())))
        .route("/process", post(handlers::process).with_state(settings))
        .route("/", get(|| async { StatusCode::NO_CONTENT }))
        .layer(middleware::from_fn(invocation_scope))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

fn adapted(settings: &Settings, handler: impl Handler) -> MethodRouter {
    invocation_route(Arc::new(Adapter::from_settings(settings, handler)))
}

/// Seed the outer scope of each invocation with the host's invocation id.
pub async fn invocation_scope(mut request: Request, next: Next) -> Response {
    let mut scope = Scope::new();
    if let Some(id) = request
        .headers()
        .get(INVOCATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        scope.set(INVOCATION_ID_KEY, id);
    }
    request.extensions_mut().insert(Arc::new(scope));
    next.run(request).await
}
