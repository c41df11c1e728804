//! The handler capability and its failure type.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use funcbridge_exchange::{ScopedContext, StatusCode, VirtualExchange};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type HandlerResult = Result<(), HandlerFailure>;

/// Body sent for failures the handler did not classify.
pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// How a handler failed.
///
/// A classified failure is a deliberate HTTP outcome ("not found",
/// "bad request") and is shown to the caller as such. Anything else is
/// unclassified: it is logged in full and the caller only sees a 500.
///
/// Every `std::error::Error` converts into an unclassified failure, so `?`
/// works inside handlers.
#[derive(Debug)]
pub enum HandlerFailure {
    Classified { status: StatusCode, message: String },
    Unclassified(anyhow::Error),
}

impl HandlerFailure {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Classified {
            status,
            message: message.into(),
        }
    }

    /// A classified failure whose message is the status' reason phrase.
    pub fn from_status(status: StatusCode) -> Self {
        Self::status(status, status.canonical_reason().unwrap_or_default())
    }

    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn unclassified(err: impl Into<anyhow::Error>) -> Self {
        Self::Unclassified(err.into())
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Classified { .. })
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classified { status, message } => {
                write!(f, "code={}, message={message}", status.as_u16())
            }
            Self::Unclassified(err) => write!(f, "{err:#}"),
        }
    }
}

impl<E> From<E> for HandlerFailure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Unclassified(anyhow::Error::new(err))
    }
}

/// Request-handling capability run against a virtual exchange.
///
/// The handler reads `exchange.request`, writes `exchange.response`, and may
/// use `ctx` for side-channel values such as output bindings.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        exchange: &'a mut VirtualExchange,
        ctx: &'a mut ScopedContext,
    ) -> BoxFuture<'a, HandlerResult>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(
        &'a self,
        exchange: &'a mut VirtualExchange,
        ctx: &'a mut ScopedContext,
    ) -> BoxFuture<'a, HandlerResult> {
        (**self).call(exchange, ctx)
    }
}

/// A [`Handler`] backed by a synchronous function.
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a synchronous function as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut VirtualExchange, &mut ScopedContext) -> HandlerResult + Send + Sync + 'static,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut VirtualExchange, &mut ScopedContext) -> HandlerResult + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        exchange: &'a mut VirtualExchange,
        ctx: &'a mut ScopedContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { (self.f)(exchange, ctx) })
    }
}
