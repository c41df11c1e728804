//! Runs a handler once against a virtual exchange.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use funcbridge_exchange::{ScopedContext, VirtualExchange};

use crate::handler::{Handler, HandlerFailure, HandlerResult};

/// Run `handler` to completion.
///
/// A panic inside the handler is a code defect and comes back as an
/// unclassified failure instead of unwinding into the host-facing server.
pub async fn invoke(
    handler: &dyn Handler,
    exchange: &mut VirtualExchange,
    ctx: &mut ScopedContext,
) -> HandlerResult {
    let call = async { handler.call(exchange, ctx).await };
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HandlerFailure::unclassified(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use funcbridge_exchange::{HeaderMap, Method, Request, StatusCode, Uri};

    use super::*;
    use crate::handler::{handler_fn, BoxFuture};

    fn exchange() -> VirtualExchange {
        VirtualExchange::new(Request::empty(
            Method::GET,
            Uri::from_static("/"),
            HeaderMap::new(),
        ))
    }

    #[tokio::test]
    async fn success_leaves_output_in_sink() {
        let handler = handler_fn(|ex, _ctx| {
            ex.response.text(StatusCode::OK, "ok");
            Ok(())
        });
        let mut ex = exchange();
        let mut ctx = ScopedContext::detached();

        invoke(&handler, &mut ex, &mut ctx).await.unwrap();
        assert_eq!(ex.response.status(), StatusCode::OK);
        assert_eq!(ex.response.body(), b"ok");
    }

    #[tokio::test]
    async fn classified_failure_passes_through() {
        let handler = handler_fn(|_ex, _ctx| Err(HandlerFailure::not_found()));
        let failure = invoke(&handler, &mut exchange(), &mut ScopedContext::detached())
            .await
            .unwrap_err();
        assert!(failure.is_classified());
    }

    #[tokio::test]
    async fn panic_becomes_unclassified() {
        let handler = handler_fn(|_ex, _ctx| panic!("index out of bounds"));
        let failure = invoke(&handler, &mut exchange(), &mut ScopedContext::detached())
            .await
            .unwrap_err();
        assert!(!failure.is_classified());
        assert!(failure.to_string().contains("index out of bounds"));
    }

    struct Counter;

    impl Handler for Counter {
        fn call<'a>(
            &'a self,
            exchange: &'a mut VirtualExchange,
            ctx: &'a mut ScopedContext,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                tokio::task::yield_now().await;
                ctx.set_output("count", &1)?;
                exchange.response.no_content(StatusCode::ACCEPTED);
                Ok::<_, HandlerFailure>(())
            })
        }
    }

    #[tokio::test]
    async fn async_handler_runs_to_completion() {
        let mut ex = exchange();
        let mut ctx = ScopedContext::detached();
        invoke(&Counter, &mut ex, &mut ctx).await.unwrap();
        assert_eq!(ex.response.status(), StatusCode::ACCEPTED);
        assert_eq!(ctx.outputs()["count"], 1);
    }
}
