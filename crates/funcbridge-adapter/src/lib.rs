//! funcbridge-adapter — runs ordinary HTTP handlers behind the functions
//! host's invocation envelope.
//!
//! # Pipeline
//!
//! ```text
//! host POST (envelope JSON)
//!   │
//!   ├── codec::decode / extract_binding / decode_trigger
//!   ├── synthesize()          → VirtualExchange
//!   ├── ScopedContext::new()  → inner scope over the caller's scope
//!   ├── invoke(handler)       → Ok | Classified | Unclassified
//!   ├── reassemble() or failure_envelope()
//!   │
//!   ▼
//! 200 + response envelope   (400 for envelopes that cannot be trusted)
//! ```
//!
//! Handler failures never become transport failures: the host always
//! sees a successful call whose `ReturnValue.Status` carries the result
//! of the simulated exchange.

mod adapter;
pub mod dump;
pub mod handler;
pub mod invoke;
pub mod mapper;
pub mod reassemble;
pub mod route;

pub use adapter::{Adapter, AdapterReply};
pub use handler::{handler_fn, BoxFuture, FnHandler, Handler, HandlerFailure, HandlerResult};
pub use invoke::invoke;
pub use reassemble::reassemble;
pub use route::invocation_route;
