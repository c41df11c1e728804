//! funcbridge-exchange — the virtual HTTP exchange a handler runs against.
//!
//! ```text
//! TriggerDescription
//!   │
//!   ├── synthesize() → Request (immutable) + ResponseSink (captures output)
//!   │
//!   ▼
//! handler(&mut VirtualExchange, &mut ScopedContext)
//! ```
//!
//! Header names are folded to canonical case on the way in and the way
//! out; multi-valued headers collapse to their last value in both
//! directions.

mod header;
mod request;
mod response;
pub mod scope;
pub mod synthesize;

pub use header::{canonical_name, Header, HeaderMap};
pub use request::Request;
pub use response::{ResponseSink, APPLICATION_JSON, CONTENT_TYPE, LOCATION, TEXT_PLAIN_UTF8};
pub use scope::{Scope, ScopedContext, OUTPUTS_KEY};
pub use synthesize::{synthesize, VirtualExchange};

pub use http::{Method, StatusCode, Uri};
