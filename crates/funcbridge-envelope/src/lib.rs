//! funcbridge-envelope — the JSON envelopes exchanged with the functions host.
//!
//! The host POSTs an [`InvocationEnvelope`] whose `Data` maps binding names
//! to opaque payloads. Payloads stay undecoded until a consumer asks for a
//! specific binding, either as an HTTP [`TriggerDescription`]
//! ([`decode_trigger`]) or as an arbitrary document ([`decode_binding`]).
//! The reply is a [`ResponseEnvelope`] encoded with [`encode`].

pub mod codec;
mod error;
pub mod event;
pub mod types;

pub use codec::{decode, decode_binding, decode_trigger, encode, extract_binding};
pub use error::{EnvelopeError, EnvelopeResult};
pub use event::EventGridEvent;
pub use types::{HttpReturnValue, InvocationEnvelope, OutputSet, ResponseEnvelope, TriggerDescription};
