//! Turns a finished exchange back into a response envelope.

use funcbridge_envelope::{HttpReturnValue, ResponseEnvelope};
use funcbridge_exchange::{ScopedContext, VirtualExchange};

/// Build the envelope for a handler that returned successfully.
///
/// Status, body and headers come straight from the sink, so a handler
/// that never set a status reports 500. Headers are flattened with the
/// last value winning. A body that is not UTF-8 is converted lossily.
pub fn reassemble(exchange: VirtualExchange, ctx: &ScopedContext) -> ResponseEnvelope {
    let (status, headers, body) = exchange.response.into_parts();
    let return_value = HttpReturnValue {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
        headers: headers.flatten(),
    };
    ResponseEnvelope::http(return_value, ctx.outputs())
}
