//! Maps failures onto what the host receives.
//!
//! | Failure | Transport status | Envelope |
//! |---|---|---|
//! | malformed envelope, missing or bad binding | 400 | none, `{"message": ...}` |
//! | envelope could not be encoded | 500 | none, `{"message": ...}` |
//! | classified handler failure | 200 | declared status and message |
//! | unclassified handler failure | 200 | 500, `Internal Server Error` |

use bytes::Bytes;
use serde::Serialize;

use funcbridge_envelope::{EnvelopeError, HttpReturnValue, OutputSet, ResponseEnvelope};
use funcbridge_exchange::StatusCode;

use crate::handler::{HandlerFailure, INTERNAL_SERVER_ERROR_BODY};

/// Envelope for a handler failure. Outputs are always dropped.
pub fn failure_envelope(failure: &HandlerFailure) -> ResponseEnvelope {
    let return_value = match failure {
        HandlerFailure::Classified { status, message } => {
            HttpReturnValue::new(status.as_u16(), message.clone())
        }
        HandlerFailure::Unclassified(_) => HttpReturnValue::new(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            INTERNAL_SERVER_ERROR_BODY,
        ),
    };
    ResponseEnvelope::http(return_value, OutputSet::new())
}

/// Transport status for an envelope-level failure.
pub fn transport_status(err: &EnvelopeError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Raw error body for an envelope-level failure.
pub fn error_body(err: &EnvelopeError) -> Bytes {
    let message = err.to_string();
    match serde_json::to_vec(&ErrorBody { message: &message }) {
        Ok(body) => Bytes::from(body),
        Err(_) => Bytes::from_static(br#"{"message":"Internal Server Error"}"#),
    }
}
