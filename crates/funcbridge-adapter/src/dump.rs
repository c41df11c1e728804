//! Request/response body dump logging.

use serde_json::Value;
use tracing::info;

/// Embed raw bytes in a log record: as JSON when they parse, else as a string.
pub fn into_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

pub fn log_body_dump(req: &[u8], res: &[u8]) {
    info!(
        target: "funcbridge::dump",
        req = %into_json(req),
        res = %into_json(res),
        "body dump"
    );
}
