//! Transport-level error taxonomy.

use thiserror::Error;

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Failures that mean the adapter cannot trust the envelope at all.
///
/// The first three are the caller's fault and surface to the host as a
/// real 400. `Encode` only happens if a reply cannot be serialized.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed invocation envelope: {0}")]
    MalformedEnvelope(String),

    #[error("http binding not found: {0}")]
    BindingNotFound(String),

    #[error("incorrect http binding: {0}")]
    InvalidTriggerBinding(String),

    #[error("failed to encode response envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EnvelopeError {
    /// Short, stable name of the failure kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "malformed_envelope",
            Self::BindingNotFound(_) => "binding_not_found",
            Self::InvalidTriggerBinding(_) => "invalid_trigger_binding",
            Self::Encode(_) => "encode",
        }
    }

    /// Whether the caller sent something unusable (as opposed to a local fault).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Encode(_))
    }
}
