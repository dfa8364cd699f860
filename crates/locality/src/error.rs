//! Error types for the locality library.

use thiserror::Error;

/// Result type alias for the locality library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding a tiered identity from the record or wire form.
///
/// Decoding is all-or-nothing: when one of these is returned no identity was
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A field is missing, has the wrong type, or holds an invalid value.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField { field: String, reason: String },
}

impl DecodeError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::MalformedField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The path of the offending field, e.g. `tiers[1].value`.
    pub fn field(&self) -> &str {
        match self {
            DecodeError::MalformedField { field, .. } => field,
        }
    }
}

/// Errors produced by an [`AddressResolver`](crate::resolver::AddressResolver).
///
/// These never escape tier matching; they only select the string-comparison
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown host `{0}`")]
    UnknownHost(String),
    #[error("lookup of `{host}` timed out after {timeout_ms} ms")]
    Timeout { host: String, timeout_ms: u64 },
    #[error("lookup of `{host}` failed: {reason}")]
    Lookup { host: String, reason: String },
}

/// Errors raised while loading [`LocalityConfig`](crate::config::LocalityConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors that can occur in the locality library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Encoding failed (only possible for pathological inputs).
    #[error("encode failed: {0}")]
    Encode(String),
}
