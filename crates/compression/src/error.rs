//! Envelope error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid {kind} stream: {source}")]
    Inflate {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} compression failed: {source}")]
    Deflate {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("XOR key produced bytes that are not valid UTF-8")]
    NonUtf8Output,
}
