//! Primitive caster error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CastError {
    #[error("invalid boolean `{0}`")]
    InvalidBool(String),
    #[error("invalid integer `{0}`")]
    InvalidInt(String),
    #[error("invalid float `{0}`")]
    InvalidFloat(String),
    #[error("invalid base64 text: {0}")]
    InvalidBase64(#[from] gdform_compression::CompressionError),
    #[error("cannot serialize a value of type `{0}`")]
    UnsupportedType(String),
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },
}
