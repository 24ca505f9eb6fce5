//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::casting::CastError;
use crate::plist::PlistError;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Cast(#[from] CastError),
    #[error(transparent)]
    Plist(#[from] PlistError),
    #[error(transparent)]
    Compression(#[from] gdform_compression::CompressionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{type_name}: expected at most {expected} tokens, found {found}")]
    TooManyTokens {
        type_name: String,
        expected: usize,
        found: usize,
    },
    #[error("expected key/value pairs, found an odd token count ({0})")]
    OddTokenCount(usize),
    #[error("{type_name}: unknown key `{key}`")]
    UnknownKey { type_name: String, key: String },
    #[error("{type_name}: unknown field `{field}`")]
    UnknownField { type_name: String, field: String },
    #[error("{type_name}: missing field `{field}`")]
    MissingField { type_name: String, field: String },
    #[error("expected groups of {size} tokens, found {found}")]
    GroupSize { size: usize, found: usize },
    #[error("expected `{prefix}...{suffix}` around `{input}`")]
    MissingDelimiter {
        prefix: String,
        suffix: String,
        input: String,
    },
    #[error("expected a `.{expected}` file, found `{}`", path.display())]
    Extension { expected: String, path: PathBuf },
    #[error("no path given and no default path configured")]
    MissingPath,
    #[error("`{}` is a directory and no file name can be derived", path.display())]
    NoFileName { path: PathBuf },
    #[error("file is not valid UTF-8")]
    InvalidUtf8,
    #[error("{type_name}.{field}: {source}")]
    Context {
        type_name: String,
        field: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wraps `self` with the record type and the field or key being processed.
    pub fn context(self, type_name: &str, field: impl Into<String>) -> Self {
        CodecError::Context {
            type_name: type_name.to_owned(),
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any [`CodecError::Context`] layers.
    pub fn root(&self) -> &CodecError {
        match self {
            CodecError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}
