//! Plist reader error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlistError {
    #[error("invalid XML at byte {0}: {1}")]
    Syntax(usize, &'static str),
    #[error("invalid XML: unexpected end of input")]
    UnexpectedEof,
    #[error("mismatched closing tag `</{found}>` for `<{expected}>`")]
    MismatchedTag { expected: String, found: String },
    #[error("invalid entity `&{0};`")]
    InvalidEntity(String),
    #[error("unexpected plist tag `<{0}>`")]
    UnexpectedTag(String),
    #[error("expected a `<k>` key element, found `<{0}>`")]
    ExpectedKey(String),
    #[error("dict node has a key without a value")]
    UnbalancedDict,
    #[error("invalid {kind} value `{text}`")]
    InvalidNumber { kind: &'static str, text: String },
    #[error("document root must be `<plist>`, found `<{0}>`")]
    UnexpectedRoot(String),
    #[error("`<plist>` element must contain exactly one container")]
    EmptyDocument,
}
