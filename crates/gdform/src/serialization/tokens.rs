//! Splitting and joining of delimited token strings.
//!
//! No escaping exists in these formats: a separator never occurs inside a
//! value, so splitting is a plain substring split.

use crate::error::CodecError;

/// Splits `s` into tokens.
///
/// - An empty input yields no tokens.
/// - An empty separator yields one token per character.
/// - With `keep_separator`, one trailing separator is stripped before
///   splitting and then re-appended to every token, for formats where each
///   record is terminated by the separator (`1,1,2,15;1,2,2,30;`).
///
/// ```
/// use gdform::serialization::tokens::split;
///
/// assert_eq!(split("1,2,3", ",", false), ["1", "2", "3"]);
/// assert_eq!(split("a;b;", ";", true), ["a;", "b;"]);
/// assert_eq!(split("ab", "", false), ["a", "b"]);
/// ```
pub fn split(s: &str, separator: &str, keep_separator: bool) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    if separator.is_empty() {
        return s.chars().map(String::from).collect();
    }
    if keep_separator {
        let body = s.strip_suffix(separator).unwrap_or(s);
        return body
            .split(separator)
            .map(|token| format!("{token}{separator}"))
            .collect();
    }
    s.split(separator).map(str::to_owned).collect()
}

/// Joins tokens with `separator`.
///
/// With `keep_separator` the tokens already carry their terminator and are
/// concatenated as they are.
pub fn join<S: AsRef<str>>(tokens: &[S], separator: &str, keep_separator: bool) -> String {
    let capacity = tokens.iter().map(|t| t.as_ref().len() + separator.len()).sum();
    let mut out = String::with_capacity(capacity);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && !keep_separator {
            out.push_str(separator);
        }
        out.push_str(token.as_ref());
    }
    out
}

/// Pairs up an alternating key/value token stream.
pub fn split_pairs<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<(&str, &str)>, CodecError> {
    if tokens.len() % 2 != 0 {
        return Err(CodecError::OddTokenCount(tokens.len()));
    }
    Ok(tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].as_ref(), pair[1].as_ref()))
        .collect())
}

/// Cuts tokens into windows of exactly `size`.
pub fn group<T>(tokens: &[T], size: usize) -> Result<Vec<&[T]>, CodecError> {
    let size = size.max(1);
    if tokens.len() % size != 0 {
        return Err(CodecError::GroupSize {
            size,
            found: tokens.len(),
        });
    }
    Ok(tokens.chunks_exact(size).collect())
}

/// A fixed literal prefix and suffix around a string form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delimiter {
    pub prefix: String,
    pub suffix: String,
}

impl Delimiter {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::new(String::new(), suffix)
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(prefix, String::new())
    }

    /// Removes the prefix and suffix, failing if either is missing.
    pub fn strip<'a>(&self, s: &'a str) -> Result<&'a str, CodecError> {
        s.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
            .ok_or_else(|| CodecError::MissingDelimiter {
                prefix: self.prefix.clone(),
                suffix: self.suffix.clone(),
                input: s.to_owned(),
            })
    }

    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(body);
        out.push_str(&self.suffix);
        out
    }
}
