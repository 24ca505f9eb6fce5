//! Separator-delimited sequences.

use super::caster::{Caster, Kwargs};
use super::tokens::{self, Delimiter};
use crate::casting::{serialize, CastError};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::Value;

/// Decodes `a,b,c` style strings into lists, item by item through a [`Caster`].
///
/// With a group size above one, tokens are consumed in fixed windows and each
/// window is handed to the item caster as a [`Value::List`] of token strings;
/// on encode the item caster must produce exactly that many values.
#[derive(Debug, Clone)]
pub struct ListCodec {
    separator: String,
    keep_separator: bool,
    group_size: usize,
    delimiter: Option<Delimiter>,
    item: Caster,
}

impl ListCodec {
    pub fn new(separator: impl Into<String>, item: Caster) -> Self {
        Self {
            separator: separator.into(),
            keep_separator: false,
            group_size: 1,
            delimiter: None,
            item,
        }
    }

    /// Items carry their own trailing separator.
    pub fn keep_separator(mut self) -> Self {
        self.keep_separator = true;
        self
    }

    pub fn grouped(mut self, size: usize) -> Self {
        self.group_size = size.max(1);
        self
    }

    pub fn delimited(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn decode(&self, s: &str, kwargs: &Kwargs) -> Result<Vec<Value>, CodecError> {
        let body = match &self.delimiter {
            Some(delimiter) => delimiter.strip(s)?,
            None => s,
        };
        let tokens = tokens::split(body, &self.separator, self.keep_separator);
        if self.group_size == 1 {
            return tokens
                .into_iter()
                .map(|token| self.item.decode(Value::Str(token), kwargs))
                .collect();
        }
        tokens::group(&tokens, self.group_size)?
            .into_iter()
            .map(|window| {
                let window = window.iter().cloned().map(Value::Str).collect();
                self.item.decode(Value::List(window), kwargs)
            })
            .collect()
    }

    pub fn encode(
        &self,
        items: &[Value],
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let mut out = Vec::with_capacity(items.len() * self.group_size);
        for item in items {
            let Some(encoded) = self.item.encode(item, options, kwargs)? else {
                continue;
            };
            if self.group_size == 1 {
                out.push(serialize(&encoded, options)?);
                continue;
            }
            match encoded {
                Value::List(window) if window.len() == self.group_size => {
                    for value in &window {
                        out.push(serialize(value, options)?);
                    }
                }
                Value::List(window) => {
                    return Err(CodecError::GroupSize {
                        size: self.group_size,
                        found: window.len(),
                    })
                }
                other => {
                    return Err(CastError::UnexpectedKind {
                        expected: "list",
                        found: other.type_name(),
                    }
                    .into())
                }
            }
        }
        let joined = tokens::join(&out, &self.separator, self.keep_separator);
        Ok(match &self.delimiter {
            Some(delimiter) => delimiter.wrap(&joined),
            None => joined,
        })
    }

    /// A caster that decodes a string field into a list with this codec.
    pub fn into_caster(self) -> Caster {
        let decoder = self.clone();
        Caster::new(
            move |raw, kwargs| match raw {
                Value::Str(s) => Ok(Value::List(decoder.decode(&s, kwargs)?)),
                Value::List(items) => Ok(Value::List(items)),
                other => Err(CastError::UnexpectedKind {
                    expected: "list",
                    found: other.type_name(),
                }
                .into()),
            },
            move |value, options, kwargs| match value {
                Value::List(items) => Ok(Some(Value::Str(self.encode(items, options, kwargs)?))),
                other => Err(CastError::UnexpectedKind {
                    expected: "list",
                    found: other.type_name(),
                }
                .into()),
            },
        )
    }
}
