//! Alternating key/value codecs driven by a [`FunctionTable`].

use super::caster::{Caster, FunctionTable, Kwargs};
use super::tokens::{self, Delimiter};
use crate::casting::{serialize, CastError};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::plist::{self, Element, PlistError};
use crate::value::{Key, Map, Value};

/// Maps `key,value,key,value` token streams (or plist `<k>`/value element
/// pairs) to ordered maps.
///
/// Each pair runs through the key's caster from the table. Keys without a
/// caster and without a table fallback keep their raw value, unless the codec
/// is [`strict`](DictCodec::strict). Map order is wire order in both
/// directions.
#[derive(Debug, Clone)]
pub struct DictCodec {
    type_name: String,
    separator: String,
    table: FunctionTable,
    numeric_keys: bool,
    strict: bool,
    delimiter: Option<Delimiter>,
}

impl DictCodec {
    pub fn new(separator: impl Into<String>, table: FunctionTable) -> Self {
        Self {
            type_name: "dict".to_owned(),
            separator: separator.into(),
            table,
            numeric_keys: false,
            strict: false,
            delimiter: None,
        }
    }

    /// Name used in error context.
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Normalize all-digit keys to [`Key::Int`].
    pub fn numeric_keys(mut self) -> Self {
        self.numeric_keys = true;
        self
    }

    /// Reject keys that resolve to no caster.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn delimited(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    fn parse_key(&self, raw: &str) -> Key {
        if self.numeric_keys {
            Key::parse(raw)
        } else {
            Key::Str(raw.to_owned())
        }
    }

    fn decode_entry(&self, key: &Key, raw: Value, kwargs: &Kwargs) -> Result<Value, CodecError> {
        match self.table.resolve(key) {
            Some(caster) => caster
                .decode(raw, kwargs)
                .map_err(|e| e.context(&self.type_name, key.to_string())),
            None if self.strict => Err(CodecError::UnknownKey {
                type_name: self.type_name.clone(),
                key: key.to_string(),
            }),
            None => Ok(raw),
        }
    }

    fn encode_entry(
        &self,
        key: &Key,
        value: &Value,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Option<Value>, CodecError> {
        match self.table.resolve(key) {
            Some(caster) => {
                if options.skip_defaults && caster.is_default(value) {
                    return Ok(None);
                }
                caster
                    .encode(value, options, kwargs)
                    .map_err(|e| e.context(&self.type_name, key.to_string()))
            }
            None if self.strict => Err(CodecError::UnknownKey {
                type_name: self.type_name.clone(),
                key: key.to_string(),
            }),
            None if value.is_none() => Ok(None),
            None => Ok(Some(value.clone())),
        }
    }

    pub fn from_tokens<S: AsRef<str>>(
        &self,
        tokens: &[S],
        kwargs: &Kwargs,
    ) -> Result<Map, CodecError> {
        let pairs = tokens::split_pairs(tokens)?;
        let mut map = Map::with_capacity(pairs.len());
        for (raw_key, raw_value) in pairs {
            let key = self.parse_key(raw_key);
            let value = self.decode_entry(&key, Value::Str(raw_value.to_owned()), kwargs)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Encodes in map order. Entries whose caster yields nothing are omitted.
    pub fn to_tokens(
        &self,
        map: &Map,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Vec<String>, CodecError> {
        let mut out = Vec::with_capacity(map.len() * 2);
        for (key, value) in map {
            if let Some(encoded) = self.encode_entry(key, value, options, kwargs)? {
                let text = serialize(&encoded, options)
                    .map_err(|e| e.context(&self.type_name, key.to_string()))?;
                out.push(key.to_string());
                out.push(text);
            }
        }
        Ok(out)
    }

    pub fn decode(&self, s: &str, kwargs: &Kwargs) -> Result<Map, CodecError> {
        let body = match &self.delimiter {
            Some(delimiter) => delimiter.strip(s)?,
            None => s,
        };
        self.from_tokens(&tokens::split(body, &self.separator, false), kwargs)
    }

    pub fn encode(
        &self,
        map: &Map,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let joined = tokens::join(&self.to_tokens(map, options, kwargs)?, &self.separator, false);
        Ok(match &self.delimiter {
            Some(delimiter) => delimiter.wrap(&joined),
            None => joined,
        })
    }

    /// Decodes the `<k>`/value pairs of a plist container node.
    pub fn from_node(&self, node: &Element, kwargs: &Kwargs) -> Result<Map, CodecError> {
        if node.tag != "d" && node.tag != "dict" {
            return Err(PlistError::UnexpectedTag(node.tag.clone()).into());
        }
        if node.children.len() % 2 != 0 {
            return Err(PlistError::UnbalancedDict.into());
        }
        let mut map = Map::with_capacity(node.children.len() / 2);
        for pair in node.children.chunks_exact(2) {
            let (key_node, value_node) = (&pair[0], &pair[1]);
            if key_node.tag != "k" {
                return Err(PlistError::ExpectedKey(key_node.tag.clone()).into());
            }
            let key = self.parse_key(key_node.text());
            let raw = plist::read(value_node)
                .map_err(|e| CodecError::from(e).context(&self.type_name, key.to_string()))?;
            let value = self.decode_entry(&key, raw, kwargs)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Encodes `map` as a plist container node tagged `tag`.
    pub fn to_node(
        &self,
        map: &Map,
        tag: &str,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Element, CodecError> {
        let mut node = Element::new(tag);
        for (key, value) in map {
            if let Some(encoded) = self.encode_entry(key, value, options, kwargs)? {
                plist::write_entry(&mut node, &key.to_string(), &encoded, options)?;
            }
        }
        Ok(node)
    }

    /// Runs already-read plist values through the table.
    pub fn decode_map(&self, map: Map, kwargs: &Kwargs) -> Result<Map, CodecError> {
        let mut out = Map::with_capacity(map.len());
        for (key, raw) in map {
            let key = match key {
                Key::Str(s) => self.parse_key(&s),
                int => int,
            };
            let value = self.decode_entry(&key, raw, kwargs)?;
            out.insert(key, value);
        }
        Ok(out)
    }

    /// Inverse of [`decode_map`](Self::decode_map). Omitted entries are dropped.
    pub fn encode_map(
        &self,
        map: &Map,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Map, CodecError> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            if let Some(encoded) = self.encode_entry(key, value, options, kwargs)? {
                out.insert(key.clone(), encoded);
            }
        }
        Ok(out)
    }

    /// A caster for plist values that are already mappings, such as nested
    /// `<d>` entries of a save file.
    pub fn into_node_caster(self) -> Caster {
        let decoder = self.clone();
        Caster::new(
            move |raw, kwargs| match raw {
                Value::Dict(map) => Ok(Value::Dict(decoder.decode_map(map, kwargs)?)),
                other => Err(CastError::UnexpectedKind {
                    expected: "dict",
                    found: other.type_name(),
                }
                .into()),
            },
            move |value, options, kwargs| match value {
                Value::Dict(map) => Ok(Some(Value::Dict(self.encode_map(map, options, kwargs)?))),
                other => Err(CastError::UnexpectedKind {
                    expected: "dict",
                    found: other.type_name(),
                }
                .into()),
            },
        )
    }

    /// A caster that decodes a string field into a map with this codec.
    pub fn into_caster(self) -> Caster {
        let decoder = self.clone();
        Caster::new(
            move |raw, kwargs| match raw {
                Value::Str(s) => Ok(Value::Dict(decoder.decode(&s, kwargs)?)),
                Value::Dict(map) => Ok(Value::Dict(map)),
                other => Err(CastError::UnexpectedKind {
                    expected: "dict",
                    found: other.type_name(),
                }
                .into()),
            },
            move |value, options, kwargs| match value {
                Value::Dict(map) => Ok(Some(Value::Str(self.encode(map, options, kwargs)?))),
                other => Err(CastError::UnexpectedKind {
                    expected: "dict",
                    found: other.type_name(),
                }
                .into()),
            },
        )
    }
}
