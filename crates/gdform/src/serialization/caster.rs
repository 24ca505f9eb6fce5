//! Per-key value casters and the function tables that hold them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::casting::{
    decode_base64_text, decode_bool, decode_float, decode_int, encode_base64_text, CastError,
};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::{Key, Value};

/// Named values forwarded from the call site to casters that declare them.
pub type Kwargs = IndexMap<String, Value>;

/// Wire value (a token string or a plist value) to in-memory value.
pub type DecodeFn = Arc<dyn Fn(Value, &Kwargs) -> Result<Value, CodecError> + Send + Sync>;

/// In-memory value to wire value. `Ok(None)` omits the entry.
pub type EncodeFn =
    Arc<dyn Fn(&Value, &CodecOptions, &Kwargs) -> Result<Option<Value>, CodecError> + Send + Sync>;

/// A decode/encode pair for one key.
///
/// A caster only sees the keyword arguments it declared through
/// [`with_params`](Caster::with_params); everything else the caller passed is
/// filtered out.
#[derive(Clone)]
pub struct Caster {
    decode: DecodeFn,
    encode: EncodeFn,
    params: Vec<String>,
    default: Option<Value>,
    omit_empty: bool,
}

fn unexpected(expected: &'static str, found: &Value) -> CodecError {
    CastError::UnexpectedKind {
        expected,
        found: found.type_name(),
    }
    .into()
}

impl Caster {
    pub fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(Value, &Kwargs) -> Result<Value, CodecError> + Send + Sync + 'static,
        E: Fn(&Value, &CodecOptions, &Kwargs) -> Result<Option<Value>, CodecError>
            + Send
            + Sync
            + 'static,
    {
        Self::from_fns(Arc::new(decode), Arc::new(encode))
    }

    pub fn from_fns(decode: DecodeFn, encode: EncodeFn) -> Self {
        Self {
            decode,
            encode,
            params: Vec::new(),
            default: None,
            omit_empty: false,
        }
    }

    /// Keeps values as they are in both directions.
    pub fn identity() -> Self {
        Self::new(|raw, _| Ok(raw), |value, _, _| Ok(Some(value.clone())))
    }

    pub fn bool() -> Self {
        Self::new(
            |raw, _| match raw {
                Value::Str(s) => Ok(Value::Bool(decode_bool(&s)?)),
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::Int(n) => Ok(Value::Bool(n != 0)),
                other => Err(unexpected("bool", &other)),
            },
            |value, _, _| match value {
                Value::Bool(b) => Ok(Some(Value::Bool(*b))),
                other => Err(unexpected("bool", other)),
            },
        )
    }

    pub fn int() -> Self {
        Self::new(
            |raw, _| match raw {
                Value::Str(s) => Ok(Value::Int(decode_int(&s)?)),
                Value::Int(n) => Ok(Value::Int(n)),
                other => Err(unexpected("int", &other)),
            },
            |value, _, _| match value {
                Value::Int(n) => Ok(Some(Value::Int(*n))),
                other => Err(unexpected("int", other)),
            },
        )
    }

    pub fn float() -> Self {
        Self::new(
            |raw, _| match raw {
                Value::Str(s) => Ok(Value::Float(decode_float(&s)?)),
                Value::Float(x) => Ok(Value::Float(x)),
                Value::Int(n) => Ok(Value::Float(n as f64)),
                other => Err(unexpected("float", &other)),
            },
            |value, _, _| match value.as_float() {
                Some(x) => Ok(Some(Value::Float(x))),
                None => Err(unexpected("float", value)),
            },
        )
    }

    pub fn string() -> Self {
        Self::new(
            |raw, _| match raw {
                Value::Str(s) => Ok(Value::Str(s)),
                other => Err(unexpected("str", &other)),
            },
            |value, _, _| match value {
                Value::Str(s) => Ok(Some(Value::Str(s.clone()))),
                other => Err(unexpected("str", other)),
            },
        )
    }

    /// Text stored as URL-safe base64 on the wire.
    pub fn base64_text() -> Self {
        Self::new(
            |raw, _| match raw {
                Value::Str(s) => Ok(Value::Str(decode_base64_text(&s)?)),
                other => Err(unexpected("str", &other)),
            },
            |value, _, _| match value {
                Value::Str(s) => Ok(Some(Value::Str(encode_base64_text(s)))),
                other => Err(unexpected("str", other)),
            },
        )
    }

    pub fn with_decoder(mut self, decode: DecodeFn) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_encoder(mut self, encode: EncodeFn) -> Self {
        self.encode = encode;
        self
    }

    /// Declares keyword arguments this caster accepts from the call site.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Declares the key's default value, used by `skip_defaults`.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Treats an empty encoded string, list or map like `None`, so the entry
    /// is left out of keyed output.
    pub fn omitting_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_default(&self, value: &Value) -> bool {
        self.default.as_ref() == Some(value)
    }

    fn scope(&self, kwargs: &Kwargs) -> Kwargs {
        if self.params.is_empty() {
            return Kwargs::new();
        }
        kwargs
            .iter()
            .filter(|(name, _)| self.params.iter().any(|p| p == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn decode(&self, raw: Value, kwargs: &Kwargs) -> Result<Value, CodecError> {
        (self.decode)(raw, &self.scope(kwargs))
    }

    /// Encodes `value`. [`Value::None`] is never passed to the encoder and
    /// always yields `Ok(None)`.
    pub fn encode(
        &self,
        value: &Value,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Option<Value>, CodecError> {
        if value.is_none() {
            return Ok(None);
        }
        let encoded = (self.encode)(value, options, &self.scope(kwargs))?;
        if !self.omit_empty {
            return Ok(encoded);
        }
        Ok(encoded.filter(|v| match v {
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Dict(map) => !map.is_empty(),
            _ => true,
        }))
    }
}

impl fmt::Debug for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caster")
            .field("params", &self.params)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Casters keyed by property id, field name or plist key.
///
/// Keys missing from the table resolve to the fallback caster when one is
/// declared.
#[derive(Clone, Default)]
pub struct FunctionTable {
    casters: IndexMap<Key, Caster>,
    fallback: Option<Caster>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<Key>, caster: Caster) -> Self {
        self.insert(key, caster);
        self
    }

    pub fn with_fallback(mut self, caster: Caster) -> Self {
        self.fallback = Some(caster);
        self
    }

    pub fn insert(&mut self, key: impl Into<Key>, caster: Caster) {
        self.casters.insert(key.into(), caster);
    }

    pub fn get(&self, key: &Key) -> Option<&Caster> {
        self.casters.get(key)
    }

    /// The key's caster, or the fallback.
    pub fn resolve(&self, key: &Key) -> Option<&Caster> {
        self.casters.get(key).or(self.fallback.as_ref())
    }

    pub fn fallback(&self) -> Option<&Caster> {
        self.fallback.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.casters.keys()
    }

    pub fn len(&self) -> usize {
        self.casters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("keys", &self.casters.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
