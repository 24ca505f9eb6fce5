//! Dynamic values exchanged between the wire layers and typed records.
//!
//! Every codec in this crate decodes into, and encodes from, [`Value`]. The
//! variants form a closed set over the primitive kinds a wire format can
//! carry; types outside that set plug in through [`CustomValue`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CodecError;
use crate::options::CodecOptions;

/// Ordered mapping used by every keyed codec. Insertion order is wire order.
pub type Map = IndexMap<Key, Value>;

/// Mapping key: integer-coded property ids and named keys share one map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Normalizes a wire key: all-digit text becomes [`Key::Int`].
    ///
    /// ```
    /// use gdform::Key;
    ///
    /// assert_eq!(Key::parse("57"), Key::Int(57));
    /// assert_eq!(Key::parse("kS38"), Key::Str("kS38".into()));
    /// assert_eq!(Key::parse("-1"), Key::Str("-1".into()));
    /// ```
    pub fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return Key::Int(n);
            }
        }
        Key::Str(s.to_owned())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

/// Extension point for values that are not one of the primitive kinds.
///
/// Typed records (an HSV adjustment, a decoded level string) travel through
/// generic maps as `Value::Custom` and serialize through [`to_wire`].
///
/// [`to_wire`]: CustomValue::to_wire
pub trait CustomValue: fmt::Debug + Send + Sync + 'static {
    /// Name used in error messages and for [`CasterRegistry`] lookups.
    ///
    /// [`CasterRegistry`]: crate::casting::CasterRegistry
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// The value's own string form, if it has one.
    fn to_wire(&self, _options: &CodecOptions) -> Option<Result<String, CodecError>> {
        None
    }
}

/// A decoded wire value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Dict(Map),
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    pub fn custom<T: CustomValue>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    /// Short kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Custom(c) => c.type_name(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Map> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Downcasts a custom value.
    pub fn downcast_ref<T: CustomValue>(&self) -> Option<&T> {
        match self {
            Value::Custom(c) => c.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                if a.type_name() != b.type_name() {
                    return false;
                }
                let options = CodecOptions::default();
                match (a.to_wire(&options), b.to_wire(&options)) {
                    (Some(Ok(x)), Some(Ok(y))) => x == y,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// Generic string conversion, used when string fallback is enabled.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Dict(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Custom(c) => write!(f, "<{}>", c.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Dict(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_normalization() {
        assert_eq!(Key::parse("1"), Key::Int(1));
        assert_eq!(Key::parse("007"), Key::Int(7));
        assert_eq!(Key::parse(""), Key::Str(String::new()));
        assert_eq!(Key::parse("k_1"), Key::Str("k_1".into()));
        assert_eq!(Key::parse("1.5"), Key::Str("1.5".into()));
    }

    #[test]
    fn display_is_generic_string_form() {
        let mut map = Map::new();
        map.insert(Key::Int(1), Value::Int(2));
        let v = Value::List(vec![Value::Int(1), Value::Dict(map), Value::Bool(true)]);
        assert_eq!(v.to_string(), "[1, {1: 2}, 1]");
    }

    #[test]
    fn int_widens_to_float() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Str("3".into()).as_float(), None);
    }
}
