//! Level objects: `1,1,2,15,3,15;` records keyed by integer property ids.

use std::sync::OnceLock;

use super::hsv::Hsv;
use crate::casting::CastError;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::serialization::{
    Caster, Delimiter, DictCodec, FunctionTable, Kwargs, ListCodec, RecordType,
};
use crate::value::{Key, Map, Value};

/// Object property ids with a declared type.
pub mod prop {
    pub const ID: i64 = 1;
    pub const X: i64 = 2;
    pub const Y: i64 = 3;
    pub const FLIP_X: i64 = 4;
    pub const FLIP_Y: i64 = 5;
    pub const ROTATION: i64 = 6;
    pub const MAIN_COLOR: i64 = 21;
    pub const DETAIL_COLOR: i64 = 22;
    pub const SCALE: i64 = 32;
    pub const MAIN_HSV: i64 = 43;
    pub const DETAIL_HSV: i64 = 44;
    pub const GROUPS: i64 = 57;
}

fn table() -> FunctionTable {
    FunctionTable::new()
        .with(prop::ID, Caster::int())
        .with(prop::X, Caster::float().with_default(0.0))
        .with(prop::Y, Caster::float().with_default(0.0))
        .with(prop::FLIP_X, Caster::bool().with_default(false))
        .with(prop::FLIP_Y, Caster::bool().with_default(false))
        .with(prop::ROTATION, Caster::float().with_default(0.0))
        .with(prop::MAIN_COLOR, Caster::int())
        .with(prop::DETAIL_COLOR, Caster::int())
        .with(prop::SCALE, Caster::float().with_default(1.0))
        .with(prop::MAIN_HSV, Hsv::caster())
        .with(prop::DETAIL_HSV, Hsv::caster())
        .with(
            prop::GROUPS,
            ListCodec::new(".", Caster::int()).into_caster(),
        )
}

/// Codec for a single `;`-terminated object.
pub fn object_codec() -> &'static DictCodec {
    static CODEC: OnceLock<DictCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        DictCodec::new(",", table())
            .named("GameObject")
            .numeric_keys()
            .delimited(Delimiter::suffix(";"))
    })
}

/// Codec for a run of objects, each terminated by `;`.
pub fn object_list_codec() -> &'static ListCodec {
    static CODEC: OnceLock<ListCodec> = OnceLock::new();
    CODEC.get_or_init(|| ListCodec::new(";", object_codec().clone().into_caster()).keep_separator())
}

/// A placed object. Properties without a declared type are kept as raw
/// strings so they survive a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameObject {
    pub properties: Map,
}

impl GameObject {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        let mut properties = Map::with_capacity(3);
        properties.insert(Key::Int(prop::ID), Value::Int(id));
        properties.insert(Key::Int(prop::X), Value::Float(x));
        properties.insert(Key::Int(prop::Y), Value::Float(y));
        Self { properties }
    }

    pub fn decode(s: &str) -> Result<Self, CodecError> {
        Ok(Self {
            properties: object_codec().decode(s, &Kwargs::new())?,
        })
    }

    pub fn encode(&self, options: &CodecOptions) -> Result<String, CodecError> {
        object_codec().encode(&self.properties, options, &Kwargs::new())
    }

    pub fn get(&self, id: i64) -> Option<&Value> {
        self.properties.get(&Key::Int(id))
    }

    /// Sets a property. `Value::None` removes it from the wire form.
    pub fn set(&mut self, id: i64, value: impl Into<Value>) {
        self.properties.insert(Key::Int(id), value.into());
    }

    pub fn id(&self) -> Option<i64> {
        self.get(prop::ID).and_then(Value::as_int)
    }

    pub fn position(&self) -> (f64, f64) {
        let coord = |id| self.get(id).and_then(Value::as_float).unwrap_or(0.0);
        (coord(prop::X), coord(prop::Y))
    }

    pub fn groups(&self) -> Vec<i64> {
        self.get(prop::GROUPS)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_int).collect())
            .unwrap_or_default()
    }

    pub fn main_hsv(&self) -> Option<&Hsv> {
        self.get(prop::MAIN_HSV)?.downcast_ref()
    }
}

fn into_object(value: Value) -> Result<GameObject, CodecError> {
    match value {
        Value::Dict(properties) => Ok(GameObject { properties }),
        other => Err(CastError::UnexpectedKind {
            expected: "dict",
            found: other.type_name(),
        }
        .into()),
    }
}

pub fn decode_objects(s: &str, kwargs: &Kwargs) -> Result<Vec<GameObject>, CodecError> {
    object_list_codec()
        .decode(s, kwargs)?
        .into_iter()
        .map(into_object)
        .collect()
}

pub fn encode_objects(
    objects: &[GameObject],
    options: &CodecOptions,
    kwargs: &Kwargs,
) -> Result<String, CodecError> {
    let items: Vec<Value> = objects
        .iter()
        .map(|object| Value::Dict(object.properties.clone()))
        .collect();
    object_list_codec().encode(&items, options, kwargs)
}
