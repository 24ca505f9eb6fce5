//! Local level saves (`CCLocalLevels.dat`).
//!
//! The file is a plist document, gzip-compressed, base64-encoded and XOR-ed
//! with key `11`. Levels live in a sequence under [`LOCAL_LEVELS`]; each
//! level's object data (`k4`) is itself a compressed [`LevelString`] and is
//! only decoded on request.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use gdform_compression::{Compression, SAVE_XOR_KEY};

use super::level::LevelString;
use crate::casting::CastError;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::serialization::resource::{
    Compressed, ContentHook, FileResource, NestedContent, PlistCodec, StringCodec,
};
use crate::serialization::{Caster, DictCodec, FunctionTable, Kwargs};
use crate::value::{Key, Map, Value};

pub const LOCAL_LEVELS: &str = "LLM_01";
pub const LEVEL_NAME: &str = "k2";
pub const LEVEL_DESCRIPTION: &str = "k3";
pub const LEVEL_DATA: &str = "k4";

/// Keyword argument that decodes level data while the save is read.
pub const LOAD_CONTENT: &str = "load_content";

pub const SAVE_FILE_NAME: &str = "CCLocalLevels.dat";

fn wants_content(kwargs: &Kwargs) -> bool {
    kwargs
        .get(LOAD_CONTENT)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn unexpected(expected: &'static str, found: &Value) -> CodecError {
    CastError::UnexpectedKind {
        expected,
        found: found.type_name(),
    }
    .into()
}

/// Level data stays compressed unless `load_content` is set.
fn lazy_level_data() -> Caster {
    let eager = LevelString::caster();
    let encoder = eager.clone();
    Caster::new(
        move |raw, kwargs| {
            if wants_content(kwargs) {
                eager.decode(raw, kwargs)
            } else {
                Ok(raw)
            }
        },
        move |value, options, kwargs| encoder.encode(value, options, kwargs),
    )
    .with_params([LOAD_CONTENT])
}

/// Applies `item` to every element of a plist sequence or mapping.
fn each(item: Caster) -> Caster {
    let decoder = item.clone();
    let params = item.params().to_vec();
    Caster::new(
        move |raw, kwargs| match raw {
            Value::List(items) => items
                .into_iter()
                .map(|value| decoder.decode(value, kwargs))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Dict(map) => map
                .into_iter()
                .map(|(key, value)| Ok((key, decoder.decode(value, kwargs)?)))
                .collect::<Result<Map, CodecError>>()
                .map(Value::Dict),
            other => Err(unexpected("list", &other)),
        },
        move |value, options, kwargs| match value {
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for value in items {
                    if let Some(encoded) = item.encode(value, options, kwargs)? {
                        out.push(encoded);
                    }
                }
                Ok(Some(Value::List(out)))
            }
            Value::Dict(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    if let Some(encoded) = item.encode(value, options, kwargs)? {
                        out.insert(key.clone(), encoded);
                    }
                }
                Ok(Some(Value::Dict(out)))
            }
            other => Err(unexpected("list", other)),
        },
    )
    .with_params(params)
}

fn level_codec() -> DictCodec {
    let table = FunctionTable::new()
        .with(LEVEL_DESCRIPTION, Caster::base64_text())
        .with(LEVEL_DATA, lazy_level_data());
    DictCodec::new("", table).named("Level")
}

fn root_codec() -> DictCodec {
    let levels = level_codec().into_node_caster().with_params([LOAD_CONTENT]);
    let table = FunctionTable::new().with(LOCAL_LEVELS, each(levels));
    DictCodec::new("", table).named("GameSave")
}

/// A decoded save file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSave {
    pub data: Map,
}

impl GameSave {
    pub fn resource() -> &'static FileResource<Compressed<PlistCodec>> {
        static RESOURCE: OnceLock<FileResource<Compressed<PlistCodec>>> = OnceLock::new();
        RESOURCE.get_or_init(|| {
            let codec = Compressed::new(PlistCodec::with_root(root_codec()), Compression::Gzip)
                .with_xor_key(SAVE_XOR_KEY);
            FileResource::new(codec)
                .with_extension("dat")
                .with_name(|_| SAVE_FILE_NAME.to_owned())
        })
    }

    /// Entries decoded by [`load_content`](Self::load_content).
    pub fn content() -> &'static NestedContent {
        static CONTENT: OnceLock<NestedContent> = OnceLock::new();
        CONTENT.get_or_init(|| {
            let level =
                NestedContent::new().with(LEVEL_DATA, ContentHook::Codec(LevelString::caster()));
            NestedContent::new()
                .with(LOCAL_LEVELS, ContentHook::each(ContentHook::Nested(level)))
        })
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Dict(data) => Ok(Self { data }),
            other => Err(unexpected("dict", &other)),
        }
    }

    /// Decodes the uncompressed plist document.
    pub fn decode(s: &str, kwargs: &Kwargs) -> Result<Self, CodecError> {
        Self::from_value(Self::resource().codec().inner().from_string(s, kwargs)?)
    }

    /// Encodes the uncompressed plist document.
    pub fn encode(&self, options: &CodecOptions) -> Result<String, CodecError> {
        Self::resource().codec().inner().to_string(
            &Value::Dict(self.data.clone()),
            options,
            &Kwargs::new(),
        )
    }

    pub fn load(path: Option<&Path>, kwargs: &Kwargs) -> Result<Self, CodecError> {
        Self::from_value(Self::resource().load(path, kwargs)?)
    }

    pub fn save(&self, path: Option<&Path>, options: &CodecOptions) -> Result<PathBuf, CodecError> {
        Self::resource().save(
            &Value::Dict(self.data.clone()),
            path,
            options,
            &Kwargs::new(),
        )
    }

    pub fn load_content(&mut self, kwargs: &Kwargs) -> Result<(), CodecError> {
        Self::content().load_content(&mut self.data, kwargs)
    }

    pub fn save_content(&mut self, options: &CodecOptions) -> Result<(), CodecError> {
        Self::content().save_content(&mut self.data, options, &Kwargs::new())
    }

    pub fn levels(&self) -> &[Value] {
        self.data
            .get(&Key::from(LOCAL_LEVELS))
            .and_then(Value::as_list)
            .unwrap_or_default()
    }

    pub fn level(&self, index: usize) -> Option<&Map> {
        self.levels().get(index)?.as_dict()
    }

    pub fn level_name(&self, index: usize) -> Option<&str> {
        self.level(index)?.get(&Key::from(LEVEL_NAME))?.as_str()
    }

    /// The level's decoded object data, once loaded.
    pub fn level_data(&self, index: usize) -> Option<&LevelString> {
        self.level(index)?.get(&Key::from(LEVEL_DATA))?.downcast_ref()
    }

    /// Appends a level with its data already decoded.
    pub fn push_level(&mut self, name: &str, description: &str, data: LevelString) {
        let mut level = Map::with_capacity(3);
        level.insert(Key::from(LEVEL_NAME), Value::from(name));
        level.insert(Key::from(LEVEL_DESCRIPTION), Value::from(description));
        level.insert(Key::from(LEVEL_DATA), Value::custom(data));
        let levels = self
            .data
            .entry(Key::from(LOCAL_LEVELS))
            .or_insert_with(|| Value::List(Vec::new()));
        if let Some(items) = levels.as_list_mut() {
            items.push(Value::Dict(level));
        }
    }
}
