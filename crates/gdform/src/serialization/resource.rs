//! Composable string/file resources.
//!
//! Every wire type is a [`StringCodec`]. Cross-cutting behavior is added by
//! wrapping one codec in another instead of through a type hierarchy:
//!
//! ```text
//! FileResource<Compressed<PlistCodec>>      save files
//! Compressed<LevelStringCodec>              level content strings
//! Delimited<DictCodec>                      marker-wrapped sub-formats
//! ```
//!
//! [`NestedContent`] handles the last concern: entries of a decoded map that
//! stay in wire form until [`load_content`](NestedContent::load_content) is
//! called.

use std::any::Any;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gdform_compression::{compress, compress_bytes, decompress, decompress_bytes, Compression};
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::caster::{Caster, Kwargs};
use super::dict::DictCodec;
use super::list::ListCodec;
use super::record::{Record, RecordCodec};
use super::tokens::Delimiter;
use crate::casting::serialize;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::plist::{self, parse_document, write_document, Element, PlistError};
use crate::value::{CustomValue, Key, Map, Value};

/// A codec between a wire string and an in-memory value.
pub trait StringCodec {
    type Output;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<Self::Output, CodecError>;

    fn to_string(
        &self,
        value: &Self::Output,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError>;

    fn from_bytes(&self, bytes: &[u8], kwargs: &Kwargs) -> Result<Self::Output, CodecError> {
        let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        self.from_string(s, kwargs)
    }

    fn to_bytes(
        &self,
        value: &Self::Output,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_string(value, options, kwargs)?.into_bytes())
    }
}

impl StringCodec for ListCodec {
    type Output = Vec<Value>;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<Vec<Value>, CodecError> {
        self.decode(s, kwargs)
    }

    fn to_string(
        &self,
        value: &Vec<Value>,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        self.encode(value, options, kwargs)
    }
}

impl StringCodec for DictCodec {
    type Output = Map;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<Map, CodecError> {
        self.decode(s, kwargs)
    }

    fn to_string(
        &self,
        value: &Map,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        self.encode(value, options, kwargs)
    }
}

impl StringCodec for RecordCodec {
    type Output = Record;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<Record, CodecError> {
        self.decode(s, kwargs)
    }

    fn to_string(
        &self,
        value: &Record,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        self.encode(value, options, kwargs)
    }
}

/// Full `<plist>` documents.
///
/// Without a root codec the document's value is returned as read. With one,
/// the root `<dict>` is decoded through its table.
#[derive(Debug, Clone, Default)]
pub struct PlistCodec {
    root: Option<DictCodec>,
}

impl PlistCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: DictCodec) -> Self {
        Self { root: Some(root) }
    }
}

impl StringCodec for PlistCodec {
    type Output = Value;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<Value, CodecError> {
        let Some(codec) = &self.root else {
            return Ok(plist::from_str(s)?);
        };
        let document = parse_document(s)?;
        if document.tag != "plist" {
            return Err(PlistError::UnexpectedRoot(document.tag).into());
        }
        match document.children.as_slice() {
            [top] => Ok(Value::Dict(codec.from_node(top, kwargs)?)),
            _ => Err(PlistError::EmptyDocument.into()),
        }
    }

    fn to_string(
        &self,
        value: &Value,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let (Some(codec), Value::Dict(map)) = (&self.root, value) else {
            return plist::to_string(value, options);
        };
        let mut document = Element::new("plist")
            .with_attr("version", plist::PLIST_VERSION)
            .with_attr("gjver", plist::PLIST_GJVER);
        document.push(codec.to_node(map, "dict", options, kwargs)?);
        Ok(write_document(&document))
    }
}

/// Strips and re-adds a literal prefix/suffix around the inner codec's form.
#[derive(Debug, Clone)]
pub struct Delimited<C> {
    inner: C,
    delimiter: Delimiter,
}

impl<C> Delimited<C> {
    pub fn new(inner: C, delimiter: Delimiter) -> Self {
        Self { inner, delimiter }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: StringCodec> StringCodec for Delimited<C> {
    type Output = C::Output;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<C::Output, CodecError> {
        self.inner.from_string(self.delimiter.strip(s)?, kwargs)
    }

    fn to_string(
        &self,
        value: &C::Output,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        Ok(self.delimiter.wrap(&self.inner.to_string(value, options, kwargs)?))
    }
}

/// Runs the inner codec's string form through the compression envelope.
#[derive(Debug, Clone)]
pub struct Compressed<C> {
    inner: C,
    compression: Compression,
    xor_key: Option<Vec<u8>>,
}

impl<C> Compressed<C> {
    pub fn new(inner: C, compression: Compression) -> Self {
        Self {
            inner,
            compression,
            xor_key: None,
        }
    }

    pub fn with_xor_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.xor_key = Some(key.into());
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn xor_key(&self) -> Option<&[u8]> {
        self.xor_key.as_deref()
    }
}

impl<C: StringCodec> StringCodec for Compressed<C> {
    type Output = C::Output;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<C::Output, CodecError> {
        let plain = decompress(s, self.xor_key(), self.compression)?;
        self.inner.from_string(&plain, kwargs)
    }

    fn to_string(
        &self,
        value: &C::Output,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let plain = self.inner.to_string(value, options, kwargs)?;
        Ok(compress(&plain, self.xor_key(), self.compression)?)
    }

    // XOR-obfuscated payloads are not necessarily UTF-8, so files go through
    // the byte pipeline.
    fn from_bytes(&self, bytes: &[u8], kwargs: &Kwargs) -> Result<C::Output, CodecError> {
        let plain = decompress_bytes(bytes, self.xor_key(), self.compression)?;
        trace!(
            compressed = bytes.len(),
            plain = plain.len(),
            compression = self.compression.as_str(),
            "decompressed"
        );
        self.inner.from_string(&plain, kwargs)
    }

    fn to_bytes(
        &self,
        value: &C::Output,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Vec<u8>, CodecError> {
        let plain = self.inner.to_string(value, options, kwargs)?;
        Ok(compress_bytes(&plain, self.xor_key(), self.compression)?)
    }
}

pub type NameFn<T> = Arc<dyn Fn(Option<&T>) -> String + Send + Sync>;

/// Loads and saves a codec's output from disk.
///
/// Paths are resolved in three steps: a missing path falls back to the
/// default path, a directory gets a file name from the name generator, and
/// the configured extension is appended when absent or checked when present.
pub struct FileResource<C: StringCodec> {
    codec: C,
    extension: Option<String>,
    default_path: Option<PathBuf>,
    name: Option<NameFn<C::Output>>,
}

impl<C: StringCodec> FileResource<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            extension: None,
            default_path: None,
            name: None,
        }
    }

    /// Extension without the leading dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    pub fn with_name<F>(mut self, name: F) -> Self
    where
        F: Fn(Option<&C::Output>) -> String + Send + Sync + 'static,
    {
        self.name = Some(Arc::new(name));
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn resolve_path(
        &self,
        path: Option<&Path>,
        value: Option<&C::Output>,
    ) -> Result<PathBuf, CodecError> {
        let mut path = match path {
            Some(path) => path.to_path_buf(),
            None => self.default_path.clone().ok_or(CodecError::MissingPath)?,
        };
        if path.is_dir() {
            let name = self
                .name
                .as_ref()
                .ok_or_else(|| CodecError::NoFileName { path: path.clone() })?;
            path.push(name(value));
        }
        let Some(expected) = &self.extension else {
            return Ok(path);
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some(found) if found.eq_ignore_ascii_case(expected) => Ok(path),
            Some(_) => Err(CodecError::Extension {
                expected: expected.clone(),
                path,
            }),
            None => {
                path.set_extension(expected);
                Ok(path)
            }
        }
    }

    pub fn load(&self, path: Option<&Path>, kwargs: &Kwargs) -> Result<C::Output, CodecError> {
        let path = self.resolve_path(path, None)?;
        let bytes = fs::read(&path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loading resource");
        self.codec.from_bytes(&bytes, kwargs)
    }

    /// Writes `value` and returns the path it was written to.
    pub fn save(
        &self,
        value: &C::Output,
        path: Option<&Path>,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<PathBuf, CodecError> {
        let path = self.resolve_path(path, Some(value))?;
        let bytes = self.codec.to_bytes(value, options, kwargs)?;
        debug!(path = %path.display(), bytes = bytes.len(), "saving resource");
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl<C: StringCodec + fmt::Debug> fmt::Debug for FileResource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileResource")
            .field("codec", &self.codec)
            .field("extension", &self.extension)
            .field("default_path", &self.default_path)
            .field("name", &self.name.is_some())
            .finish()
    }
}

/// A loaded entry whose decoded form is itself text.
///
/// Wire entries are always plain strings, so a caster that decodes to a
/// string stores its result in this wrapper instead. It still serializes back
/// to the wire form through its caster.
#[derive(Debug, Clone)]
pub struct DecodedText {
    text: String,
    caster: Caster,
}

impl DecodedText {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl CustomValue for DecodedText {
    fn type_name(&self) -> &'static str {
        "DecodedText"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_wire(&self, options: &CodecOptions) -> Option<Result<String, CodecError>> {
        let wire = self
            .caster
            .encode(&Value::Str(self.text.clone()), options, &Kwargs::new())
            .and_then(|encoded| encoded.map_or(Ok(String::new()), |v| serialize(&v, options)));
        Some(wire)
    }
}

/// What to do with one lazily decoded entry.
#[derive(Debug, Clone)]
pub enum ContentHook {
    /// The entry is a wire string decoded and encoded by this caster.
    Codec(Caster),
    /// The entry is a list or map; apply the hook to each item.
    Each(Box<ContentHook>),
    /// The entry is a map with nested content of its own.
    Nested(NestedContent),
}

impl ContentHook {
    pub fn each(hook: ContentHook) -> Self {
        ContentHook::Each(Box::new(hook))
    }

    fn load(&self, value: &mut Value, kwargs: &Kwargs) -> Result<(), CodecError> {
        match self {
            ContentHook::Codec(caster) => {
                if matches!(value, Value::Str(_)) {
                    let raw = std::mem::take(value);
                    *value = match caster.decode(raw, kwargs)? {
                        Value::Str(text) => Value::custom(DecodedText {
                            text,
                            caster: caster.clone(),
                        }),
                        decoded => decoded,
                    };
                }
            }
            ContentHook::Each(hook) => match value {
                Value::List(items) => {
                    for item in items {
                        hook.load(item, kwargs)?;
                    }
                }
                Value::Dict(map) => {
                    for item in map.values_mut() {
                        hook.load(item, kwargs)?;
                    }
                }
                _ => {}
            },
            ContentHook::Nested(content) => {
                if let Value::Dict(map) = value {
                    content.load_content(map, kwargs)?;
                }
            }
        }
        Ok(())
    }

    fn save(
        &self,
        value: &mut Value,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<(), CodecError> {
        match self {
            ContentHook::Codec(caster) => {
                if matches!(value, Value::Str(_) | Value::None) {
                    return Ok(());
                }
                let encoded = match value.downcast_ref::<DecodedText>() {
                    Some(loaded) => {
                        caster.encode(&Value::Str(loaded.text.clone()), options, kwargs)?
                    }
                    None => caster.encode(value, options, kwargs)?,
                };
                *value = match encoded {
                    Some(encoded) => Value::Str(serialize(&encoded, options)?),
                    None => Value::None,
                };
            }
            ContentHook::Each(hook) => match value {
                Value::List(items) => {
                    for item in items {
                        hook.save(item, options, kwargs)?;
                    }
                }
                Value::Dict(map) => {
                    for item in map.values_mut() {
                        hook.save(item, options, kwargs)?;
                    }
                }
                _ => {}
            },
            ContentHook::Nested(content) => {
                if let Value::Dict(map) = value {
                    content.save_content(map, options, kwargs)?;
                }
            }
        }
        Ok(())
    }
}

/// Entries of a map that may stay in wire form until requested.
///
/// An entry is in wire form exactly when it is a plain string; text produced
/// by a hook is held as [`DecodedText`]. Loading an entry that is already
/// decoded, or saving one that is already in wire form, is a no-op, so both
/// directions can be called repeatedly.
#[derive(Debug, Clone, Default)]
pub struct NestedContent {
    hooks: IndexMap<Key, ContentHook>,
    keys: Option<Vec<Key>>,
}

impl NestedContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<Key>, hook: ContentHook) -> Self {
        self.hooks.insert(key.into(), hook);
        self
    }

    /// Restricts loading and saving to `keys`. All hooked keys otherwise.
    pub fn only<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    fn active(&self) -> impl Iterator<Item = (&Key, &ContentHook)> {
        self.hooks
            .iter()
            .filter(|(key, _)| self.keys.as_ref().map_or(true, |keys| keys.contains(*key)))
    }

    pub fn load_content(&self, map: &mut Map, kwargs: &Kwargs) -> Result<(), CodecError> {
        for (key, hook) in self.active() {
            if let Some(value) = map.get_mut(key) {
                trace!(%key, "loading nested content");
                hook.load(value, kwargs)
                    .map_err(|e| e.context("content", key.to_string()))?;
            }
        }
        Ok(())
    }

    pub fn save_content(
        &self,
        map: &mut Map,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<(), CodecError> {
        for (key, hook) in self.active() {
            if let Some(value) = map.get_mut(key) {
                trace!(%key, "saving nested content");
                hook.save(value, options, kwargs)
                    .map_err(|e| e.context("content", key.to_string()))?;
            }
        }
        Ok(())
    }
}
