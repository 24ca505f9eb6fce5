//! Level strings: a header record followed by `;`-terminated objects,
//! stored gzip-compressed and base64-encoded.

use std::any::Any;
use std::sync::OnceLock;

use gdform_compression::Compression;

use super::color::{color_list_codec, decode_colors, ColorChannel};
use super::object::{decode_objects, encode_objects, GameObject};
use crate::casting::CastError;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::serialization::resource::{Compressed, StringCodec};
use crate::serialization::{Caster, DictCodec, FunctionTable, Kwargs};
use crate::value::{CustomValue, Key, Map, Value};

/// Header key holding the color channel string.
pub const HEADER_COLORS: &str = "kS38";

fn header_codec() -> &'static DictCodec {
    static CODEC: OnceLock<DictCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        let table =
            FunctionTable::new().with(HEADER_COLORS, color_list_codec().clone().into_caster());
        DictCodec::new(",", table).named("LevelHeader")
    })
}

/// Decoded level content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelString {
    /// Header settings. Colors live under [`HEADER_COLORS`]; everything else
    /// (`kA*` flags, legacy colors) is kept as raw strings.
    pub header: Map,
    pub objects: Vec<GameObject>,
}

impl LevelString {
    pub fn colors(&self) -> Result<Vec<ColorChannel>, CodecError> {
        match self.header.get(&Key::from(HEADER_COLORS)) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Dict(properties) => Ok(ColorChannel {
                        properties: properties.clone(),
                    }),
                    other => Err(CastError::UnexpectedKind {
                        expected: "dict",
                        found: other.type_name(),
                    }
                    .into()),
                })
                .collect(),
            Some(Value::Str(s)) => decode_colors(s),
            Some(other) => Err(CastError::UnexpectedKind {
                expected: "list",
                found: other.type_name(),
            }
            .into()),
        }
    }

    /// Decodes the uncompressed form.
    pub fn decode(s: &str) -> Result<Self, CodecError> {
        LevelStringCodec.from_string(s, &Kwargs::new())
    }

    /// Encodes the uncompressed form.
    pub fn encode(&self, options: &CodecOptions) -> Result<String, CodecError> {
        LevelStringCodec.to_string(self, options, &Kwargs::new())
    }

    /// The compressed form stored in saves under `k4`.
    pub fn compressed() -> &'static Compressed<LevelStringCodec> {
        static CODEC: OnceLock<Compressed<LevelStringCodec>> = OnceLock::new();
        CODEC.get_or_init(|| Compressed::new(LevelStringCodec, Compression::Gzip))
    }

    /// Decodes compressed level data regardless of its container.
    pub fn decompress(s: &str) -> Result<Self, CodecError> {
        Compressed::new(LevelStringCodec, Compression::Auto).from_string(s, &Kwargs::new())
    }

    /// A caster that always decodes compressed level data.
    pub fn caster() -> Caster {
        Caster::new(
            |raw, kwargs| match raw {
                Value::Str(s) => Ok(Value::custom(
                    Compressed::new(LevelStringCodec, Compression::Auto).from_string(&s, kwargs)?,
                )),
                custom @ Value::Custom(_) if custom.downcast_ref::<LevelString>().is_some() => {
                    Ok(custom)
                }
                other => Err(CastError::UnexpectedKind {
                    expected: "str",
                    found: other.type_name(),
                }
                .into()),
            },
            |value, options, kwargs| match value {
                Value::Str(s) => Ok(Some(Value::Str(s.clone()))),
                other => {
                    let level = other.downcast_ref::<LevelString>().ok_or_else(|| {
                        CodecError::from(CastError::UnexpectedKind {
                            expected: "LevelString",
                            found: other.type_name(),
                        })
                    })?;
                    let wire = LevelString::compressed().to_string(level, options, kwargs)?;
                    Ok(Some(Value::Str(wire)))
                }
            },
        )
    }
}

impl CustomValue for LevelString {
    fn type_name(&self) -> &'static str {
        "LevelString"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_wire(&self, options: &CodecOptions) -> Option<Result<String, CodecError>> {
        Some(LevelString::compressed().to_string(self, options, &Kwargs::new()))
    }
}

/// Uncompressed level string codec: `<header>;<object>;<object>;...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelStringCodec;

impl StringCodec for LevelStringCodec {
    type Output = LevelString;

    fn from_string(&self, s: &str, kwargs: &Kwargs) -> Result<LevelString, CodecError> {
        if s.is_empty() {
            return Ok(LevelString::default());
        }
        let (header, objects) = s.split_once(';').ok_or_else(|| CodecError::MissingDelimiter {
            prefix: String::new(),
            suffix: ";".to_owned(),
            input: s.to_owned(),
        })?;
        Ok(LevelString {
            header: header_codec()
                .decode(header, kwargs)
                .map_err(|e| e.context("LevelString", "header"))?,
            objects: decode_objects(objects, kwargs)?,
        })
    }

    fn to_string(
        &self,
        value: &LevelString,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let mut out = header_codec()
            .encode(&value.header, options, kwargs)
            .map_err(|e| e.context("LevelString", "header"))?;
        out.push(';');
        out.push_str(&encode_objects(&value.objects, options, kwargs)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = "kS38,1_0_2_102_3_255_6_1000_7_1|1_255_2_255_3_255_6_1004_7_1|,kA13,0,kA15,0;1,1,2,15,3,15;1,8,2,45,3,15,57,2;";

    #[test]
    fn level_string_round_trips() {
        let level = LevelString::decode(LEVEL).unwrap();
        assert_eq!(level.objects.len(), 2);
        assert_eq!(level.header[&Key::from("kA13")], Value::Str("0".into()));
        let colors = level.colors().unwrap();
        assert_eq!(colors[1].channel(), Some(1004));
        assert_eq!(level.encode(&CodecOptions::default()).unwrap(), LEVEL);
    }

    #[test]
    fn compressed_form_is_gzip() {
        let level = LevelString::decode(LEVEL).unwrap();
        let options = CodecOptions::default();
        let wire = LevelString::compressed()
            .to_string(&level, &options, &Kwargs::new())
            .unwrap();
        assert!(wire.starts_with("H4sI"));
        assert_eq!(LevelString::decompress(&wire).unwrap(), level);
    }

    #[test]
    fn empty_level_string() {
        let level = LevelString::decode("").unwrap();
        assert!(level.header.is_empty());
        assert!(level.objects.is_empty());
        assert!(level.colors().unwrap().is_empty());
    }

    #[test]
    fn header_errors_carry_context() {
        let err = LevelString::decode("kS38,1_x|;").unwrap_err();
        assert!(err.to_string().starts_with("LevelString.header: "));
    }
}
