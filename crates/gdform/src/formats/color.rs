//! Color channels: `1_255_2_128_3_0_6_1000_7_1|` entries in a level header.

use std::sync::OnceLock;

use super::hsv::Hsv;
use crate::casting::CastError;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::serialization::{
    Caster, Delimiter, DictCodec, FunctionTable, Kwargs, ListCodec, RecordType,
};
use crate::value::{Key, Map, Value};

/// Color channel property ids.
pub mod prop {
    pub const RED: i64 = 1;
    pub const GREEN: i64 = 2;
    pub const BLUE: i64 = 3;
    pub const PLAYER_COLOR: i64 = 4;
    pub const BLENDING: i64 = 5;
    pub const CHANNEL: i64 = 6;
    pub const OPACITY: i64 = 7;
    pub const TOGGLE_OPACITY: i64 = 8;
    pub const COPY_CHANNEL: i64 = 9;
    pub const COPY_HSV: i64 = 10;
    pub const COPY_OPACITY: i64 = 17;
}

fn table() -> FunctionTable {
    FunctionTable::new()
        .with(prop::RED, Caster::int())
        .with(prop::GREEN, Caster::int())
        .with(prop::BLUE, Caster::int())
        .with(prop::PLAYER_COLOR, Caster::int())
        .with(prop::BLENDING, Caster::bool())
        .with(prop::CHANNEL, Caster::int())
        .with(prop::OPACITY, Caster::float())
        .with(prop::TOGGLE_OPACITY, Caster::bool())
        .with(prop::COPY_CHANNEL, Caster::int())
        .with(prop::COPY_HSV, Hsv::caster())
        .with(prop::COPY_OPACITY, Caster::bool())
}

/// Codec for a single `|`-terminated channel entry.
pub fn color_channel_codec() -> &'static DictCodec {
    static CODEC: OnceLock<DictCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        DictCodec::new("_", table())
            .named("ColorChannel")
            .numeric_keys()
            .delimited(Delimiter::suffix("|"))
    })
}

/// Codec for a full `kS38` color string.
pub fn color_list_codec() -> &'static ListCodec {
    static CODEC: OnceLock<ListCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        ListCodec::new("|", color_channel_codec().clone().into_caster()).keep_separator()
    })
}

/// One color channel. Unknown property ids are kept as raw strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorChannel {
    pub properties: Map,
}

impl ColorChannel {
    pub fn new(channel: i64, rgb: [i64; 3]) -> Self {
        let mut properties = Map::with_capacity(4);
        properties.insert(Key::Int(prop::RED), Value::Int(rgb[0]));
        properties.insert(Key::Int(prop::GREEN), Value::Int(rgb[1]));
        properties.insert(Key::Int(prop::BLUE), Value::Int(rgb[2]));
        properties.insert(Key::Int(prop::CHANNEL), Value::Int(channel));
        Self { properties }
    }

    pub fn decode(s: &str) -> Result<Self, CodecError> {
        Ok(Self {
            properties: color_channel_codec().decode(s, &Kwargs::new())?,
        })
    }

    pub fn encode(&self, options: &CodecOptions) -> Result<String, CodecError> {
        color_channel_codec().encode(&self.properties, options, &Kwargs::new())
    }

    pub fn get(&self, id: i64) -> Option<&Value> {
        self.properties.get(&Key::Int(id))
    }

    pub fn channel(&self) -> Option<i64> {
        self.get(prop::CHANNEL).and_then(Value::as_int)
    }

    pub fn rgb(&self) -> Option<[i64; 3]> {
        Some([
            self.get(prop::RED)?.as_int()?,
            self.get(prop::GREEN)?.as_int()?,
            self.get(prop::BLUE)?.as_int()?,
        ])
    }

    pub fn copy_hsv(&self) -> Option<&Hsv> {
        self.get(prop::COPY_HSV)?.downcast_ref()
    }
}

/// Decodes a color string into its channels.
pub fn decode_colors(s: &str) -> Result<Vec<ColorChannel>, CodecError> {
    color_list_codec()
        .decode(s, &Kwargs::new())?
        .into_iter()
        .map(|item| match item {
            Value::Dict(properties) => Ok(ColorChannel { properties }),
            other => Err(CastError::UnexpectedKind {
                expected: "dict",
                found: other.type_name(),
            }
            .into()),
        })
        .collect()
}

pub fn encode_colors(
    channels: &[ColorChannel],
    options: &CodecOptions,
) -> Result<String, CodecError> {
    let items: Vec<Value> = channels
        .iter()
        .map(|channel| Value::Dict(channel.properties.clone()))
        .collect();
    color_list_codec().encode(&items, options, &Kwargs::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &str = "1_40_2_125_3_255_11_255_12_255_13_255_4_-1_6_1000_7_1_15_1_18_0_8_1|1_0_2_102_3_255_6_1001_7_1_15_1_18_0_8_1_10_-20a0.5a1a1a0|";

    #[test]
    fn color_string_round_trips() {
        let channels = decode_colors(COLORS).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel(), Some(1000));
        assert_eq!(channels[0].rgb(), Some([40, 125, 255]));
        // Unknown ids stay raw.
        assert_eq!(channels[0].get(11), Some(&Value::Str("255".into())));
        assert_eq!(channels[1].copy_hsv().map(|h| h.hue), Some(-20));
        assert_eq!(
            encode_colors(&channels, &CodecOptions::default()).unwrap(),
            COLORS
        );
    }

    #[test]
    fn built_channel_encodes_in_insertion_order() {
        let channel = ColorChannel::new(1004, [255, 255, 255]);
        assert_eq!(
            channel.encode(&CodecOptions::default()).unwrap(),
            "1_255_2_255_3_255_6_1004|"
        );
    }

    #[test]
    fn empty_color_string_has_no_channels() {
        assert!(decode_colors("").unwrap().is_empty());
    }
}
