use gdform::formats::color::{color_channel_codec, prop as color_prop};
use gdform::formats::object::{object_list_codec, prop};
use gdform::formats::{decode_objects, ColorChannel, GameObject, Hsv, LevelString};
use gdform::serialization::resource::{Compressed, StringCodec};
use gdform::serialization::{Kwargs, RecordType};
use gdform::{CodecError, CodecOptions, Compression, Key, Value};

const LEVEL: &str = concat!(
    "kS38,1_40_2_125_3_255_11_255_12_255_13_255_4_-1_6_1000_7_1_15_1_18_0_8_1|",
    "1_0_2_102_3_255_6_1001_7_0.5_15_1_18_0_8_1_9_1000_10_30a1a1a0a0|,",
    "kA13,0,kA15,0,kA16,0,kA14,,kA6,0,kA7,0;",
    "1,1,2,15,3,15;",
    "1,8,2,45,3,15,6,90,21,1001,43,10a0.8a1a0a0;",
    "1,1816,2,75,3,45,57,3.7.12,32,0.5,80,4;"
);

#[test]
fn level_string_is_byte_stable() {
    let level = LevelString::decode(LEVEL).expect("level must decode");
    assert_eq!(level.objects.len(), 3);
    assert_eq!(level.header[&Key::from("kA14")], Value::Str(String::new()));
    assert_eq!(
        level.encode(&CodecOptions::default()).expect("encode"),
        LEVEL
    );
}

#[test]
fn typed_properties_decode_to_native_values() {
    let level = LevelString::decode(LEVEL).expect("level must decode");
    let spike = &level.objects[1];
    assert_eq!(spike.id(), Some(8));
    assert_eq!(spike.get(prop::ROTATION), Some(&Value::Float(90.0)));
    assert_eq!(spike.get(prop::MAIN_COLOR), Some(&Value::Int(1001)));
    let hsv = spike.main_hsv().expect("hsv must decode as a record");
    assert_eq!((hsv.hue, hsv.saturation), (10, 0.8));

    let trigger = &level.objects[2];
    assert_eq!(trigger.groups(), [3, 7, 12]);
    assert_eq!(trigger.get(prop::SCALE), Some(&Value::Float(0.5)));
    assert_eq!(trigger.get(80), Some(&Value::Str("4".into())));

    let colors = level.colors().expect("colors");
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[1].get(color_prop::OPACITY), Some(&Value::Float(0.5)));
    assert_eq!(colors[1].get(color_prop::COPY_CHANNEL), Some(&Value::Int(1000)));
    assert_eq!(colors[1].copy_hsv().map(|h| h.hue), Some(30));
}

#[test]
fn edited_level_re_encodes_sparsely() {
    let mut level = LevelString::decode(LEVEL).expect("level must decode");
    level.objects[0].set(prop::FLIP_Y, true);
    level.objects[1].set(prop::MAIN_HSV, Value::None);
    level.objects.push(GameObject::new(1, 105.0, 15.0));
    let wire = level.encode(&CodecOptions::default()).expect("encode");
    assert!(wire.contains(";1,1,2,15,3,15,5,1;"));
    assert!(wire.contains(";1,8,2,45,3,15,6,90,21,1001;"));
    assert!(wire.ends_with(";1,1,2,105,3,15;"));
}

#[test]
fn hsv_values_travel_as_custom_values() {
    let hsv = Hsv {
        hue: -45,
        saturation: 0.25,
        value: -0.5,
        saturation_add: true,
        value_add: true,
    };
    let mut object = GameObject::new(1, 0.0, 0.0);
    object.set(prop::DETAIL_HSV, Value::custom(hsv.clone()));
    let wire = object.encode(&CodecOptions::default()).expect("encode");
    assert_eq!(wire, "1,1,2,0,3,0,44,-45a0.25a-0.5a1a1;");
    let back = GameObject::decode(&wire).expect("decode");
    let decoded = back.get(prop::DETAIL_HSV).and_then(|v| v.downcast_ref::<Hsv>());
    assert_eq!(decoded, Some(&hsv));
    assert_eq!(back, object);
}

#[test]
fn float_precision_applies_to_nested_records() {
    let object = GameObject::decode("1,1,2,15.123456,3,15,43,0a0.333333a1a0a0;").expect("decode");
    let options = CodecOptions::default().with_float_precision(Some(2));
    assert_eq!(
        object.encode(&options).expect("encode"),
        "1,1,2,15.12,3,15,43,0a0.33a1a0a0;"
    );
}

#[test]
fn compressed_level_data_accepts_every_container() {
    let level = LevelString::decode(LEVEL).expect("level must decode");
    let options = CodecOptions::default();
    let kwargs = Kwargs::new();
    for compression in [Compression::Gzip, Compression::Zlib] {
        let codec = Compressed::new(gdform::formats::LevelStringCodec, compression);
        let wire = codec.to_string(&level, &options, &kwargs).expect("compress");
        assert_eq!(LevelString::decompress(&wire).expect("auto"), level);
    }
    let deflate = Compressed::new(gdform::formats::LevelStringCodec, Compression::Deflate);
    let wire = deflate.to_string(&level, &options, &kwargs).expect("compress");
    assert_eq!(deflate.from_string(&wire, &kwargs).expect("inflate"), level);

    let first = LevelString::compressed().to_string(&level, &options, &kwargs).expect("gzip");
    let second = LevelString::compressed().to_string(&level, &options, &kwargs).expect("gzip");
    assert_eq!(first, second, "gzip output must be reproducible");
}

#[test]
fn malformed_records_abort_the_whole_decode() {
    let kwargs = Kwargs::new();
    assert!(matches!(
        decode_objects("1,1,2;1,2,2,3;", &kwargs),
        Err(CodecError::OddTokenCount(3))
    ));
    let err = decode_objects("1,1,57,1.x;", &kwargs).expect_err("bad group id");
    assert!(err.to_string().starts_with("GameObject.57: "));
    assert!(matches!(
        Hsv::decode("0a1a1a0a0a0"),
        Err(CodecError::TooManyTokens { .. })
    ));
    assert!(ColorChannel::decode("1_255_2").is_err());
}

#[test]
fn list_and_channel_codecs_are_reusable() {
    let kwargs = Kwargs::new();
    let items = object_list_codec()
        .decode("1,1;1,2;", &kwargs)
        .expect("decode");
    assert_eq!(items.len(), 2);
    let channel = color_channel_codec()
        .decode("6_1000_1_255|", &kwargs)
        .expect("decode");
    assert_eq!(channel.keys().next(), Some(&Key::Int(6)));
}
