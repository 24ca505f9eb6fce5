use std::sync::Arc;

use gdform::casting::CastError;
use gdform::serialization::{
    Caster, Delimiter, Field, FieldType, Kwargs, Record, RecordCodec, RecordMode, RecordSchema,
    TrimRule,
};
use gdform::{CodecError, CodecOptions, Value};

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

fn trimmed() -> RecordCodec {
    RecordCodec::new(
        RecordSchema::builder("Trimmed")
            .positional(",")
            .field(Field::new("a", FieldType::Int).default(0))
            .field(Field::new("b", FieldType::Int).default(0))
            .field(Field::new("c", FieldType::Str))
            .field(Field::new("d", FieldType::Bool).default(false))
            .trim_trailing(TrimRule::defaults())
            .build(),
    )
}

fn keyed() -> RecordCodec {
    RecordCodec::new(
        RecordSchema::builder("Keyed")
            .keyed("_")
            .field(Field::new("channel", FieldType::Int).key("6"))
            .field(Field::new("opacity", FieldType::Float).key("7").default(1.0))
            .field(Field::new("blending", FieldType::Bool).key("5").default(false))
            .field(Field::new("label", FieldType::Base64Text).key("9"))
            .build(),
    )
}

#[test]
fn positional_scenario_round_trips() {
    let codec = RecordCodec::new(
        RecordSchema::builder("Abcd")
            .positional(",")
            .field(Field::new("a", FieldType::Int))
            .field(Field::new("b", FieldType::Int))
            .field(Field::new("c", FieldType::Int))
            .field(Field::new("d", FieldType::Bool))
            .build(),
    );
    let kwargs = Kwargs::new();
    let decoded = codec.decode("1,2,3,1", &kwargs).expect("decode must succeed");
    assert_eq!(
        decoded,
        record(&[
            ("a", Value::Int(1)),
            ("b", Value::Int(2)),
            ("c", Value::Int(3)),
            ("d", Value::Bool(true)),
        ])
    );
    let wire = codec
        .encode(&decoded, &CodecOptions::default(), &kwargs)
        .expect("encode must succeed");
    assert_eq!(wire, "1,2,3,1");
}

#[test]
fn trimming_drops_only_the_trailing_default_run() {
    let codec = trimmed();
    let options = CodecOptions::default();
    let kwargs = Kwargs::new();
    let cases = [
        (
            record(&[
                ("a", Value::Int(5)),
                ("b", Value::Int(0)),
                ("c", Value::Str("x".into())),
                ("d", Value::Bool(false)),
            ]),
            "5,0,x",
        ),
        (
            record(&[("a", Value::Int(5)), ("b", Value::Int(0)), ("d", Value::Bool(false))]),
            "5",
        ),
        (
            record(&[
                ("a", Value::Int(0)),
                ("b", Value::Int(0)),
                ("c", Value::Str(String::new())),
                ("d", Value::Bool(true)),
            ]),
            "0,0,,1",
        ),
        (record(&[]), ""),
    ];
    for (input, expected) in cases {
        let wire = codec.encode(&input, &options, &kwargs).expect("encode must succeed");
        assert_eq!(wire, expected, "input {input:?}");
        let again = codec
            .encode(&codec.decode(&wire, &kwargs).expect("decode"), &options, &kwargs)
            .expect("re-encode");
        assert_eq!(again, wire, "trimmed form must be stable");
    }
}

#[test]
fn shortfall_reads_declared_defaults_only() {
    let codec = trimmed();
    let decoded = codec.decode("7", &Kwargs::new()).expect("decode must succeed");
    assert_eq!(decoded.len(), 1, "decoded records stay sparse");
    assert_eq!(codec.get_int(&decoded, "a").expect("a"), 7);
    assert_eq!(codec.get_int(&decoded, "b").expect("b"), 0);
    assert!(!codec.get_bool(&decoded, "d").expect("d"));
    assert!(
        matches!(codec.get(&decoded, "c"), Err(CodecError::MissingField { .. })),
        "no implicit zero for undeclared defaults"
    );
    let filled = codec.with_defaults(&decoded);
    assert_eq!(filled["b"], Value::Int(0));
    assert!(!filled.contains_key("c"));
}

#[test]
fn positional_shortfall_re_encodes_to_the_same_tokens() {
    let codec = RecordCodec::new(
        RecordSchema::builder("Abcd")
            .positional(",")
            .field(Field::new("a", FieldType::Int))
            .field(Field::new("b", FieldType::Int))
            .field(Field::new("c", FieldType::Int))
            .field(Field::new("d", FieldType::Bool))
            .build(),
    );
    let options = CodecOptions::default();
    let kwargs = Kwargs::new();
    for wire in ["1,2", "1", "", "1,2,3"] {
        let decoded = codec.decode(wire, &kwargs).expect("decode must succeed");
        let again = codec.encode(&decoded, &options, &kwargs).expect("encode must succeed");
        assert_eq!(again, wire);
        assert_eq!(codec.decode(&again, &kwargs).expect("re-decode"), decoded);
    }

    let gap = record(&[("a", Value::Int(1)), ("b", Value::None), ("c", Value::Int(3))]);
    let err = codec.encode(&gap, &options, &kwargs).expect_err("gap must not be written");
    assert!(
        matches!(err, CodecError::MissingField { ref type_name, ref field } if type_name == "Abcd" && field == "b")
    );
}

#[test]
fn keyed_mode_aliases_and_declaration_order() {
    let codec = keyed();
    let kwargs = Kwargs::new();
    let decoded = codec.decode("9_aGk=_6_1004", &kwargs).expect("decode must succeed");
    assert_eq!(decoded["channel"], Value::Int(1004));
    assert_eq!(decoded["label"], Value::Str("hi".into()));
    // Absent keys read as their declared defaults, so an absent bool is never
    // implicitly `false` unless declared so.
    assert!(!decoded.contains_key("opacity"));
    assert_eq!(codec.get_float(&decoded, "opacity").expect("opacity"), 1.0);
    assert!(!codec.get_bool(&decoded, "blending").expect("blending"));

    let options = CodecOptions::default();
    assert_eq!(
        codec.encode(&decoded, &options, &kwargs).expect("encode"),
        "6_1004_9_aGk="
    );
    let filled = codec.with_defaults(&decoded);
    assert_eq!(
        codec.encode(&filled, &options, &kwargs).expect("encode"),
        "6_1004_7_1_5_0_9_aGk="
    );
    let sparse = options.with_skip_defaults(true);
    assert_eq!(
        codec.encode(&filled, &sparse, &kwargs).expect("encode"),
        "6_1004_9_aGk="
    );
}

#[test]
fn keyed_encode_is_stable_across_decode() {
    let codec = keyed();
    let options = CodecOptions::default();
    let kwargs = Kwargs::new();
    let inputs = [
        record(&[("channel", Value::Int(1004))]),
        record(&[("channel", Value::Int(3)), ("blending", Value::Bool(true))]),
        record(&[("opacity", Value::Float(0.5)), ("label", Value::Str("hi".into()))]),
        record(&[]),
    ];
    for input in inputs {
        let wire = codec.encode(&input, &options, &kwargs).expect("encode must succeed");
        let decoded = codec.decode(&wire, &kwargs).expect("decode must succeed");
        assert_eq!(decoded, input);
        assert_eq!(codec.encode(&decoded, &options, &kwargs).expect("re-encode"), wire);
    }
    assert_eq!(
        codec
            .encode(&record(&[("channel", Value::Int(1004))]), &options, &kwargs)
            .expect("encode"),
        "6_1004"
    );
}

#[test]
fn keyed_mode_rejects_unknown_and_unpaired_tokens() {
    let codec = keyed();
    let kwargs = Kwargs::new();
    let err = codec.decode("6_1_99_2", &kwargs).expect_err("unknown key");
    assert!(matches!(err, CodecError::UnknownKey { ref type_name, ref key } if type_name == "Keyed" && key == "99"));
    assert!(matches!(
        codec.decode("6_1_7", &kwargs),
        Err(CodecError::OddTokenCount(3))
    ));
}

#[test]
fn errors_carry_type_and_field() {
    let err = keyed().decode("7_abc", &Kwargs::new()).expect_err("bad float");
    match &err {
        CodecError::Context {
            type_name, field, ..
        } => {
            assert_eq!(type_name, "Keyed");
            assert_eq!(field, "opacity");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(err.root(), CodecError::Cast(CastError::InvalidFloat(_))));
}

#[test]
fn keyword_params_reach_only_declaring_fields() {
    let scaled = Caster::new(
        |raw, kwargs| {
            let n = raw.as_str().unwrap_or("0").parse::<i64>().unwrap_or(0);
            let scale = kwargs.get("scale").and_then(Value::as_int).unwrap_or(1);
            Ok(Value::Int(n * scale))
        },
        |value, _, kwargs| {
            let scale = kwargs.get("scale").and_then(Value::as_int).unwrap_or(1);
            Ok(value.as_int().map(|n| Value::Int(n / scale)))
        },
    );
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let codec = RecordCodec::new(
        RecordSchema::builder("Scaled")
            .positional(",")
            .field(Field::new("x", FieldType::Int).caster(scaled).params(["scale"]))
            .field(Field::new("y", FieldType::Int).decoder(Arc::new(
                move |raw: Value, kwargs: &Kwargs| -> Result<Value, CodecError> {
                    recorder
                        .lock()
                        .map_err(|_| CastError::InvalidInt("poisoned".into()))?
                        .push(kwargs.len());
                    Ok(Value::Int(raw.as_str().unwrap_or("0").parse().unwrap_or(0)))
                },
            )))
            .build(),
    );
    let mut kwargs = Kwargs::new();
    kwargs.insert("scale".into(), Value::Int(10));
    kwargs.insert("unrelated".into(), Value::Bool(true));
    let decoded = codec.decode("3,4", &kwargs).expect("decode must succeed");
    assert_eq!(decoded["x"], Value::Int(30));
    assert_eq!(decoded["y"], Value::Int(4));
    assert_eq!(*seen.lock().expect("lock"), vec![0]);
    assert_eq!(
        codec
            .encode(&decoded, &CodecOptions::default(), &kwargs)
            .expect("encode"),
        "3,4"
    );
}

#[test]
fn delimited_records_and_schema_accessors() {
    let codec = RecordCodec::new(
        RecordSchema::builder("Point")
            .positional("~")
            .delimited(Delimiter::new("[", "]"))
            .field(Field::new("x", FieldType::Float))
            .field(Field::new("y", FieldType::Float))
            .build(),
    );
    assert_eq!(codec.schema().mode(), RecordMode::Positional);
    assert_eq!(codec.schema().fields()[1].wire_key(), "y");
    let kwargs = Kwargs::new();
    let decoded = codec.decode("[1.5~-2]", &kwargs).expect("decode");
    assert_eq!(decoded["y"], Value::Float(-2.0));
    assert_eq!(
        codec
            .encode(&decoded, &CodecOptions::default(), &kwargs)
            .expect("encode"),
        "[1.5~-2]"
    );
    assert!(matches!(
        codec.decode("1.5~-2", &kwargs),
        Err(CodecError::MissingDelimiter { .. })
    ));
}

#[test]
fn derived_dict_codec_is_strict() {
    let dict = keyed().as_dict_codec();
    let kwargs = Kwargs::new();
    let map = dict.decode("6_12_5_1", &kwargs).expect("decode");
    assert_eq!(map.len(), 2);
    assert!(dict.decode("6_12_8_1", &kwargs).is_err());
}
