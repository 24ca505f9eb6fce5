use std::fs;

use gdform::formats::save::{LEVEL_DATA, LOCAL_LEVELS, SAVE_FILE_NAME};
use gdform::formats::{GameSave, LevelString, LOAD_CONTENT};
use gdform::serialization::resource::{FileResource, StringCodec};
use gdform::serialization::{Caster, DictCodec, FunctionTable, Kwargs};
use gdform::{CodecError, CodecOptions, Key, Map, Value};
use gdform_compression::{decompress_bytes, Compression, SAVE_XOR_KEY};

fn pairs() -> DictCodec {
    DictCodec::new(",", FunctionTable::new().with(1, Caster::int())).numeric_keys()
}

fn sample_map() -> Map {
    let mut map = Map::new();
    map.insert(Key::Int(1), Value::Int(9));
    map.insert(Key::from("name"), Value::from("x"));
    map
}

#[test]
fn file_resource_resolves_directories_and_extensions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resource = FileResource::new(pairs())
        .with_extension("txt")
        .with_name(|map: Option<&Map>| {
            map.and_then(|m| m.get(&Key::from("name")))
                .and_then(Value::as_str)
                .unwrap_or("untitled")
                .to_owned()
        });

    let written = resource
        .save(&sample_map(), Some(dir.path()), &CodecOptions::default(), &Kwargs::new())
        .expect("save must succeed");
    assert_eq!(written, dir.path().join("x.txt"));
    assert_eq!(fs::read_to_string(&written).expect("read back"), "1,9,name,x");

    let loaded = resource
        .load(Some(dir.path().join("x").as_path()), &Kwargs::new())
        .expect("extension is appended");
    assert_eq!(loaded, sample_map());

    assert!(matches!(
        resource.resolve_path(Some(dir.path().join("x.dat").as_path()), None),
        Err(CodecError::Extension { ref expected, .. }) if expected == "txt"
    ));
    assert_eq!(
        resource
            .resolve_path(Some(dir.path()), None)
            .expect("directory resolves"),
        dir.path().join("untitled.txt")
    );
}

#[test]
fn file_resource_path_fallbacks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bare = FileResource::new(pairs());
    assert!(matches!(bare.resolve_path(None, None), Err(CodecError::MissingPath)));
    assert!(matches!(
        bare.resolve_path(Some(dir.path()), None),
        Err(CodecError::NoFileName { .. })
    ));

    let default = dir.path().join("settings.txt");
    let with_default = FileResource::new(pairs()).with_default_path(&default);
    let written = with_default
        .save(&sample_map(), None, &CodecOptions::default(), &Kwargs::new())
        .expect("save to default path");
    assert_eq!(written, default);
    assert!(with_default.load(None, &Kwargs::new()).is_ok());
}

#[test]
fn missing_files_surface_io_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resource = FileResource::new(pairs());
    assert!(matches!(
        resource.load(Some(dir.path().join("nope").as_path()), &Kwargs::new()),
        Err(CodecError::Io(_))
    ));
}

#[test]
fn game_save_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let level = LevelString::decode("kA13,0;1,1,2,15,3,15;1,8,2,45,3,15;").expect("level");
    let mut save = GameSave::default();
    save.push_level("Stereo", "first", level.clone());
    save.push_level("Back", "second", LevelString::default());

    let options = CodecOptions::default();
    let path = save.save(Some(dir.path()), &options).expect("save");
    assert_eq!(path, dir.path().join(SAVE_FILE_NAME));

    let bytes = fs::read(&path).expect("read save");
    assert!(!bytes.starts_with(b"<"), "save files are obfuscated");
    let plain = decompress_bytes(&bytes, Some(SAVE_XOR_KEY), Compression::Gzip).expect("envelope");
    assert!(plain.starts_with("<?xml version=\"1.0\"?><plist version=\"1.0\" gjver=\"2.0\"><dict>"));
    assert!(plain.contains(&format!("<k>{LOCAL_LEVELS}</k><d><k>_isArr</k><t />")));

    let mut lazy = GameSave::load(Some(path.as_path()), &Kwargs::new()).expect("load");
    assert_eq!(lazy.levels().len(), 2);
    assert_eq!(lazy.level_name(1), Some("Back"));
    assert!(lazy.level_data(0).is_none());
    let raw = &lazy.level(0).expect("level 0")[&Key::from(LEVEL_DATA)];
    assert!(raw.as_str().is_some_and(|s| s.starts_with("H4sI")));

    lazy.load_content(&Kwargs::new()).expect("load content");
    assert_eq!(lazy.level_data(0), Some(&level));
    // Loading twice is a no-op.
    lazy.load_content(&Kwargs::new()).expect("load content again");

    let mut kwargs = Kwargs::new();
    kwargs.insert(LOAD_CONTENT.to_owned(), Value::Bool(true));
    let eager = GameSave::load(Some(path.as_path()), &kwargs).expect("eager load");
    assert_eq!(eager.level_data(0), Some(&level));
    assert_eq!(eager.level_data(1), Some(&LevelString::default()));
    assert_eq!(eager, lazy);
}

#[test]
fn game_save_bytes_are_reproducible() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut save = GameSave::default();
    save.push_level("A", "", LevelString::default());
    let options = CodecOptions::default();
    let first = save.save(Some(dir.path().join("one.dat").as_path()), &options).expect("save one");
    let second = save.save(Some(dir.path().join("two").as_path()), &options).expect("save two");
    assert_eq!(second, dir.path().join("two.dat"));
    assert_eq!(
        fs::read(first).expect("read one"),
        fs::read(second).expect("read two")
    );
}

#[test]
fn game_save_codec_reads_plain_documents() {
    let xml = "<?xml version=\"1.0\"?><plist version=\"1.0\" gjver=\"2.0\"><dict><k>LLM_01</k><d><k>_isArr</k><t /><k>k_1</k><d><k>k2</k><s>Plain</s><k>k3</k><s>aGk=</s></d></d><k>LLM_02</k><i>37</i></dict></plist>";
    let codec = GameSave::resource().codec().inner();
    let value = codec.from_string(xml, &Kwargs::new()).expect("decode");
    let save = GameSave {
        data: value.as_dict().cloned().expect("dict"),
    };
    assert_eq!(save.level_name(0), Some("Plain"));
    assert_eq!(
        save.level(0).expect("level")[&Key::from("k3")],
        Value::Str("hi".into())
    );
    assert_eq!(save.encode(&CodecOptions::default()).expect("encode"), xml);
}
