use chrono::{Duration, TimeZone, Utc};
use ini_doc::{
    empty, insensitive_load, load, load_sources, loose_load, shadow_load, ApplyOnce, Document,
    EncodeOptions, Error, LoadOptions, Source,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

fn full() -> Document {
    let options = LoadOptions::new().with_child_section_delimiter(":");
    load_sources(options, [fixture("full.ini")]).unwrap()
}

#[test]
fn test_load_mixed_sources() {
    let doc = load_sources(
        LoadOptions::default(),
        [
            Source::from(fixture("minimal.ini")),
            Source::from(b"NAME = ini\nIMPORT_PATH = gopkg.in/%(NAME)s.%(VERSION)s".as_slice()),
            Source::from_reader(std::io::Cursor::new("VERSION = v1")).unwrap(),
            Source::from(b"[author]\nNAME = Unknwon".as_slice()),
        ],
    )
    .unwrap();

    assert_eq!(doc.value("", "NAME").unwrap(), "ini");
    assert_eq!(doc.value("", "VERSION").unwrap(), "v1");
    assert_eq!(doc.value("", "IMPORT_PATH").unwrap(), "gopkg.in/ini.v1");
    assert_eq!(doc.value("author", "NAME").unwrap(), "Unknwon");
    assert_eq!(doc.value("author", "E-MAIL").unwrap(), "u@gogs.io");
}

#[test]
fn test_full_fixture_values() {
    let doc = full();
    assert_eq!(
        doc.section_strings(),
        vec![
            "",
            "author",
            "package",
            "package:sub",
            "features",
            "types",
            "array",
            "note",
            "comments",
            "string escapes",
            "advance"
        ]
    );

    let author = doc.section("author").unwrap();
    assert_eq!(
        author.comment(),
        "# Information about package author\n# Bio can be written in multiple lines."
    );
    assert_eq!(author.key("NAME").unwrap().comment(), "; Succeeding comment");
    assert_eq!(doc.value("author", "GITHUB").unwrap(), "https://github.com/Unknwon");
    assert_eq!(
        doc.value("author", "BIO").unwrap(),
        "Gopher.\nCoding addict.\nGood man.\n"
    );

    let features = doc.section("features").unwrap();
    assert_eq!(features.key_strings(), vec!["#1", "#2", "#3"]);
    assert_eq!(
        features.key("#2").unwrap().value(),
        "Support auto-increment of key names"
    );

    assert_eq!(doc.value("note", "empty_lines").unwrap(), "next line is empty");
    assert_eq!(doc.value("advance", "true").unwrap(), "2+3=5");
    assert_eq!(doc.value("advance", "1+1=2").unwrap(), "true");
    assert_eq!(doc.value("advance", "6+1=7").unwrap(), "true");
    assert_eq!(doc.value("advance", "`5+5`").unwrap(), "10");
    assert_eq!(doc.value("advance", "\"6+6\"").unwrap(), "12");
    assert_eq!(doc.value("advance", "7-2=4").unwrap(), "false");
    assert_eq!(doc.value("advance", "value with quotes").unwrap(), "some value");
    assert_eq!(doc.value("advance", "value quote2 again").unwrap(), "some value");
    assert_eq!(doc.value("advance", "includes comment sign").unwrap(), "my#password");
    assert_eq!(doc.value("advance", "includes comment sign2").unwrap(), "my;password");
    assert_eq!(
        doc.value("advance", "ADDRESS").unwrap(),
        "404 road,\nNotFound, State, 50000"
    );
    assert_eq!(
        doc.value("advance", "two_lines").unwrap(),
        "how about continuation lines?"
    );
}

#[test]
fn test_typed_accessors() {
    let doc = full();
    let types = doc.section("types").unwrap();
    assert_eq!(types.key("STRING").unwrap().value(), "str");
    assert!(types.key("BOOL").unwrap().bool().unwrap());
    assert!(!types.key("BOOL_FALSE").unwrap().bool().unwrap());
    assert_eq!(types.key("FLOAT64").unwrap().float().unwrap(), 1.25);
    assert_eq!(types.key("INT").unwrap().int().unwrap(), 10);
    assert_eq!(types.key("UINT").unwrap().uint().unwrap(), 3);
    assert_eq!(
        types.key("DURATION").unwrap().duration().unwrap(),
        Duration::minutes(165)
    );
    let expected = Utc.with_ymd_and_hms(2015, 1, 1, 20, 17, 5).unwrap();
    assert_eq!(types.key("TIME").unwrap().time().unwrap(), expected);

    assert!(types.key("STRING").unwrap().int().is_err());
    assert_eq!(types.key("STRING").unwrap().must_int(7), 7);
    assert_eq!(types.key("STRING").unwrap().in_str("b", &["a", "b"]), "b");
    assert_eq!(types.key("INT").unwrap().range_int(0, 1, 5), 0);

    let array = doc.section("array").unwrap();
    assert_eq!(array.key("STRINGS").unwrap().strings(","), vec!["en", "zh", "de"]);
    assert_eq!(array.key("FLOAT64S").unwrap().floats(",").unwrap(), vec![1.1, 2.2, 3.3]);
    assert_eq!(array.key("INTS").unwrap().ints(",").unwrap(), vec![1, 2, 3]);
    assert_eq!(array.key("UINTS").unwrap().uints(",").unwrap(), vec![1, 2, 3]);
    assert_eq!(array.key("TIMES").unwrap().times(",").unwrap(), vec![expected; 3]);
}

#[test]
fn test_string_escapes() {
    let doc = full();
    let section = doc.section("string escapes").unwrap();
    let strings = |name: &str| section.key(name).unwrap().strings(",");
    assert_eq!(strings("key1"), vec!["value1", "value2", "value3"]);
    assert_eq!(strings("key2"), vec!["value1, value2"]);
    assert_eq!(strings("key4"), vec!["value1\\", "value\\\\2"]);
    assert_eq!(strings("key6"), vec!["aaa bbb\\ and\\ space ccc"]);
}

#[test]
fn test_comments_attach_to_sections_and_keys() {
    let doc = full();
    let comments = doc.section("comments").unwrap();
    assert_eq!(
        comments.comment(),
        "; Comment before the section\n; This is a comment for the section too"
    );
    assert_eq!(comments.key("key").unwrap().comment(), "; Comment before key");
    assert_eq!(comments.key("key").unwrap().value(), "value");
    assert_eq!(
        comments.key("key2").unwrap().comment(),
        "; This is a comment for key2"
    );
    assert_eq!(comments.key("key2").unwrap().value(), "value2");
}

#[test]
fn test_parent_keys_and_children() {
    let doc = full();
    let inherited: Vec<&str> = doc.parent_keys("package:sub").iter().map(|k| k.name()).collect();
    assert_eq!(inherited, vec!["CLONE_URL"]);
    assert_eq!(
        doc.value("package:sub", "CLONE_URL").unwrap(),
        "https://gopkg.in/ini.v1"
    );
    assert_eq!(
        doc.value("package:fake:sub", "CLONE_URL").unwrap(),
        "https://gopkg.in/ini.v1"
    );

    let options = LoadOptions::new().with_child_section_delimiter(":");
    let doc = load_sources(
        options,
        [b"[node]\n[node:biz1]\n[node:biz2]\n[node.biz3]\n[node:biz1:deep]".as_slice()],
    )
    .unwrap();
    let children: Vec<&str> = doc.child_sections("node").iter().map(|s| s.name()).collect();
    assert_eq!(children, vec!["node:biz1", "node:biz2"]);
}

#[test]
fn test_parent_keys_follow_definition_order() {
    let options = LoadOptions::new().with_child_section_delimiter(":");
    let doc = load_sources(
        options,
        [b"[a]\nz = 1\nm = 2\nb = 3\n[a:b]\nown = 4".as_slice()],
    )
    .unwrap();
    let names: Vec<&str> = doc.parent_keys("a:b").iter().map(|k| k.name()).collect();
    assert_eq!(names, vec!["z", "m", "b"]);
}

#[test]
fn test_unparseable_section_body() {
    let options = LoadOptions::new().with_unparseable_sections(["core"]);
    let doc = load_sources(options, [b"[core]\nraw ### text\n".as_slice()]).unwrap();
    let core = doc.section("core").unwrap();
    assert_eq!(core.body(), "raw ### text");
    assert_eq!(core.key_count(), 0);
    assert_eq!(doc.to_ini_string(), "[core]\nraw ### text\n\n");
}

#[test]
fn test_continuation_disabled_keeps_marker() {
    let options = LoadOptions::new().with_ignore_continuation(true);
    let doc = load_sources(options, [b"key1=a\\b\\\nkey2=c".as_slice()]).unwrap();
    assert_eq!(doc.value("", "key1").unwrap(), "a\\b\\key2=c");
    assert!(!doc.section("").unwrap().has_key("key2"));
}

#[test]
fn test_inline_comment_becomes_key_comment() {
    let doc = load(b"key = value ;trailing".as_slice()).unwrap();
    let key = doc.key("", "key").unwrap();
    assert_eq!(key.value(), "value");
    assert_eq!(key.comment(), ";trailing");

    let options = LoadOptions::new().with_ignore_inline_comment(true);
    let doc = load_sources(options, [b"key = value ;trailing".as_slice()]).unwrap();
    assert_eq!(doc.value("", "key").unwrap(), "value ;trailing");

    let options = LoadOptions::new().with_space_before_inline_comment(true);
    let doc = load_sources(options, [b"a = x;y\nb = x ;y".as_slice()]).unwrap();
    assert_eq!(doc.value("", "a").unwrap(), "x;y");
    assert_eq!(doc.value("", "b").unwrap(), "x");
}

#[test]
fn test_escaped_comment_markers() {
    let doc = load(b"key = a \\# b".as_slice()).unwrap();
    assert_eq!(doc.value("", "key").unwrap(), "a \\# b");

    let options = LoadOptions::new().with_unescape_value_comment_symbols(true);
    let doc = load_sources(options, [b"key = a \\# b \\; c".as_slice()]).unwrap();
    assert_eq!(doc.value("", "key").unwrap(), "a # b ; c");
}

#[test]
fn test_missing_delimiter_fails_with_content() {
    let err = load(b"[s]\nfoo".as_slice()).unwrap_err();
    assert!(matches!(&err, Error::DelimiterNotFound { line: 2, content } if content == "foo"));
    assert!(err.to_string().contains("foo"));

    let options = LoadOptions::new().with_allow_boolean_keys(true);
    let doc = load_sources(options, [b"[s]\nfoo".as_slice()]).unwrap();
    assert!(doc.key("s", "foo").unwrap().is_boolean());

    let options = LoadOptions::new().with_skip_unrecognizable_lines(true);
    let doc = load_sources(options, [b"[s]\nfoo\nbar = 1".as_slice()]).unwrap();
    assert_eq!(doc.section("s").unwrap().key_strings(), vec!["bar"]);
}

#[test]
fn test_structural_errors() {
    assert!(matches!(
        load(b"[unclosed".as_slice()),
        Err(Error::UnclosedSection { line: 1, .. })
    ));
    assert!(matches!(
        load(b"a = 1\n[  ]".as_slice()),
        Err(Error::EmptySectionName { line: 2 })
    ));
    assert!(matches!(
        load(b"k = \"\"\"never closed\nmore".as_slice()),
        Err(Error::UnclosedQuote { line: 1, .. })
    ));
    assert!(matches!(
        load(b"  indented without key".as_slice()),
        Err(Error::DelimiterNotFound { .. })
    ));
}

#[test]
fn test_shadow_keys() {
    let doc = shadow_load(b"[s]\nurl = a\nurl = b\nurl = a".as_slice()).unwrap();
    let key = doc.key("s", "url").unwrap();
    assert_eq!(key.value(), "a");
    assert_eq!(key.values(), ["a", "b"]);
    assert_eq!(doc.section("s").unwrap().key_count(), 1);

    let options = LoadOptions::new()
        .with_allow_shadows(true)
        .with_allow_duplicate_shadow_values(true);
    let doc = load_sources(options, [b"[s]\nurl = a\nurl = a".as_slice()]).unwrap();
    assert_eq!(doc.key("s", "url").unwrap().values(), ["a", "a"]);

    let doc = load(b"[s]\nurl = a\nurl = b".as_slice()).unwrap();
    assert_eq!(doc.key("s", "url").unwrap().values(), ["b"]);
}

#[test]
fn test_case_folding() {
    let doc = insensitive_load(fixture("minimal.ini")).unwrap();
    assert_eq!(doc.value("Author", "e-mail").unwrap(), "u@gogs.io");
    assert_eq!(doc.section_strings(), vec!["", "author"]);

    let options = LoadOptions::new().with_insensitive_keys(true);
    let doc = load_sources(options, [fixture("minimal.ini")]).unwrap();
    assert_eq!(doc.value("author", "E-Mail").unwrap(), "u@gogs.io");
    assert!(doc.section("AUTHOR").is_err());
}

#[test]
fn test_python_multiline_fixture() {
    let options = LoadOptions::new().with_allow_python_multiline_values(true);
    let doc = load_sources(options, [fixture("multiline.ini")]).unwrap();
    assert_eq!(doc.section_strings(), vec![""]);
    assert_eq!(
        doc.value("", "value1").unwrap(),
        "some text here\nsome more text here\n\nthere is an empty line above and below\n"
    );
    assert_eq!(
        doc.value("", "value2").unwrap(),
        "there is an empty line above\nthat is not indented so it should not be part\nof the value"
    );
}

#[test]
fn test_loose_and_short_circuit_loading() {
    let missing = fixture("404.ini");
    assert!(load(missing.clone()).unwrap_err().is_not_found());

    let doc = loose_load(missing.clone()).unwrap();
    assert_eq!(doc.section_strings(), vec![""]);

    let options = LoadOptions::new().with_short_circuit(true);
    let doc = load_sources(
        options,
        [Source::from(fixture("minimal.ini")), Source::from(b"key1 = value1".as_slice())],
    )
    .unwrap();
    assert!(doc.key("", "key1").is_err());

    let options = LoadOptions::new().with_short_circuit(true);
    assert!(load_sources(options, [missing.clone(), fixture("minimal.ini")]).is_err());

    let options = LoadOptions::new().with_short_circuit(true).with_loose(true);
    let doc = load_sources(options, [missing, fixture("minimal.ini")]).unwrap();
    assert_eq!(doc.value("author", "E-MAIL").unwrap(), "u@gogs.io");
}

#[test]
fn test_utf16_sources() {
    let text = "[s]\nname = gruß";
    let mut le = vec![0xFF, 0xFE];
    let mut be = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        le.extend_from_slice(&unit.to_le_bytes());
        be.extend_from_slice(&unit.to_be_bytes());
    }
    for bytes in [le, be] {
        let doc = load(bytes).unwrap();
        assert_eq!(doc.value("s", "name").unwrap(), "gruß");
    }

    let mut bom = vec![0xEF, 0xBB, 0xBF];
    bom.extend_from_slice(text.as_bytes());
    assert_eq!(load(bom).unwrap().value("s", "name").unwrap(), "gruß");

    assert!(matches!(
        load(vec![0xFF, 0xFE, 0x41]),
        Err(Error::Encoding { .. })
    ));
}

#[test]
fn test_full_fixture_round_trip() {
    let doc = full();
    let text = doc.to_ini_string();
    let options = LoadOptions::new().with_child_section_delimiter(":");
    let again = load_sources(options, [text.into_bytes()]).unwrap();

    assert_eq!(doc.section_strings(), again.section_strings());
    for section in doc.sections() {
        let other = again.section(section.name()).unwrap();
        assert_eq!(section.key_strings(), other.key_strings(), "[{}]", section.name());
        for key in section.keys() {
            assert_eq!(key.values(), other.key(key.name()).unwrap().values());
            assert_eq!(key.comment(), other.key(key.name()).unwrap().comment());
        }
    }
}

#[test]
fn test_save_and_reload_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");

    let mut doc = empty();
    doc.section_mut("").new_key("mode", "dev").unwrap();
    let server = doc.new_section("server").unwrap();
    server.set_comment("; HTTP settings");
    server.new_key("port", "8080").unwrap();
    doc.save_to_with(&path, &EncodeOptions::new().with_indent(2)).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "mode = dev\n\n; HTTP settings\n[server]\n  port = 8080\n\n"
    );

    let mut loaded = load(path.clone()).unwrap();
    assert_eq!(loaded.value("server", "port").unwrap(), "8080");

    std::fs::write(&path, "mode = prod\n").unwrap();
    loaded.reload().unwrap();
    assert_eq!(loaded.value("", "mode").unwrap(), "prod");
    assert!(!loaded.has_section("server"));
}

#[test]
fn test_mutation_api() {
    let mut doc = full();
    assert!(doc.delete_section("package:sub").is_some());
    assert!(!doc.has_section("package:sub"));

    let types = doc.section_mut("types");
    assert!(types.delete_key("STRING").is_some());
    assert!(matches!(types.new_key("INT", "11"), Err(Error::DuplicateKey { .. })));
    types.set_key("INT", "11").unwrap();
    assert_eq!(doc.key("types", "INT").unwrap().int().unwrap(), 11);

    let fresh = doc.section_mut("fresh");
    fresh.new_key("k", "v").unwrap();
    assert_eq!(doc.section_strings().last(), Some(&"fresh"));
    assert!(doc.section("missing").is_err());
}

#[test]
fn test_apply_once_saves_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("once.ini");
    let gate = ApplyOnce::new();

    let mut doc = empty();
    doc.section_mut("").new_key("run", "1").unwrap();
    gate.run(|| doc.save_to(&path)).unwrap();

    doc.section_mut("").set_key("run", "2").unwrap();
    gate.run(|| doc.save_to(&path)).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "run = 1\n");
}
