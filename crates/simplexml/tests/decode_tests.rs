//! Decoding whole documents from files, readers and hand-built event streams.

use pretty_assertions::assert_eq;
use serde_json::json;
use simplexml::{Conversion, Decoder, DecoderOptions, Error, Value, XmlEvent, XmlEvents};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {}", name))
}

fn markup(text: &str) -> Value {
    Value::Markup(text.to_string())
}

// ==================== Fixture Tests ====================

#[test]
fn test_book_with_document_profile() {
    let decoder = Decoder::new(DecoderOptions::document().with_conversion(Conversion::Identity));
    let doc = decoder.decode_str(&load_fixture("book.xml")).unwrap();

    assert_eq!(doc.root, "node");
    assert_eq!(doc.get("title"), Some(&Value::from("My Book")));
    assert_eq!(doc.get("date"), Some(&Value::from("23 April 2009")));
    assert_eq!(
        doc.get("content"),
        Some(&markup(
            "<h1>Chapter 1</h1><p><em>These</em> are the times that\n    try mens' soles....</p>"
        ))
    );
    assert_eq!(
        doc.get("endnote"),
        Some(&Value::from(json!(["This is the first.", "This is the last."])))
    );
}

#[test]
fn test_book_with_structural_detection() {
    let doc = Decoder::default()
        .decode_str(&load_fixture("book.xml"))
        .unwrap();

    let content = doc.get("content").unwrap();
    assert_eq!(content.get("h1"), Some(&Value::from("Chapter 1")));
    assert_eq!(
        content.get("p"),
        Some(&markup("<em>These</em> are the times that try mens' soles...."))
    );
    assert_eq!(doc.get("author"), Some(&Value::from("Me")));
}

#[test]
fn test_catalog_from_reader() {
    let file = File::open(fixture_path("catalog.xml")).unwrap();
    let decoder = Decoder::new(DecoderOptions::new().with_skip(["note"]));
    let doc = decoder.decode_reader(BufReader::new(file)).unwrap();

    let items = doc.value.get_all("item");
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        Value::from(json!({"sku": "A-100", "price": 12.5, "stock": 4}))
    );
    assert_eq!(items[1].get("price"), Some(&Value::Integer(7)));
    assert_eq!(
        items[1].get("blurb"),
        Some(&markup("Now <b>half</b> price &amp; free shipping"))
    );
    assert_eq!(doc.get("updated"), Some(&Value::from("2009-04-23")));
}

#[test]
fn test_catalog_as_json() {
    let doc = Decoder::new(DecoderOptions::new().with_skip(["note", "blurb"]))
        .decode_str(&load_fixture("catalog.xml"))
        .unwrap();

    let json = serde_json::to_value(doc.into_keyed()).unwrap();
    assert_eq!(
        json,
        json!({
            "catalog": {
                "item": [
                    {"sku": "A-100", "price": 12.5, "stock": 4},
                    {"sku": "B-200", "price": 7, "stock": 0}
                ],
                "updated": "2009-04-23"
            }
        })
    );
}

// ==================== Conversion Tests ====================

#[test]
fn test_conversion_policies_on_leaves() {
    let xml = "<r><a> 12 </a><b>  two\n  words </b><c>1.5e2</c><d>   </d></r>";
    let decode = |conversion| {
        Decoder::new(DecoderOptions::new().with_conversion(conversion))
            .decode_str(xml)
            .unwrap()
            .value
    };

    assert_eq!(
        decode(Conversion::Trim),
        Value::from(json!({"a": "12", "b": "two\n  words", "c": "1.5e2", "d": null}))
    );
    assert_eq!(
        decode(Conversion::Number),
        Value::from(json!({"a": 12, "b": "two\n  words", "c": 150.0, "d": null}))
    );
    assert_eq!(
        decode(Conversion::NumberOrCollapse),
        Value::from(json!({"a": 12, "b": "two words", "c": 150.0, "d": null}))
    );
    assert_eq!(
        decode(Conversion::Identity),
        Value::from(json!({"a": " 12 ", "b": "  two\n  words ", "c": "1.5e2", "d": "   "}))
    );
}

#[test]
fn test_options_from_json() {
    let options = DecoderOptions::from_json_str(
        r#"{"conversion": "STRING", "mixed": ["content"], "skip": ["endnote"]}"#,
    )
    .unwrap();
    let doc = Decoder::new(options)
        .decode_str(&load_fixture("book.xml"))
        .unwrap();

    assert!(doc.get("endnote").is_none());
    assert!(doc.get("content").is_some_and(Value::is_markup));
}

#[test]
fn test_entities_and_cdata_in_leaves() {
    let doc = simplexml::decode("<r><a>x &amp; y</a><b><![CDATA[<raw>]]></b></r>").unwrap();
    assert_eq!(doc.value, Value::from(json!({"a": "x & y", "b": "<raw>"})));
}

#[test]
fn test_prefixed_tags_are_kept() {
    let doc = simplexml::decode(r#"<r xmlns:dc="urn:dc"><dc:title>T</dc:title></r>"#).unwrap();
    assert_eq!(doc.get("dc:title"), Some(&Value::from("T")));
}

// ==================== Event Stream Tests ====================

#[test]
fn test_hand_built_stream() {
    let events = vec![
        XmlEvent::start("a"),
        XmlEvent::start("x"),
        XmlEvent::text("1"),
        XmlEvent::end("x"),
        XmlEvent::start("x"),
        XmlEvent::text("2"),
        XmlEvent::end("x"),
        XmlEvent::end("a"),
    ];
    let doc = Decoder::default()
        .decode_events(events.into_iter().map(Ok))
        .unwrap();
    assert_eq!(doc.into_keyed(), Value::from(json!({"a": {"x": [1, 2]}})));
}

#[test]
fn test_missing_root_close_gives_no_result() {
    let events = vec![
        XmlEvent::start("a"),
        XmlEvent::start("x"),
        XmlEvent::text("1"),
        XmlEvent::end("x"),
    ];
    let result = Decoder::default().decode_events(events.into_iter().map(Ok));
    match result {
        Err(Error::MalformedInput { message, path }) => {
            assert_eq!(message, "input ended before </a> was closed");
            assert_eq!(path, vec!["a".to_string()]);
        }
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_tokenizer_events_feed_decoder() {
    let events = XmlEvents::from_text("<a><b>1</b></a>");
    let doc = Decoder::default().decode_events(events).unwrap();
    assert_eq!(doc.get("b"), Some(&Value::Integer(1)));
}

// ==================== Error Behavior Tests ====================

#[test]
fn test_conflict_names_tag_and_suggests_fix() {
    let decoder = Decoder::new(DecoderOptions::new().with_mixed_content(false));
    let err = decoder.decode_str("<a>text<b>1</b></a>").unwrap_err();

    assert!(matches!(&err, Error::MixedContentConflict { tag, .. } if tag == "a"));
    assert_eq!(err.code(), "SX-3");
    assert!(err.hint().unwrap().contains("\"a\""));

    let retry = Decoder::new(decoder.options().clone().with_mixed(["a"]));
    let doc = retry.decode_str("<a>text<b>1</b></a>").unwrap();
    assert_eq!(doc.value, markup("text<b>1</b>"));
}

#[test]
fn test_syntax_error_has_position() {
    let err = simplexml::decode("<a><b>1</c></a>").unwrap_err();
    match err {
        Error::XmlSyntax { position, .. } => assert!(position.is_some()),
        other => panic!("expected XmlSyntax, got {:?}", other),
    }
}

#[test]
fn test_text_after_root_is_ignored() {
    let doc = simplexml::decode("<a>1</a>trailing").unwrap();
    assert_eq!(doc.value, Value::Integer(1));
}

#[test]
fn test_decoder_shared_across_threads() {
    let decoder = Decoder::default();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let decoder = &decoder;
            scope.spawn(move || {
                let xml = format!("<a><n>{}</n><n>{}</n></a>", i, i + 1);
                let doc = decoder.decode_str(&xml).unwrap();
                assert_eq!(doc.value, Value::from(json!({"n": [i, i + 1]})));
            });
        }
    });
}
