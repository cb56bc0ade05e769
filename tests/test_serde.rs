#![cfg(feature = "serde")]

use xmlmap::{parse, DocumentMap};

#[test]
fn test_serialize_preserves_order() {
    let doc = parse(r#"<r z="1"><b>2</b><a>3</a><b>4</b></r>"#).unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    assert_eq!(json, r#"{"r":{"z":"1","b":["2","4"],"a":"3"}}"#);
}

#[test]
fn test_roundtrip_through_json() {
    let doc = parse(r#"<r id="1">t<a>x</a><a><b>y</b></a></r>"#).unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    let back: DocumentMap = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}
