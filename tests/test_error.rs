use rstest::rstest;
use xmlmap::{parse, parse_with_options, Error, ParseOptions, Strategy};

#[rstest]
#[case::empty("")]
#[case::whitespace("  \n\t ")]
fn test_empty_input(#[case] xml: &str) {
    assert!(matches!(parse(xml), Err(Error::EmptyInput)));
}

#[rstest]
#[case::mismatched_close("<a></b>")]
#[case::unclosed("<a><b></b>")]
#[case::multiple_roots("<a/><b/>")]
#[case::text_only("just text")]
#[case::declaration_only(r#"<?xml version="1.0"?>"#)]
#[case::unknown_prefix("<x:a/>")]
#[case::unknown_attribute_prefix(r#"<a x:b="1"/>"#)]
#[case::invalid_entity("<a>&bogus;</a>")]
#[case::unterminated_entity("<a>&amp</a>")]
#[case::broken_syntax("<a><</a>")]
fn test_malformed(#[case] xml: &str) {
    for strategy in [Strategy::Streaming, Strategy::Tree] {
        let options = ParseOptions {
            strategy,
            ..Default::default()
        };
        let err = parse_with_options(xml, &options).unwrap_err();
        assert!(err.is_malformed(), "{:?} with {:?}", err, strategy);
    }
}

#[test]
fn test_mismatched_close_tag_names_both() {
    let err = parse("<root><a></b></root>").unwrap_err();
    assert!(matches!(&err, Error::InvalidCloseTag(open, close) if open == "a" && close == "b"));
    assert_eq!(
        err.to_string(),
        "invalid close tag: expected </a>, found </b>"
    );
}

#[test]
fn test_unknown_prefix_is_named() {
    let err = parse("<root><x:a/></root>").unwrap_err();
    assert!(matches!(err, Error::UnknownPrefix(prefix) if prefix == "x"));
}

#[test]
fn test_prefix_out_of_scope() {
    let xml = r#"<root><a xmlns:x="http://x"/><x:b/></root>"#;
    assert!(matches!(parse(xml), Err(Error::UnknownPrefix(_))));
}

#[test]
fn test_no_partial_result_after_valid_prefix() {
    // a well-formed start does not leak a half-built map
    let result = parse("<root><a>1</a><b>2</b><c>");
    assert!(result.is_err());
}
