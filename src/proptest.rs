//! Proptest support
//!
//! Generates arbitrary XML documents as text, for testing properties of the
//! conversion that must hold for any input. Enable it with the `proptest`
//! feature:
//!
//! ```toml
//! [dependencies]
//! xmlmap = { version = "0.1", features = ["proptest"] }
//! ```

use ahash::HashSet;
use proptest::prelude::*;

use crate::entity::serialize_entities;

const NAMESPACES: &[(&str, &str)] = &[("", ""), ("x", "http://example.com/x"), ("y", "http://example.com/y")];
const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "d", "e", "id"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "q", "r", "_value"];
const TEXT: &str = "[a-z &<>\"'\n ]{0,6}";

/// A generated element.
#[derive(Debug, Clone)]
pub struct ArbElement {
    prefix: &'static str,
    name: &'static str,
    attributes: Vec<(&'static str, &'static str, String)>,
    children: Vec<ArbContent>,
}

/// Generated element content.
#[derive(Debug, Clone)]
pub enum ArbContent {
    /// Text.
    Text(String),
    /// A comment.
    Comment(String),
    /// An element.
    Element(ArbElement),
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", prefix, name)
    }
}

impl ArbElement {
    fn write(&self, out: &mut String, declare: bool) {
        let tag = qualified(self.prefix, self.name);
        out.push('<');
        out.push_str(&tag);
        if declare {
            for (prefix, uri) in NAMESPACES.iter().filter(|(prefix, _)| !prefix.is_empty()) {
                out.push_str(&format!(" xmlns:{}=\"{}\"", prefix, uri));
            }
        }
        for (prefix, name, value) in &self.attributes {
            out.push_str(&format!(
                " {}=\"{}\"",
                qualified(prefix, name),
                serialize_entities(value)
            ));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                ArbContent::Text(text) => out.push_str(&serialize_entities(text)),
                ArbContent::Comment(text) => out.push_str(&format!("<!--{}-->", text)),
                ArbContent::Element(element) => element.write(out, false),
            }
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    /// Serialize as a document, declaring all prefixes on this element.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, true);
        out
    }
}

fn arb_attributes() -> impl Strategy<Value = Vec<(&'static str, &'static str, String)>> {
    prop::collection::vec(
        (
            prop::sample::select(NAMESPACES),
            prop::sample::select(ATTRIBUTE_NAMES),
            TEXT,
        ),
        0..3,
    )
    .prop_map(|attributes| {
        let mut seen = HashSet::default();
        attributes
            .into_iter()
            .map(|((prefix, _), name, value)| (prefix, name, value))
            .filter(|(prefix, name, _)| seen.insert((*prefix, *name)))
            .collect()
    })
}

fn arb_content() -> impl Strategy<Value = ArbContent> {
    let leaf = prop_oneof![
        TEXT.prop_map(ArbContent::Text),
        "[a-z ]{0,5}".prop_map(ArbContent::Comment),
    ];
    leaf.prop_recursive(
        6,  // levels deep
        64, // maximum size of 64 nodes
        6,  // up to 6 items per collection
        |inner| {
            (
                prop::sample::select(NAMESPACES),
                prop::sample::select(ELEMENT_NAMES),
                arb_attributes(),
                prop::collection::vec(inner, 0..6),
            )
                .prop_map(|((prefix, _), name, attributes, children)| {
                    ArbContent::Element(ArbElement {
                        prefix,
                        name,
                        attributes,
                        children,
                    })
                })
        },
    )
}

/// Generate a random document element.
///
/// Names are drawn from a small set so that repeated siblings and
/// attribute/child name clashes are common.
pub fn arb_document() -> impl Strategy<Value = ArbElement> {
    (
        prop::sample::select(ELEMENT_NAMES),
        arb_attributes(),
        prop::collection::vec(arb_content(), 0..6),
    )
        .prop_map(|(name, attributes, children)| ArbElement {
            prefix: "",
            name,
            attributes,
            children,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_with_options, ParseOptions, Strategy as BuildStrategy};

    fn options(strategy: BuildStrategy, omit_namespaces: bool, parent_cache: bool) -> ParseOptions {
        ParseOptions {
            omit_namespaces,
            strategy,
            parent_cache,
        }
    }

    proptest! {
        #[test]
        fn test_streaming_equals_tree(element in arb_document(), omit in any::<bool>()) {
            let xml = element.to_xml();
            let tree = parse_with_options(&xml, &options(BuildStrategy::Tree, omit, true));
            let streaming = parse_with_options(&xml, &options(BuildStrategy::Streaming, omit, true));
            let uncached = parse_with_options(&xml, &options(BuildStrategy::Streaming, omit, false));
            prop_assert!(tree.is_ok(), "Cannot parse: {} {:?}", xml, tree);
            let tree = tree.unwrap();
            prop_assert_eq!(&tree, &streaming.unwrap(), "{}", xml);
            prop_assert_eq!(&tree, &uncached.unwrap(), "{}", xml);
        }
    }
}
