//! Convert XML documents into ordered key-value maps.
//!
//! Every element becomes an entry keyed by its name. An element with only
//! text becomes that text; attributes become entries of the element's map,
//! with the element's own text next to them under `_value`; repeated
//! sibling elements with the same name become a list.
//!
//! ```rust
//! let doc = xmlmap::parse(r#"<book id="7"><title>Dune</title><tag>sf</tag><tag>classic</tag></book>"#)?;
//! assert_eq!(
//!     doc.to_string(),
//!     r#"{"book": {"id": "7", "title": "Dune", "tag": ["sf", "classic"]}}"#
//! );
//! # Ok::<(), xmlmap::Error>(())
//! ```
//!
//! By default the map is rebuilt directly from the events of a forward-only
//! tokenizer by the [`Reconstructor`], which only keeps the currently open
//! elements around. [`Strategy::Tree`] parses into a [`Tree`] first and
//! builds the same map from that.
#![forbid(unsafe_code)]

mod encoding;
mod entity;
mod error;
mod event;
mod extract;
mod name;
mod parse;
mod scope;
mod stream;
mod tokenizer;
mod tree;
mod value;
mod whole;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

pub use error::Error;
pub use event::{ElementNode, EventHandler, EventSource};
pub use extract::extract;
pub use name::{normalize, Namespaces, QName};
pub use parse::{
    parse, parse_bytes, parse_file, parse_file_with_options, parse_with_options, ParseOptions,
    Strategy,
};
pub use stream::{Reconstructor, Stats};
pub use tokenizer::Tokenizer;
pub use tree::{Tree, TreeBuilder, TreeNode};
pub use value::{DocumentMap, Map, NodeValue, VALUE_KEY};
pub use whole::build_document;
