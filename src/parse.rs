use std::path::Path;

use crate::encoding::decode;
use crate::error::Error;
use crate::event::EventSource;
use crate::stream::Reconstructor;
use crate::tokenizer::Tokenizer;
use crate::tree::Tree;
use crate::value::DocumentMap;
use crate::whole::build_document;

/// How the document map is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Rebuild the map from element events, keeping only open elements in
    /// memory.
    #[default]
    Streaming,
    /// Parse the whole document into a tree first, then build the map from
    /// it.
    Tree,
}

/// Options for parsing.
///
/// ```rust
/// use xmlmap::{parse_with_options, ParseOptions};
///
/// let xml = r#"<root xmlns:ns="http://x"><ns:child>v</ns:child></root>"#;
/// let options = ParseOptions {
///     omit_namespaces: true,
///     ..Default::default()
/// };
/// let doc = parse_with_options(xml, &options)?;
/// assert_eq!(doc.to_string(), r#"{"root": {"child": "v"}}"#);
/// # Ok::<(), xmlmap::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Drop namespace prefixes from element and attribute names.
    pub omit_namespaces: bool,
    /// How the map is built. Both strategies give the same result.
    pub strategy: Strategy,
    /// Let the streaming builder reuse the last resolved parent container.
    /// This has no effect on the result.
    pub parent_cache: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            omit_namespaces: false,
            strategy: Strategy::Streaming,
            parent_cache: true,
        }
    }
}

/// Parse XML text into a document map with default options.
///
/// ```rust
/// let doc = xmlmap::parse(r#"<root><item id="1">a</item><item id="2">b</item></root>"#)?;
/// assert_eq!(
///     doc.to_string(),
///     r#"{"root": {"item": [{"id": "1", "_value": "a"}, {"id": "2", "_value": "b"}]}}"#
/// );
/// # Ok::<(), xmlmap::Error>(())
/// ```
pub fn parse(xml: &str) -> Result<DocumentMap, Error> {
    parse_with_options(xml, &ParseOptions::default())
}

/// Parse XML text into a document map.
///
/// Empty or whitespace-only input is [`Error::EmptyInput`]. Malformed XML
/// is reported as an error and no partial map is returned.
pub fn parse_with_options(xml: &str, options: &ParseOptions) -> Result<DocumentMap, Error> {
    if xml.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    log::debug!(
        "parsing {} bytes ({:?}, omit_namespaces={})",
        xml.len(),
        options.strategy,
        options.omit_namespaces
    );
    match options.strategy {
        Strategy::Streaming => {
            let mut reconstructor =
                Reconstructor::new(options.omit_namespaces).with_parent_cache(options.parent_cache);
            Tokenizer::new(xml).drive(&mut reconstructor)?;
            let stats = reconstructor.stats();
            log::debug!(
                "reconstructed {} elements, at most {} open",
                stats.elements,
                stats.peak_frames
            );
            Ok(reconstructor.finish())
        }
        Strategy::Tree => {
            let tree = Tree::parse(xml)?;
            log::debug!("built tree of {} nodes", tree.len());
            Ok(build_document(&tree, options.omit_namespaces))
        }
    }
}

/// Parse raw XML bytes, detecting their encoding.
pub fn parse_bytes(data: &[u8], options: &ParseOptions) -> Result<DocumentMap, Error> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    parse_with_options(&decode(data)?, options)
}

/// Parse an XML file with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<DocumentMap, Error> {
    parse_file_with_options(path, &ParseOptions::default())
}

/// Parse an XML file.
///
/// A path that does not exist is [`Error::FileNotFound`].
pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<DocumentMap, Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    log::debug!("reading {}", path.display());
    let data = std::fs::read(path)?;
    parse_bytes(&data, options)
}
