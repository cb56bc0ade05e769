//! Streaming reconstruction of the document map from element events.
//!
//! Elements are not collected into a tree. Instead every element is
//! inserted into the map as early as possible: a parent is inserted
//! ("materialized") into its own parent when its first child opens, so
//! that children have a container to go into; an element without children
//! is inserted when it closes. The set of materialized identities makes
//! sure each element is inserted exactly once.
//!
//! Memory use is bounded by the nesting depth plus the map being built:
//! only the open elements keep a frame, and the raw element data handed
//! over by the end event is dropped as soon as it is extracted.

use ahash::HashSet;

use crate::event::{ElementNode, EventHandler};
use crate::extract::{element_name, extract, local_entries, merge, overlay, seed};
use crate::value::{insert_into_map, DocumentMap, Map, NodeValue};

/// An element that is currently open.
#[derive(Debug)]
struct ElementFrame {
    name: String,
    data: Option<NodeValue>,
    identity: usize,
}

/// Where the container of the deepest walked level was found last time.
///
/// `path` holds, per level, the index of the level's entry in its parent
/// map. Entries are never removed from a map and an open element is always
/// the last item of a list, so a path stays valid as long as its level is
/// open. It is only reused for the same level identity.
#[derive(Debug, Default)]
struct ParentCache {
    identity: Option<usize>,
    path: Vec<usize>,
    walks: usize,
}

impl ParentCache {
    fn is_live(&self, root: &Map) -> bool {
        let mut map = root;
        for &index in &self.path {
            match map.get_index(index).and_then(|(_, value)| container(value)) {
                Some(next) => map = next,
                None => return false,
            }
        }
        true
    }
}

fn container(value: &NodeValue) -> Option<&Map> {
    match value {
        NodeValue::Map(map) => Some(map),
        NodeValue::List(items) => items.last().and_then(container),
        NodeValue::Leaf(_) => None,
    }
}

fn descend_path<'m>(mut map: &'m mut Map, path: &[usize]) -> &'m mut Map {
    for &index in path {
        if index >= map.len() {
            break;
        }
        map = map[index].container_mut();
    }
    map
}

/// Find the container that children of the deepest of `levels` go into.
///
/// With no levels that is the root container. Levels missing from the map
/// are created as empty maps on the way down.
fn find_parent<'m>(
    root: &'m mut Map,
    levels: &[ElementFrame],
    cache: &mut ParentCache,
    use_cache: bool,
) -> &'m mut Map {
    let identity = levels.last().map(|level| level.identity);
    if use_cache && identity.is_some() && cache.identity == identity && cache.is_live(root) {
        return descend_path(root, &cache.path);
    }
    cache.walks += 1;
    let mut path = Vec::with_capacity(levels.len());
    let mut map = root;
    for level in levels {
        let index = match map.get_index_of(level.name.as_str()) {
            Some(index) => index,
            None => map.insert_full(level.name.clone(), NodeValue::empty_map()).0,
        };
        path.push(index);
        map = map[index].container_mut();
    }
    cache.identity = identity;
    cache.path = path;
    map
}

/// Counters describing how much construction state was alive at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of elements seen.
    pub elements: usize,
    /// Largest number of open element frames at any time.
    pub peak_frames: usize,
    /// Largest number of materialized elements still open at any time.
    pub peak_materialized: usize,
    /// Number of parent lookups that walked down from the document root
    /// instead of reusing the cached path.
    pub parent_walks: usize,
}

/// Builds a [`DocumentMap`] from element events without materializing a
/// document tree.
///
/// ```rust
/// use xmlmap::{EventSource, Reconstructor, Tokenizer};
///
/// let mut reconstructor = Reconstructor::new(false);
/// Tokenizer::new("<a><b>1</b><b>2</b></a>").drive(&mut reconstructor)?;
/// assert_eq!(reconstructor.stats().peak_frames, 2);
/// let doc = reconstructor.finish();
/// assert_eq!(doc.to_string(), r#"{"a": {"b": ["1", "2"]}}"#);
/// # Ok::<(), xmlmap::Error>(())
/// ```
#[derive(Debug)]
pub struct Reconstructor {
    omit_namespaces: bool,
    use_cache: bool,
    levels: Vec<ElementFrame>,
    created: HashSet<usize>,
    next_identity: usize,
    cache: ParentCache,
    root: Map,
    stats: Stats,
}

impl Reconstructor {
    /// Create a reconstructor.
    pub fn new(omit_namespaces: bool) -> Self {
        Reconstructor {
            omit_namespaces,
            use_cache: true,
            levels: Vec::new(),
            created: HashSet::default(),
            next_identity: 0,
            cache: ParentCache::default(),
            root: Map::default(),
            stats: Stats::default(),
        }
    }

    /// Enable or disable the parent cache. Without it, every insertion
    /// walks down from the root. The result is the same either way.
    pub fn with_parent_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Construction counters so far.
    pub fn stats(&self) -> Stats {
        Stats {
            parent_walks: self.cache.walks,
            ..self.stats
        }
    }

    /// The document map built from the events seen.
    pub fn finish(self) -> DocumentMap {
        if !self.levels.is_empty() {
            log::warn!("finishing with {} open elements", self.levels.len());
        }
        DocumentMap::from_map(self.root)
    }

    // make sure the top frame exists as a container in its parent
    fn materialize_top(&mut self) {
        let depth = self.levels.len();
        let Some(top) = self.levels.last() else {
            return;
        };
        if !self.created.insert(top.identity) {
            return;
        }
        let identity = top.identity;
        let name = top.name.clone();
        let value = NodeValue::Map(seed(top.data.as_ref()));
        log::trace!("materializing {} (#{})", name, identity);
        let parent = find_parent(
            &mut self.root,
            &self.levels[..depth - 1],
            &mut self.cache,
            self.use_cache,
        );
        let index = match parent.get_index_of(name.as_str()) {
            Some(index) => index,
            None => parent.len(),
        };
        insert_into_map(parent, name, value);
        // the new element's first child goes into the map just inserted
        self.cache.identity = Some(identity);
        self.cache.path.push(index);
        self.stats.peak_materialized = self.stats.peak_materialized.max(self.created.len());
    }
}

impl EventHandler for Reconstructor {
    fn start(&mut self, element: &ElementNode) {
        self.materialize_top();
        let frame = ElementFrame {
            name: element_name(element, self.omit_namespaces),
            data: extract(element, self.omit_namespaces),
            identity: self.next_identity,
        };
        self.next_identity += 1;
        self.levels.push(frame);
        self.stats.elements += 1;
        self.stats.peak_frames = self.stats.peak_frames.max(self.levels.len());
    }

    fn end(&mut self, element: ElementNode) {
        let Some(frame) = self.levels.pop() else {
            log::warn!("close event without open element");
            return;
        };
        let materialized = self.created.remove(&frame.identity);
        let fresh = if materialized {
            local_entries(&element, self.omit_namespaces)
        } else {
            extract(&element, self.omit_namespaces)
        };
        drop(element);
        let data = merge(frame.data, fresh);
        if self.cache.identity == Some(frame.identity) {
            // the parent's container is one step up the cached path
            self.cache.path.pop();
            self.cache.identity = self.levels.last().map(|level| level.identity);
        }
        let parent = find_parent(
            &mut self.root,
            &self.levels,
            &mut self.cache,
            self.use_cache,
        );
        if materialized {
            // inserted when its first child opened; children are in place
            if let Some(local) = data {
                if let Some(slot) = parent.get_mut(frame.name.as_str()) {
                    overlay(slot.container_mut(), local);
                }
            }
            return;
        }
        let data = if self.levels.is_empty() {
            // the document element is always present
            Some(data.unwrap_or_else(NodeValue::empty_map))
        } else {
            data
        };
        if let Some(value) = data {
            log::trace!("inserting {} (#{})", frame.name, frame.identity);
            insert_into_map(parent, frame.name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use crate::tokenizer::Tokenizer;

    fn reconstruct(xml: &str, use_cache: bool) -> (String, Stats) {
        let mut reconstructor = Reconstructor::new(false).with_parent_cache(use_cache);
        Tokenizer::new(xml).drive(&mut reconstructor).unwrap();
        let stats = reconstructor.stats();
        (reconstructor.finish().to_string(), stats)
    }

    #[test]
    fn test_leaf_inserted_on_close() {
        let (doc, stats) = reconstruct("<a><b>1</b></a>", true);
        assert_eq!(doc, r#"{"a": {"b": "1"}}"#);
        assert_eq!(stats.elements, 2);
        assert_eq!(stats.peak_materialized, 1);
    }

    #[test]
    fn test_parent_materialized_once() {
        let (doc, _) = reconstruct("<a><b><c>1</c><c>2</c><d/></b><b>x</b></a>", true);
        assert_eq!(doc, r#"{"a": {"b": [{"c": ["1", "2"]}, "x"]}}"#);
    }

    #[test]
    fn test_text_before_children_becomes_value() {
        let (doc, _) = reconstruct(r#"<a id="1">t<b>1</b></a>"#, true);
        assert_eq!(doc, r#"{"a": {"id": "1", "b": "1", "_value": "t"}}"#);
    }

    #[test]
    fn test_text_after_children_ignored() {
        let (doc, _) = reconstruct("<a><b/>t</a>", true);
        assert_eq!(doc, r#"{"a": {}}"#);
        let (doc, _) = reconstruct("<a><b>1</b>t</a>", true);
        assert_eq!(doc, r#"{"a": {"b": "1"}}"#);
    }

    #[test]
    fn test_value_text_kept_as_written() {
        let (doc, _) = reconstruct("<a> t <b>1</b></a>", true);
        assert_eq!(doc, r#"{"a": {"b": "1", "_value": " t "}}"#);
    }

    #[test]
    fn test_cache_follows_nesting() {
        // each open hits the path stored when its parent was materialized,
        // each close steps the path back up by one level
        let xml = "<a><b><c><d>1</d><d>2</d></c><c>3</c></b><e><f>4</f></e></a>";
        let (doc, stats) = reconstruct(xml, true);
        assert_eq!(
            doc,
            r#"{"a": {"b": {"c": [{"d": ["1", "2"]}, "3"]}, "e": {"f": "4"}}}"#
        );
        // only the two lookups of the top-level map itself
        assert_eq!(stats.parent_walks, 2);
        let (uncached, stats) = reconstruct(xml, false);
        assert_eq!(uncached, doc);
        assert_eq!(stats.parent_walks, 12);
    }

    #[test]
    fn test_attribute_wins_over_child() {
        let (doc, _) = reconstruct(r#"<a id="1"><id>2</id></a>"#, true);
        assert_eq!(doc, r#"{"a": {"id": "1"}}"#);
    }

    #[test]
    fn test_empty_document_element() {
        let (doc, _) = reconstruct("<a/>", true);
        assert_eq!(doc, r#"{"a": {}}"#);
        let (doc, _) = reconstruct("<a>x</a>", true);
        assert_eq!(doc, r#"{"a": "x"}"#);
    }

    #[test]
    fn test_cache_does_not_change_result() {
        let xml = "<r><a><b>1</b><b>2</b></a><a><b><c/><c>3</c></b></a><d>4</d></r>";
        assert_eq!(reconstruct(xml, true).0, reconstruct(xml, false).0);
    }

    #[test]
    fn test_cache_path_survives_list_conversion() {
        // the second <a> turns "a" into a list while the cache still points
        // into the first one; the identity check must force a new walk
        let xml = "<r><a><b>1</b><b>2</b></a><a><b>3</b><b>4</b></a></r>";
        let (doc, _) = reconstruct(xml, true);
        assert_eq!(doc, r#"{"r": {"a": [{"b": ["1", "2"]}, {"b": ["3", "4"]}]}}"#);
    }

    #[test]
    fn test_frames_bounded_by_depth() {
        let depth = 50;
        let xml = format!("{}x{}", "<e>".repeat(depth), "</e>".repeat(depth));
        let (_, stats) = reconstruct(&xml, true);
        assert_eq!(stats.peak_frames, depth);
        assert_eq!(stats.peak_materialized, depth - 1);
    }

    #[test]
    fn test_frames_independent_of_width() {
        let xml = format!("<r>{}</r>", "<e>x</e>".repeat(1000));
        let (_, stats) = reconstruct(&xml, true);
        assert_eq!(stats.elements, 1001);
        assert_eq!(stats.peak_frames, 2);
        assert_eq!(stats.peak_materialized, 1);
    }
}
