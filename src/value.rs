use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

/// Key under which an element's own text is stored when the element also
/// has attributes or child elements.
pub const VALUE_KEY: &str = "_value";

/// Ordered map from normalized names to values.
///
/// Keys keep their first insertion order. Note that equality of `NodeValue`
/// and [`DocumentMap`] takes this order into account, even though equality
/// on the bare map type does not.
pub type Map = IndexMap<String, NodeValue, ahash::RandomState>;

/// The contribution of one XML element to the document map.
///
/// ```rust
/// let doc = xmlmap::parse(r#"<doc><a>1</a><a>2</a><b id="x"/></doc>"#)?;
/// let root = doc.root().unwrap();
/// assert_eq!(root.get("a").unwrap().as_list().unwrap().len(), 2);
/// assert_eq!(root.get("b").unwrap().get("id").unwrap().as_str(), Some("x"));
/// # Ok::<(), xmlmap::Error>(())
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum NodeValue {
    /// Text of an element without attributes or child elements.
    Leaf(String),
    /// Attributes, child elements and possibly `_value`.
    Map(Map),
    /// Repeated sibling elements with the same name, in document order.
    List(Vec<NodeValue>),
}

impl NodeValue {
    /// Create an empty map value.
    pub fn empty_map() -> Self {
        NodeValue::Map(Map::default())
    }

    /// The text, if this is a leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeValue::Leaf(text) => Some(text),
            _ => None,
        }
    }

    /// The entries, if this is a map.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            NodeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[NodeValue]> {
        match self {
            NodeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key, if this is a map.
    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Insert a named child value.
    ///
    /// Into a map, a name seen for the first time is bound directly; a
    /// second occurrence turns the binding into a list and later
    /// occurrences are appended to it. Into a list the value is appended.
    /// A leaf is first promoted to a map holding its text under `_value`.
    pub fn insert_child(&mut self, name: impl Into<String>, value: NodeValue) {
        match self {
            NodeValue::List(items) => items.push(value),
            _ => insert_into_map(self.container_mut(), name.into(), value),
        }
    }

    /// The map that children of this value are inserted into.
    ///
    /// For a list this is the map of its last item, since only the most
    /// recent occurrence of a name can still receive children.
    pub(crate) fn container_mut(&mut self) -> &mut Map {
        match self {
            NodeValue::Map(map) => map,
            NodeValue::List(items) => {
                if items.is_empty() {
                    items.push(NodeValue::empty_map());
                }
                let last = items.len() - 1;
                items[last].container_mut()
            }
            NodeValue::Leaf(text) => {
                let mut map = Map::default();
                map.insert(VALUE_KEY.to_string(), NodeValue::Leaf(std::mem::take(text)));
                *self = NodeValue::Map(map);
                self.container_mut()
            }
        }
    }

    // move the direct children into `pending`, leaving this value shallow
    fn drain_children(&mut self, pending: &mut Vec<NodeValue>) {
        match self {
            NodeValue::Map(map) => pending.extend(map.drain(..).map(|(_, value)| value)),
            NodeValue::List(items) => pending.append(items),
            NodeValue::Leaf(_) => {}
        }
    }

    /// Number of values in this subtree, counting this one.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            count += 1;
            match value {
                NodeValue::Leaf(_) => {}
                NodeValue::Map(map) => pending.extend(map.values()),
                NodeValue::List(items) => pending.extend(items.iter()),
            }
        }
        count
    }
}

/// Insert `value` under `name`, folding repeated names into a list.
pub(crate) fn insert_into_map(map: &mut Map, name: String, value: NodeValue) {
    match map.get_mut(&name) {
        None => {
            map.insert(name, value);
        }
        Some(NodeValue::List(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, NodeValue::List(Vec::with_capacity(2)));
            if let NodeValue::List(items) = existing {
                items.push(first);
                items.push(value);
            }
        }
    }
}

fn maps_equal(a: &Map, b: &Map) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
}

impl PartialEq for NodeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeValue::Leaf(a), NodeValue::Leaf(b)) => a == b,
            (NodeValue::Map(a), NodeValue::Map(b)) => maps_equal(a, b),
            (NodeValue::List(a), NodeValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NodeValue {}

// Nesting depth is only bounded by the input, so dropping must not recurse.
impl Drop for NodeValue {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_children(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.drain_children(&mut pending);
        }
    }
}

impl From<&str> for NodeValue {
    fn from(text: &str) -> Self {
        NodeValue::Leaf(text.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(text: String) -> Self {
        NodeValue::Leaf(text)
    }
}

impl From<Map> for NodeValue {
    fn from(map: Map) -> Self {
        NodeValue::Map(map)
    }
}

impl From<Vec<NodeValue>> for NodeValue {
    fn from(items: Vec<NodeValue>) -> Self {
        NodeValue::List(items)
    }
}

/// The result of converting one XML document.
///
/// It holds a single entry: the normalized name of the document element,
/// bound to that element's value.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct DocumentMap {
    map: Map,
}

impl DocumentMap {
    pub(crate) fn new(name: String, value: NodeValue) -> Self {
        let mut map = Map::default();
        map.insert(name, value);
        DocumentMap { map }
    }

    pub(crate) fn from_map(map: Map) -> Self {
        DocumentMap { map }
    }

    /// Name of the document element.
    pub fn root_name(&self) -> Option<&str> {
        self.map.keys().next().map(String::as_str)
    }

    /// Value of the document element.
    pub fn root(&self) -> Option<&NodeValue> {
        self.map.values().next()
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.map.get(key)
    }

    /// Number of top-level entries. This is one for any parsed document.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The underlying map.
    pub fn as_map(&self) -> &Map {
        &self.map
    }

    /// Take the underlying map.
    pub fn into_map(self) -> Map {
        self.map
    }

    /// Number of values in the document, counting the document element.
    pub fn size(&self) -> usize {
        self.map.values().map(NodeValue::size).sum()
    }
}

impl PartialEq for DocumentMap {
    fn eq(&self, other: &Self) -> bool {
        maps_equal(&self.map, &other.map)
    }
}

impl Eq for DocumentMap {}

fn write_str(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_map(f: &mut Formatter<'_>, map: &Map) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_str(f, key)?;
        write!(f, ": {}", value)?;
    }
    f.write_str("}")
}

/// Compact JSON-like rendering.
impl Display for NodeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Leaf(text) => write_str(f, text),
            NodeValue::Map(map) => write_map(f, map),
            NodeValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Display for DocumentMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_map(f, &self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, NodeValue)]) -> NodeValue {
        let mut map = Map::default();
        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }
        NodeValue::Map(map)
    }

    fn list(items: Vec<NodeValue>) -> NodeValue {
        NodeValue::List(items)
    }

    #[test]
    fn test_insert_new_key() {
        let mut value = NodeValue::empty_map();
        value.insert_child("a", "1".into());
        assert_eq!(value, map(&[("a", "1".into())]));
    }

    #[test]
    fn test_insert_repeated_key_makes_list() {
        let mut value = NodeValue::empty_map();
        value.insert_child("a", "1".into());
        value.insert_child("a", "2".into());
        value.insert_child("a", "3".into());
        assert_eq!(
            value,
            map(&[("a", list(vec!["1".into(), "2".into(), "3".into()]))])
        );
    }

    #[test]
    fn test_insert_into_list_appends() {
        let mut value = NodeValue::List(vec!["1".into()]);
        value.insert_child("ignored", "2".into());
        assert_eq!(value, NodeValue::List(vec!["1".into(), "2".into()]));
    }

    #[test]
    fn test_insert_into_leaf_promotes() {
        let mut value = NodeValue::from("text");
        value.insert_child("a", "1".into());
        assert_eq!(value, map(&[("_value", "text".into()), ("a", "1".into())]));
    }

    #[test]
    fn test_container_of_list_is_last_item() {
        let mut value = NodeValue::List(vec![map(&[("x", "1".into())]), NodeValue::empty_map()]);
        value.container_mut().insert("y".to_string(), "2".into());
        assert_eq!(
            value,
            NodeValue::List(vec![map(&[("x", "1".into())]), map(&[("y", "2".into())])])
        );
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = map(&[("x", "1".into()), ("y", "2".into())]);
        let b = map(&[("y", "2".into()), ("x", "1".into())]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let value = map(&[
            ("a", "say \"hi\"".into()),
            ("b", list(vec!["1".into(), NodeValue::empty_map()])),
        ]);
        assert_eq!(value.to_string(), r#"{"a": "say \"hi\"", "b": ["1", {}]}"#);
    }

    #[test]
    fn test_size() {
        let value = map(&[("a", "1".into()), ("b", list(vec!["1".into(), "2".into()]))]);
        assert_eq!(value.size(), 5);
    }

    #[test]
    fn test_drop_deeply_nested() {
        let mut value = NodeValue::from("leaf");
        for i in 0..200_000 {
            value = if i % 2 == 0 {
                let mut map = Map::default();
                map.insert("n".to_string(), value);
                NodeValue::Map(map)
            } else {
                list(vec!["x".into(), value])
            };
        }
        assert_eq!(value.size(), 300_001);
        drop(value);
    }
}
