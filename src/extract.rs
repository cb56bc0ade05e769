use crate::event::ElementNode;
use crate::name::normalize;
use crate::value::{Map, NodeValue, VALUE_KEY};

/// The key under which an element appears in its parent.
pub(crate) fn element_name(element: &ElementNode, omit_namespaces: bool) -> String {
    normalize(
        &element.name,
        element.prefix.as_deref(),
        &element.namespaces,
        omit_namespaces,
    )
}

fn attributes(element: &ElementNode, omit_namespaces: bool) -> Map {
    let mut map = Map::default();
    for (name, value) in &element.attributes {
        let name = normalize(name, None, &element.namespaces, omit_namespaces);
        map.insert(name, NodeValue::Leaf(value.clone()));
    }
    map
}

/// The local data of an element: its attributes and direct text.
///
/// Returns `None` when the element has neither attributes nor
/// non-whitespace text. Text alone yields a leaf, trimmed. Text next to
/// attributes is stored as written under `_value`.
pub fn extract(element: &ElementNode, omit_namespaces: bool) -> Option<NodeValue> {
    let text = element.text.trim();
    if element.attributes.is_empty() && !text.is_empty() {
        return Some(NodeValue::Leaf(text.to_string()));
    }
    local_entries(element, omit_namespaces)
}

/// The local entries of an element that also has child elements: its
/// attributes, and its direct text as written under `_value`.
pub(crate) fn local_entries(element: &ElementNode, omit_namespaces: bool) -> Option<NodeValue> {
    let mut map = attributes(element, omit_namespaces);
    if !element.text.trim().is_empty() {
        map.insert(VALUE_KEY.to_string(), NodeValue::Leaf(element.text.clone()));
    }
    (!map.is_empty()).then_some(NodeValue::Map(map))
}

/// Fold local data extracted later into data recorded earlier.
///
/// Map entries are updated in place, a leaf becomes `_value` of a recorded
/// map, and anything else is replaced.
pub(crate) fn merge(recorded: Option<NodeValue>, fresh: Option<NodeValue>) -> Option<NodeValue> {
    let Some(mut fresh) = fresh else {
        return recorded;
    };
    let Some(mut recorded) = recorded else {
        return Some(fresh);
    };
    let NodeValue::Map(map) = &mut recorded else {
        return Some(fresh);
    };
    match &mut fresh {
        NodeValue::Map(entries) => map.extend(entries.drain(..)),
        NodeValue::Leaf(text) => {
            map.insert(VALUE_KEY.to_string(), NodeValue::Leaf(std::mem::take(text)));
        }
        NodeValue::List(_) => return Some(fresh),
    }
    Some(recorded)
}

/// The map an element with child elements starts from: its attributes,
/// without `_value`.
pub(crate) fn seed(local: Option<&NodeValue>) -> Map {
    match local {
        Some(NodeValue::Map(map)) => map
            .iter()
            .filter(|(key, _)| key.as_str() != VALUE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        _ => Map::default(),
    }
}

/// Write local data over an element's map after its children were folded
/// in. Local keys win over child keys of the same name.
pub(crate) fn overlay(container: &mut Map, mut local: NodeValue) {
    match &mut local {
        NodeValue::Map(map) => container.extend(map.drain(..)),
        NodeValue::Leaf(text) => {
            container.insert(VALUE_KEY.to_string(), NodeValue::Leaf(std::mem::take(text)));
        }
        NodeValue::List(_) => {
            log::warn!("ignoring list as local element data");
        }
    }
}
