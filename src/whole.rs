use indextree::NodeId;

use crate::extract::{element_name, extract, local_entries, overlay, seed};
use crate::tree::Tree;
use crate::value::{insert_into_map, DocumentMap, NodeValue};

fn build_element(tree: &Tree, node: NodeId, omit_namespaces: bool) -> Option<NodeValue> {
    let element = tree.element(node)?;
    let local = extract(element, omit_namespaces);
    let mut children = tree
        .children(node)
        .filter(|child| tree.element(*child).is_some())
        .peekable();
    if children.peek().is_none() {
        return local;
    }
    let mut map = seed(local.as_ref());
    for child in children {
        if let Some(value) = build_element(tree, child, omit_namespaces) {
            // filtered above, always an element
            if let Some(element) = tree.element(child) {
                insert_into_map(&mut map, element_name(element, omit_namespaces), value);
            }
        }
    }
    if let Some(local) = local_entries(element, omit_namespaces) {
        overlay(&mut map, local);
    }
    Some(NodeValue::Map(map))
}

/// Build the document map from a fully materialized tree.
///
/// This visits the whole tree recursively; comments and processing
/// instructions are skipped. It produces exactly the same map as the
/// streaming [`Reconstructor`](crate::Reconstructor) does for the same
/// document.
pub fn build_document(tree: &Tree, omit_namespaces: bool) -> DocumentMap {
    let root = tree.document_element();
    let value = build_element(tree, root, omit_namespaces).unwrap_or_else(NodeValue::empty_map);
    let name = tree
        .element(root)
        .map(|element| element_name(element, omit_namespaces))
        .unwrap_or_default();
    DocumentMap::new(name, value)
}
