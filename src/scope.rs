use std::rc::Rc;

use crate::name::Namespaces;

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Stack of namespace bindings, one entry per open element.
///
/// Elements that declare nothing share their parent's bindings, so the
/// stack only allocates where declarations occur.
pub(crate) struct NamespaceScope {
    stack: Vec<Rc<Namespaces>>,
}

impl NamespaceScope {
    pub(crate) fn new() -> Self {
        let mut namespaces = Namespaces::default();
        namespaces.insert("xml".to_string(), XML_NAMESPACE.to_string());
        NamespaceScope {
            stack: vec![Rc::new(namespaces)],
        }
    }

    pub(crate) fn push(&mut self, declarations: Vec<(String, String)>) {
        let top = self.top();
        if declarations.is_empty() {
            self.stack.push(top);
            return;
        }
        let mut entry = (*top).clone();
        // redeclaring a prefix keeps its position; the binding is replaced
        entry.extend(declarations);
        self.stack.push(Rc::new(entry));
    }

    pub(crate) fn pop(&mut self) {
        // the base entry with the xml prefix always stays
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    #[inline]
    pub(crate) fn top(&self) -> Rc<Namespaces> {
        Rc::clone(&self.stack[self.stack.len() - 1])
    }

    /// Namespace URI bound to a prefix. An empty URI (from `xmlns=""`)
    /// means no namespace.
    pub(crate) fn resolve(&self, prefix: &str) -> Option<&str> {
        self.stack[self.stack.len() - 1]
            .get(prefix)
            .map(String::as_str)
    }
}
