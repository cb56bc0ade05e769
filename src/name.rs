use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

/// Prefix to namespace URI bindings in scope at an element.
///
/// The empty prefix stands for the default namespace. Bindings keep
/// declaration order, outer declarations first, which makes reverse lookup
/// of a prefix by namespace deterministic.
pub type Namespaces = IndexMap<String, String, ahash::RandomState>;

/// An element or attribute name: a local name in an optional namespace.
///
/// Names can be written in Clark notation, `{namespace}local`:
///
/// ```rust
/// use xmlmap::QName;
///
/// let name = QName::from_clark("{http://example.com}item");
/// assert_eq!(name.namespace(), Some("http://example.com"));
/// assert_eq!(name.local(), "item");
/// assert_eq!(name.to_string(), "{http://example.com}item");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    /// A name without a namespace.
    pub fn new(local: impl Into<String>) -> Self {
        QName {
            namespace: None,
            local: local.into(),
        }
    }

    /// A name in a namespace. An empty namespace URI means no namespace.
    pub fn with_namespace(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        let namespace = namespace.into();
        QName {
            namespace: (!namespace.is_empty()).then_some(namespace),
            local: local.into(),
        }
    }

    /// Parse Clark notation. Anything without a leading `{...}` is a plain
    /// local name.
    pub fn from_clark(name: &str) -> Self {
        if let Some(rest) = name.strip_prefix('{') {
            if let Some((namespace, local)) = rest.split_once('}') {
                return QName::with_namespace(namespace, local);
            }
        }
        QName::new(name)
    }

    /// The namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The local name.
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{}}}{}", namespace, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Turn a name into the string used as a key in the document map.
///
/// Names without a namespace come out unchanged. With `omit_namespaces`
/// only the local name is kept. Otherwise the name is written as
/// `prefix:local`, where the prefix is `prefix` if given, or else the first
/// prefix in `namespaces` bound to the name's namespace. If no non-empty
/// prefix is found, the bare local name is used.
pub fn normalize(
    name: &QName,
    prefix: Option<&str>,
    namespaces: &Namespaces,
    omit_namespaces: bool,
) -> String {
    let Some(namespace) = name.namespace() else {
        return name.local.clone();
    };
    if omit_namespaces {
        return name.local.clone();
    }
    let prefix = prefix.filter(|p| !p.is_empty()).or_else(|| {
        namespaces
            .iter()
            .find(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    });
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, name.local),
        _ => name.local.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces(bindings: &[(&str, &str)]) -> Namespaces {
        bindings
            .iter()
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect()
    }

    #[test]
    fn test_no_namespace_unchanged() {
        let name = QName::new("item");
        assert_eq!(normalize(&name, None, &Namespaces::default(), false), "item");
        assert_eq!(normalize(&name, None, &Namespaces::default(), true), "item");
    }

    #[test]
    fn test_explicit_prefix() {
        let name = QName::with_namespace("http://x", "tag");
        let ns = namespaces(&[("ns", "http://x")]);
        assert_eq!(normalize(&name, Some("other"), &ns, false), "other:tag");
    }

    #[test]
    fn test_reverse_lookup_first_match() {
        let name = QName::with_namespace("http://x", "tag");
        let ns = namespaces(&[("a", "http://y"), ("b", "http://x"), ("c", "http://x")]);
        assert_eq!(normalize(&name, None, &ns, false), "b:tag");
    }

    #[test]
    fn test_omit_namespaces() {
        let name = QName::with_namespace("http://x", "tag");
        let ns = namespaces(&[("ns", "http://x")]);
        assert_eq!(normalize(&name, Some("ns"), &ns, true), "tag");
    }

    #[test]
    fn test_default_namespace_is_bare() {
        let name = QName::with_namespace("http://x", "tag");
        let ns = namespaces(&[("", "http://x")]);
        assert_eq!(normalize(&name, None, &ns, false), "tag");
    }

    #[test]
    fn test_unknown_namespace_is_bare() {
        let name = QName::with_namespace("http://x", "tag");
        assert_eq!(normalize(&name, None, &Namespaces::default(), false), "tag");
    }

    #[test]
    fn test_clark() {
        assert_eq!(QName::from_clark("{u}tag"), QName::with_namespace("u", "tag"));
        assert_eq!(QName::from_clark("tag"), QName::new("tag"));
        assert_eq!(QName::from_clark("{}tag"), QName::new("tag"));
        assert_eq!(QName::from_clark("{broken"), QName::new("{broken"));
    }
}
