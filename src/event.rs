//! The element event contract between a tokenizer and the map builders.
//!
//! An [`EventSource`] delivers, in document order, a start and a matching
//! end event for every element to an [`EventHandler`]. The start event lends
//! the element; the end event hands it over, so the element's raw data is
//! dropped as soon as the handler is done with it.

use std::rc::Rc;

use crate::error::Error;
use crate::name::{Namespaces, QName};

/// One XML element as seen by the builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// Element name.
    pub name: QName,
    /// Prefix used in the tag, if any.
    pub prefix: Option<String>,
    /// Namespace bindings in scope at this element.
    pub namespaces: Rc<Namespaces>,
    /// Attributes declared on this element, in declaration order. Namespace
    /// declarations are not attributes.
    pub attributes: Vec<(QName, String)>,
    /// Text directly inside this element, before its first child element.
    /// Entities are resolved. This may still be empty at the start event.
    pub text: String,
}

impl ElementNode {
    /// An element without namespace information, attributes or text.
    pub fn new(name: QName) -> Self {
        ElementNode {
            name,
            prefix: None,
            namespaces: Rc::new(Namespaces::default()),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Set the direct text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the tag prefix and the bindings in scope.
    pub fn with_namespaces(mut self, prefix: Option<&str>, namespaces: Rc<Namespaces>) -> Self {
        self.prefix = prefix.map(str::to_string);
        self.namespaces = namespaces;
        self
    }
}

/// Receives element events.
pub trait EventHandler {
    /// An element was opened. Its text may not be known yet.
    fn start(&mut self, element: &ElementNode);

    /// An element was closed. Its text is complete.
    fn end(&mut self, element: ElementNode);

    /// A comment inside the document element. Ignored by default.
    fn comment(&mut self, _text: &str) {}

    /// A processing instruction inside the document element. Ignored by
    /// default.
    fn processing_instruction(&mut self, _target: &str, _data: Option<&str>) {}
}

/// Produces element events.
///
/// Any error is returned before the event it would have produced; a handler
/// that saw an error must be considered incomplete.
pub trait EventSource {
    /// Deliver all events to `handler`.
    fn drive<H: EventHandler>(self, handler: &mut H) -> Result<(), Error>;
}
