use xmlparser::{ElementEnd, Token};

use crate::entity::parse_entities;
use crate::error::Error;
use crate::event::{ElementNode, EventHandler, EventSource};
use crate::name::QName;
use crate::scope::NamespaceScope;

/// Forward-only event source over XML text, backed by `xmlparser`.
///
/// Only the currently open elements are held in memory. Comments and
/// processing instructions are passed to the handler's hooks; DTD content
/// and the XML declaration are skipped.
///
/// ```rust
/// use xmlmap::{ElementNode, EventHandler, EventSource, Tokenizer};
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl EventHandler for Names {
///     fn start(&mut self, element: &ElementNode) {
///         self.0.push(element.name.local().to_string());
///     }
///     fn end(&mut self, _element: ElementNode) {}
/// }
///
/// let mut names = Names::default();
/// Tokenizer::new("<a><b/><c/></a>").drive(&mut names)?;
/// assert_eq!(names.0, ["a", "b", "c"]);
/// # Ok::<(), xmlmap::Error>(())
/// ```
pub struct Tokenizer<'a> {
    xml: &'a str,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `xml`.
    pub fn new(xml: &'a str) -> Self {
        Tokenizer { xml }
    }
}

// start tag seen, attributes still coming
struct PendingElement<'a> {
    prefix: &'a str,
    local: &'a str,
    attributes: Vec<(&'a str, &'a str, String)>,
    declarations: Vec<(String, String)>,
}

struct OpenElement {
    tag: String,
    node: ElementNode,
    child_seen: bool,
}

fn tag_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn resolve_name(
    scope: &NamespaceScope,
    prefix: &str,
    local: &str,
    is_element: bool,
) -> Result<QName, Error> {
    if prefix.is_empty() {
        // unprefixed attributes are never in a namespace
        if !is_element {
            return Ok(QName::new(local));
        }
        return Ok(match scope.resolve("") {
            Some(namespace) => QName::with_namespace(namespace, local),
            None => QName::new(local),
        });
    }
    scope
        .resolve(prefix)
        .map(|namespace| QName::with_namespace(namespace, local))
        .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))
}

fn open_element(pending: PendingElement, scope: &mut NamespaceScope) -> Result<OpenElement, Error> {
    scope.push(pending.declarations);
    let name = resolve_name(scope, pending.prefix, pending.local, true)?;
    let attributes = pending
        .attributes
        .into_iter()
        .map(|(prefix, local, value)| Ok((resolve_name(scope, prefix, local, false)?, value)))
        .collect::<Result<Vec<_>, Error>>()?;
    let node = ElementNode {
        name,
        prefix: (!pending.prefix.is_empty()).then(|| pending.prefix.to_string()),
        namespaces: scope.top(),
        attributes,
        text: String::new(),
    };
    Ok(OpenElement {
        tag: tag_name(pending.prefix, pending.local),
        node,
        child_seen: false,
    })
}

impl<'a> EventSource for Tokenizer<'a> {
    fn drive<H: EventHandler>(self, handler: &mut H) -> Result<(), Error> {
        let mut scope = NamespaceScope::new();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut pending: Option<PendingElement> = None;
        let mut root_seen = false;

        for token in xmlparser::Tokenizer::from(self.xml) {
            match token? {
                Token::ElementStart { prefix, local, .. } => {
                    match stack.last_mut() {
                        Some(parent) => parent.child_seen = true,
                        None if root_seen => {
                            return Err(Error::MultipleTopLevelElements(tag_name(
                                prefix.as_str(),
                                local.as_str(),
                            )));
                        }
                        None => root_seen = true,
                    }
                    pending = Some(PendingElement {
                        prefix: prefix.as_str(),
                        local: local.as_str(),
                        attributes: Vec::new(),
                        declarations: Vec::new(),
                    });
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    let Some(pending) = pending.as_mut() else {
                        continue;
                    };
                    let value = parse_entities(value.as_str())?.into_owned();
                    match (prefix.as_str(), local.as_str()) {
                        ("xmlns", declared) => pending.declarations.push((declared.to_string(), value)),
                        ("", "xmlns") => pending.declarations.push((String::new(), value)),
                        (prefix, local) => pending.attributes.push((prefix, local, value)),
                    }
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => {
                        let Some(started) = pending.take() else {
                            continue;
                        };
                        let element = open_element(started, &mut scope)?;
                        log::trace!("start <{}>", element.tag);
                        handler.start(&element.node);
                        stack.push(element);
                    }
                    ElementEnd::Empty => {
                        let Some(started) = pending.take() else {
                            continue;
                        };
                        let element = open_element(started, &mut scope)?;
                        log::trace!("start and end <{}/>", element.tag);
                        handler.start(&element.node);
                        scope.pop();
                        handler.end(element.node);
                    }
                    ElementEnd::Close(prefix, local) => {
                        let tag = tag_name(prefix.as_str(), local.as_str());
                        let element = stack
                            .pop()
                            .ok_or_else(|| Error::UnexpectedCloseTag(tag.clone()))?;
                        if element.tag != tag {
                            return Err(Error::InvalidCloseTag(element.tag, tag));
                        }
                        log::trace!("end </{}>", tag);
                        scope.pop();
                        handler.end(element.node);
                    }
                },
                Token::Text { text } => {
                    if let Some(open) = stack.last_mut() {
                        if !open.child_seen {
                            open.node.text.push_str(&parse_entities(text.as_str())?);
                        }
                    }
                }
                Token::Cdata { text, .. } => {
                    if let Some(open) = stack.last_mut() {
                        if !open.child_seen {
                            open.node.text.push_str(text.as_str());
                        }
                    }
                }
                Token::Comment { text, .. } => {
                    log::trace!("skipping comment");
                    if !stack.is_empty() {
                        handler.comment(text.as_str());
                    }
                }
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    log::trace!("skipping processing instruction {}", target.as_str());
                    if !stack.is_empty() {
                        handler.processing_instruction(
                            target.as_str(),
                            content.map(|content| content.as_str()),
                        );
                    }
                }
                Token::Declaration { .. } => {}
                _ => {
                    log::trace!("skipping DTD content");
                }
            }
        }

        if let Some(open) = stack.pop() {
            return Err(Error::UnclosedTag(open.tag));
        }
        if !root_seen {
            return Err(Error::NoElementAtTopLevel);
        }
        Ok(())
    }
}
