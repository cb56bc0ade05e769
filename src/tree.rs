use indextree::{Arena, NodeEdge, NodeId};

use crate::error::Error;
use crate::event::{ElementNode, EventHandler, EventSource};
use crate::tokenizer::Tokenizer;

/// A node in a fully materialized document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// An element.
    Element(ElementNode),
    /// A comment.
    Comment(String),
    /// A processing instruction.
    ProcessingInstruction {
        /// Target.
        target: String,
        /// Data, if any.
        data: Option<String>,
    },
}

/// A whole document held in memory.
///
/// This is the input of [`build_document`](crate::build_document). It can
/// also replay its elements as events, which makes it an [`EventSource`]
/// for any [`EventHandler`].
#[derive(Debug)]
pub struct Tree {
    arena: Arena<TreeNode>,
    document_element: NodeId,
}

impl Tree {
    /// Parse a document into a tree.
    pub fn parse(xml: &str) -> Result<Tree, Error> {
        let mut builder = TreeBuilder::default();
        Tokenizer::new(xml).drive(&mut builder)?;
        builder.finish().ok_or(Error::NoElementAtTopLevel)
    }

    /// The node id of the document element.
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    /// The data of a node.
    pub fn node(&self, node: NodeId) -> &TreeNode {
        self.arena[node].get()
    }

    /// The element data of a node, if it is an element.
    pub fn element(&self, node: NodeId) -> Option<&ElementNode> {
        match self.node(node) {
            TreeNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Children of a node, in document order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    /// Number of nodes in the tree, elements, comments and processing
    /// instructions alike.
    pub fn len(&self) -> usize {
        self.arena.count()
    }

    /// A tree always contains at least its document element.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Builds a [`Tree`] from element events.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Arena<TreeNode>,
    stack: Vec<NodeId>,
    document_element: Option<NodeId>,
}

impl TreeBuilder {
    fn add(&mut self, node: TreeNode) -> NodeId {
        let id = self.arena.new_node(node);
        if let Some(parent) = self.stack.last() {
            parent.append(id, &mut self.arena);
        }
        id
    }

    /// The finished tree, or `None` if no element was seen.
    pub fn finish(self) -> Option<Tree> {
        Some(Tree {
            arena: self.arena,
            document_element: self.document_element?,
        })
    }
}

impl EventHandler for TreeBuilder {
    fn start(&mut self, element: &ElementNode) {
        let id = self.add(TreeNode::Element(element.clone()));
        if self.stack.is_empty() && self.document_element.is_none() {
            self.document_element = Some(id);
        }
        self.stack.push(id);
    }

    fn end(&mut self, element: ElementNode) {
        // the closed element carries its complete text
        if let Some(id) = self.stack.pop() {
            *self.arena[id].get_mut() = TreeNode::Element(element);
        }
    }

    fn comment(&mut self, text: &str) {
        if !self.stack.is_empty() {
            self.add(TreeNode::Comment(text.to_string()));
        }
    }

    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {
        if !self.stack.is_empty() {
            self.add(TreeNode::ProcessingInstruction {
                target: target.to_string(),
                data: data.map(str::to_string),
            });
        }
    }
}

impl<'a> EventSource for &'a Tree {
    fn drive<H: EventHandler>(self, handler: &mut H) -> Result<(), Error> {
        for edge in self.document_element.traverse(&self.arena) {
            match edge {
                NodeEdge::Start(id) => match self.node(id) {
                    TreeNode::Element(element) => handler.start(element),
                    TreeNode::Comment(text) => handler.comment(text),
                    TreeNode::ProcessingInstruction { target, data } => {
                        handler.processing_instruction(target, data.as_deref())
                    }
                },
                NodeEdge::End(id) => {
                    if let TreeNode::Element(element) = self.node(id) {
                        handler.end(element.clone());
                    }
                }
            }
        }
        Ok(())
    }
}
