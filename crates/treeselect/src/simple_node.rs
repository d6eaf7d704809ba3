//! Simple in-memory tree implementing [`SelectNode`], used in tests, benches and prototypes.
//!
//! Focus:
//! - Ergonomic builder for quick test tree creation
//! - Identity semantics (`Arc::ptr_eq`) for `Eq`/`Hash`
//! - Thread-safe (`Arc` + `OnceLock`), so one tree can be queried from many threads
//!
//! Example:
//! ```
//! use treeselect::simple_node::{attr, doc, elem, text};
//! use treeselect::{SelectNode, select};
//!
//! // <html><body><p class="x">Hello</p><p>World</p></body></html>
//! let document = doc()
//!     .child(
//!         elem("html").child(
//!             elem("body")
//!                 .child(elem("p").attr(attr("class", "x")).child(text("Hello")))
//!                 .child(elem("p").child(text("World"))),
//!         ),
//!     )
//!     .build();
//!
//! let hits = select("p.x", &document).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].text(), "Hello");
//! ```
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use crate::model::{NodeKind, QName, SelectNode};

pub(crate) struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>, // text / comment / attribute content
    parent: OnceLock<Weak<Inner>>,
    attributes: OnceLock<Vec<SimpleNode>>,
    children: OnceLock<Vec<SimpleNode>>,
    cached_text: OnceLock<String>, // memoized string value for element/document
}

/// A simple Arc-backed node implementation.
#[derive(Clone)]
pub struct SimpleNode(pub(crate) Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}
impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value,
            parent: OnceLock::new(),
            attributes: OnceLock::new(),
            children: OnceLock::new(),
            cached_text: OnceLock::new(),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }
    /// Element builder; `name` may carry a namespace prefix (`svg:rect`).
    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(QName::parse(name)))
    }
    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Attribute, Some(QName::parse(name)), Some(value.to_string()))
    }
    pub fn text(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Text, None, Some(value.to_string()))
    }
    pub fn comment(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Comment, None, Some(value.to_string()))
    }

    /// Pre-order list of this node and all descendants (attributes excluded).
    pub fn descendants_or_self(&self) -> Vec<SimpleNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(n) = stack.pop() {
            stack.extend(n.children().into_iter().rev());
            out.push(n);
        }
        out
    }
}

pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self {
            node: SimpleNode::new(kind, name, None),
            pending_children: Vec::new(),
            pending_attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.pending_children.push(child.into().into_node());
        self
    }
    #[must_use]
    pub fn children<I: IntoIterator<Item = SimpleNodeOrBuilder>>(mut self, it: I) -> Self {
        self.pending_children.extend(it.into_iter().map(SimpleNodeOrBuilder::into_node));
        self
    }
    #[must_use]
    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.pending_attrs.push(attr);
        self
    }
    #[must_use]
    pub fn attrs<I: IntoIterator<Item = SimpleNode>>(mut self, attrs: I) -> Self {
        for a in attrs {
            self = self.attr(a);
        }
        self
    }
    /// Shorthand for the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr(attr("id", id))
    }
    /// Shorthand for the `class` attribute.
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        self.attr(attr("class", class))
    }

    /// Finalize relationships. Nodes are immutable afterwards.
    pub fn build(self) -> SimpleNode {
        let parent = Arc::downgrade(&self.node.0);
        for n in self.pending_attrs.iter().chain(&self.pending_children) {
            let attached = n.0.parent.set(parent.clone());
            debug_assert!(attached.is_ok(), "node attached to more than one parent");
        }
        let attrs = self.node.0.attributes.set(self.pending_attrs);
        let children = self.node.0.children.set(self.pending_children);
        debug_assert!(attrs.is_ok() && children.is_ok(), "node built twice");
        self.node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn into_node(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helper functions for concise test code
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl SelectNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }
    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }
    fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Text | NodeKind::Attribute | NodeKind::Comment => {
                self.0.value.clone().unwrap_or_default()
            }
            NodeKind::Element | NodeKind::Document => self
                .0
                .cached_text
                .get_or_init(|| {
                    self.descendants_or_self()
                        .iter()
                        .filter(|n| n.kind() == NodeKind::Text)
                        .filter_map(|n| n.0.value.as_deref())
                        .collect()
                })
                .clone(),
        }
    }
    fn parent(&self) -> Option<Self> {
        self.0.parent.get().and_then(Weak::upgrade).map(SimpleNode)
    }
    fn children(&self) -> Vec<Self> {
        self.0.children.get().cloned().unwrap_or_default()
    }
    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.get().cloned().unwrap_or_default()
    }
}
