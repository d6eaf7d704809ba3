//! Read-only tree capability consumed by the selector engine.
//!
//! The engine never owns tree storage. Adapters implement [`SelectNode`] for a cheap,
//! clonable handle (an `Arc`, an arena index, ...) whose `Eq`/`Hash` reflect node
//! identity, not structural equality.
//!
//! Callers must not mutate the tree while a `select` call is running; the engine does
//! not guard against concurrent mutation.
use core::fmt;
use core::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
}

/// Element or attribute name with an optional namespace prefix (`svg:rect`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self { prefix: None, local: local.into() }
    }

    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), local: local.into() }
    }

    /// Split `prefix:local`; a name without a colon has no prefix.
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                Self::prefixed(prefix, local)
            }
            _ => Self::local(name),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Collapse runs of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub trait SelectNode: Clone + Eq + Hash + fmt::Debug {
    fn kind(&self) -> NodeKind;
    /// Qualified name of elements and attributes; `None` for other kinds.
    fn name(&self) -> Option<QName>;
    /// Text of text/comment nodes, value of attributes, concatenated descendant text of
    /// elements and documents.
    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;
    /// All children in document order, including text and comment nodes.
    fn children(&self) -> Vec<Self>;
    /// Attribute nodes of an element (kind [`NodeKind::Attribute`]).
    fn attributes(&self) -> Vec<Self>;

    fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Qualified tag name (`prefix:local`), lower-cased.
    fn tag_name(&self) -> Option<String> {
        self.name().map(|n| n.to_string().to_ascii_lowercase())
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().into_iter().filter(SelectNode::is_element).collect()
    }

    /// Attribute value by name; names compare ASCII-case-insensitively.
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|a| a.name().is_some_and(|n| n.to_string().eq_ignore_ascii_case(name)))
            .map(|a| a.string_value())
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Whether the whitespace-separated `class` attribute contains `class`
    /// (ASCII-case-insensitive).
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
    }

    /// Full text of the node and its descendants, whitespace-normalised.
    fn text(&self) -> String {
        normalize_whitespace(&self.string_value())
    }

    /// Full text of the node and its descendants, as stored.
    fn whole_text(&self) -> String {
        self.string_value()
    }

    /// Text of the direct text children only, whitespace-normalised.
    fn own_text(&self) -> String {
        normalize_whitespace(&self.whole_own_text())
    }

    /// Text of the direct text children only, as stored.
    fn whole_own_text(&self) -> String {
        self.children()
            .iter()
            .filter(|c| c.kind() == NodeKind::Text)
            .map(SelectNode::string_value)
            .collect()
    }

    /// 0-based position among the parent's element children.
    fn element_sibling_index(&self) -> usize {
        self.parent()
            .and_then(|p| p.element_children().iter().position(|c| c == self))
            .unwrap_or(0)
    }

    /// Element siblings before this node, nearest first.
    fn preceding_element_siblings(&self) -> Vec<Self> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        let mut before: Vec<Self> =
            parent.element_children().into_iter().take_while(|c| c != self).collect();
        before.reverse();
        before
    }

    fn previous_element_sibling(&self) -> Option<Self> {
        self.preceding_element_siblings().into_iter().next()
    }

    /// Ancestors from the parent up to the tree root.
    fn ancestors(&self) -> Ancestors<Self> {
        Ancestors { current: self.parent() }
    }
}

/// Iterator over the ancestors of a node, parent first.
#[derive(Debug, Clone)]
pub struct Ancestors<N> {
    current: Option<N>,
}

impl<N: SelectNode> Iterator for Ancestors<N> {
    type Item = N;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current.take()?;
        self.current = node.parent();
        Some(node)
    }
}
