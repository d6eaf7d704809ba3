//! Depth-first collection of matching elements.
use std::collections::HashSet;

use crate::evaluator::{Evaluator, MatchContext};
use crate::model::SelectNode;
use crate::options::SelectOptions;

/// Insertion-ordered set of nodes keyed by node identity.
#[derive(Debug, Clone)]
pub struct NodeSet<N> {
    index: HashSet<N>,
    nodes: Vec<N>,
}

impl<N> Default for NodeSet<N> {
    fn default() -> Self {
        Self { index: HashSet::new(), nodes: Vec::new() }
    }
}

impl<N: SelectNode> NodeSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the node was already present; its position is kept.
    pub fn insert(&mut self, node: N) -> bool {
        if self.index.contains(&node) {
            return false;
        }
        self.index.insert(node.clone());
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }
}

impl<N: SelectNode> Extend<N> for NodeSet<N> {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl<N: SelectNode> FromIterator<N> for NodeSet<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<N: SelectNode> IntoIterator for NodeSet<N> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'s, N: SelectNode> IntoIterator for &'s NodeSet<N> {
    type Item = &'s N;
    type IntoIter = std::slice::Iter<'s, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Pre-order walk over `root` and its descendants, visiting element children only.
fn walk<N: SelectNode>(root: &N, mut visit: impl FnMut(&N) -> bool) {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if !visit(&node) {
            return;
        }
        stack.extend(node.element_children().into_iter().rev());
    }
}

fn candidate<N: SelectNode>(node: &N, root: &N, options: &SelectOptions) -> bool {
    node.is_element() && (options.include_scope_root() || node != root)
}

/// Every element under `root` (inclusive, subject to options) matching `evaluator`, in
/// document order.
pub fn collect<N: SelectNode>(evaluator: &Evaluator, root: &N, options: &SelectOptions) -> Vec<N> {
    let mut found = NodeSet::new();
    collect_into(&mut found, evaluator, root, options);
    found.into_vec()
}

/// Union over several roots: per-root document order, roots in input order, first
/// occurrence wins.
pub fn collect_all<N: SelectNode>(
    evaluator: &Evaluator,
    roots: &[N],
    options: &SelectOptions,
) -> Vec<N> {
    let mut found = NodeSet::new();
    for root in roots {
        collect_into(&mut found, evaluator, root, options);
    }
    found.into_vec()
}

/// First match in document order; the walk stops at the first hit.
pub fn collect_first<N: SelectNode>(
    evaluator: &Evaluator,
    root: &N,
    options: &SelectOptions,
) -> Option<N> {
    let ctx = MatchContext::new(root, options);
    let mut first = None;
    walk(root, |node| {
        if candidate(node, root, options) && evaluator.matches(node, &ctx) {
            first = Some(node.clone());
            return false;
        }
        true
    });
    first
}

fn collect_into<N: SelectNode>(
    found: &mut NodeSet<N>,
    evaluator: &Evaluator,
    root: &N,
    options: &SelectOptions,
) {
    let ctx = MatchContext::new(root, options);
    walk(root, |node| {
        if candidate(node, root, options) && evaluator.matches(node, &ctx) {
            found.insert(node.clone());
        }
        true
    });
}
