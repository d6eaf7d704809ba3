//! Query entry points.
//!
//! The free functions compile the query on every call. Callers that run one query many
//! times can compile a [`Selector`] once and keep it; it is immutable and `Send + Sync`.
use tracing::debug;

use crate::collector;
use crate::compiler;
use crate::error::{Result, ValidationError};
use crate::evaluator::{Evaluator, MatchContext};
use crate::model::SelectNode;
use crate::options::SelectOptions;

/// A compiled selector query.
#[derive(Debug, Clone)]
pub struct Selector {
    query: String,
    evaluator: Evaluator,
}

impl Selector {
    /// Validate and compile `query`.
    ///
    /// # Errors
    /// [`ValidationError`] for an empty or whitespace-only query, [`crate::ParseError`] for
    /// malformed selector text.
    pub fn compile(query: &str) -> Result<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new("query must not be empty").into());
        }
        let evaluator = compiler::compile(trimmed)?;
        Ok(Self { query: trimmed.to_owned(), evaluator })
    }

    /// The trimmed query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn select<N: SelectNode>(&self, root: &N) -> Vec<N> {
        self.select_with(root, &SelectOptions::default())
    }

    pub fn select_with<N: SelectNode>(&self, root: &N, options: &SelectOptions) -> Vec<N> {
        let found = collector::collect(&self.evaluator, root, options);
        debug!(query = %self.query, roots = 1, matches = found.len(), "select");
        found
    }

    pub fn select_all<N: SelectNode>(&self, roots: &[N]) -> Vec<N> {
        self.select_all_with(roots, &SelectOptions::default())
    }

    pub fn select_all_with<N: SelectNode>(&self, roots: &[N], options: &SelectOptions) -> Vec<N> {
        let found = collector::collect_all(&self.evaluator, roots, options);
        debug!(query = %self.query, roots = roots.len(), matches = found.len(), "select");
        found
    }

    pub fn select_first<N: SelectNode>(&self, root: &N) -> Option<N> {
        let found = collector::collect_first(&self.evaluator, root, &SelectOptions::default());
        debug!(query = %self.query, roots = 1, matches = usize::from(found.is_some()), "select first");
        found
    }

    /// Whether `node` matches when the query is evaluated from `scope`.
    pub fn matches<N: SelectNode>(&self, node: &N, scope: &N) -> bool {
        let options = SelectOptions::default();
        node.is_element() && self.evaluator.matches(node, &MatchContext::new(scope, &options))
    }
}

/// Elements under `root` (root included) matching `query`, in document order.
///
/// # Errors
/// Fails if `query` is empty or not a valid selector.
pub fn select<N: SelectNode>(query: &str, root: &N) -> Result<Vec<N>> {
    Ok(Selector::compile(query)?.select(root))
}

/// [`select`] with explicit [`SelectOptions`].
///
/// # Errors
/// Fails if `query` is empty or not a valid selector.
pub fn select_with<N: SelectNode>(query: &str, root: &N, options: &SelectOptions) -> Result<Vec<N>> {
    Ok(Selector::compile(query)?.select_with(root, options))
}

/// Union of [`select`] over `roots`, duplicates removed, first occurrence kept.
///
/// # Errors
/// Fails if `query` is empty or not a valid selector, also when `roots` is empty.
pub fn select_all<N: SelectNode>(query: &str, roots: &[N]) -> Result<Vec<N>> {
    Ok(Selector::compile(query)?.select_all(roots))
}

/// # Errors
/// Fails if `query` is empty or not a valid selector.
pub fn select_all_with<N: SelectNode>(
    query: &str,
    roots: &[N],
    options: &SelectOptions,
) -> Result<Vec<N>> {
    Ok(Selector::compile(query)?.select_all_with(roots, options))
}

/// First element in document order matching `query`.
///
/// # Errors
/// Fails if `query` is empty or not a valid selector.
pub fn select_first<N: SelectNode>(query: &str, root: &N) -> Result<Option<N>> {
    Ok(Selector::compile(query)?.select_first(root))
}
