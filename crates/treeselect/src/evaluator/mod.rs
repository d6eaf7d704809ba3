//! Compiled selector predicates.
//!
//! An [`Evaluator`] tests one node against a selector fragment. Combinator variants hold
//! their operands boxed; nothing is mutated after compilation, so one evaluator can be
//! shared across threads and reused for any number of collections.
//!
//! Combinators never start a traversal of their own. They are tested from the subject
//! node outward: `Child(left, right)` at `N` means `right` matches `N` and `left` matches
//! its parent; `Descendant` searches the ancestors up to the scope root; the sibling
//! combinators look at preceding element siblings.
use core::fmt;

use fancy_regex::Regex;
use itertools::Itertools;
use tracing::warn;

use crate::model::{NodeKind, SelectNode};
use crate::options::SelectOptions;

pub mod attribute;
pub mod nth;

pub use attribute::{AttributeOp, AttributeSelector};
pub use nth::NthFormula;

/// Per-call matching context.
#[derive(Debug)]
pub struct MatchContext<'a, N> {
    /// Root of the current traversal.
    pub scope: &'a N,
    pub options: &'a SelectOptions,
}

impl<'a, N> MatchContext<'a, N> {
    pub fn new(scope: &'a N, options: &'a SelectOptions) -> Self {
        Self { scope, options }
    }

    fn rescoped<'b>(&self, scope: &'b N) -> MatchContext<'b, N>
    where
        'a: 'b,
    {
        MatchContext { scope, options: self.options }
    }
}

/// Type selector forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagSelector {
    /// `tag`: compared against the qualified name (`prefix:local`).
    Name(String),
    /// `*|tag`
    AnyNamespace(String),
    /// `ns|*`
    Namespace(String),
    /// `ns|tag`
    Qualified { prefix: String, local: String },
}

impl TagSelector {
    fn matches<N: SelectNode>(&self, node: &N) -> bool {
        let Some(name) = node.name() else {
            return false;
        };
        let prefix_is = |p: &str| name.prefix.as_deref().is_some_and(|np| np.eq_ignore_ascii_case(p));
        match self {
            TagSelector::Name(tag) => name.to_string().eq_ignore_ascii_case(tag),
            TagSelector::AnyNamespace(local) => name.local.eq_ignore_ascii_case(local),
            TagSelector::Namespace(prefix) => prefix_is(prefix),
            TagSelector::Qualified { prefix, local } => {
                prefix_is(prefix) && name.local.eq_ignore_ascii_case(local)
            }
        }
    }
}

impl fmt::Display for TagSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSelector::Name(tag) => f.write_str(tag),
            TagSelector::AnyNamespace(local) => write!(f, "*|{local}"),
            TagSelector::Namespace(prefix) => write!(f, "{prefix}|*"),
            TagSelector::Qualified { prefix, local } => write!(f, "{prefix}|{local}"),
        }
    }
}

/// Position-based pseudo-class family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NthKind {
    Child,
    LastChild,
    OfType,
    LastOfType,
}

impl NthKind {
    fn name(self) -> &'static str {
        match self {
            NthKind::Child => "child",
            NthKind::LastChild => "last-child",
            NthKind::OfType => "of-type",
            NthKind::LastOfType => "last-of-type",
        }
    }

    /// 1-based position of `node` among the element children of `parent`.
    fn position<N: SelectNode>(self, node: &N, parent: &N) -> Option<usize> {
        let siblings = parent.element_children();
        let tag = node.tag_name();
        let same_type = |c: &&N| c.tag_name() == tag;
        let index = siblings.iter().position(|c| c == node)?;
        Some(match self {
            NthKind::Child => index + 1,
            NthKind::LastChild => siblings.len() - index,
            NthKind::OfType => siblings[..index].iter().filter(same_type).count() + 1,
            NthKind::LastOfType => siblings[index + 1..].iter().filter(same_type).count() + 1,
        })
    }
}

/// Which text of a node a text predicate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSource {
    /// Normalised text of the node and its descendants.
    Text,
    /// Normalised text of the direct text children.
    OwnText,
    /// Raw text of the node and its descendants.
    WholeText,
    /// Raw text of the direct text children.
    WholeOwnText,
}

impl TextSource {
    fn read<N: SelectNode>(self, node: &N) -> String {
        match self {
            TextSource::Text => node.text(),
            TextSource::OwnText => node.own_text(),
            TextSource::WholeText => node.whole_text(),
            TextSource::WholeOwnText => node.whole_own_text(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TextSource::Text => "",
            TextSource::OwnText => "Own",
            TextSource::WholeText => "WholeText",
            TextSource::WholeOwnText => "WholeOwnText",
        }
    }

    /// Normalised sources compare case-insensitively, whole sources exactly.
    pub fn is_normalized(self) -> bool {
        matches!(self, TextSource::Text | TextSource::OwnText)
    }
}

#[derive(Debug, Clone)]
pub enum Evaluator {
    /// `*`
    Universal,
    Tag(TagSelector),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    Attribute(AttributeSelector),
    /// `[^prefix]`
    AttributeStarting(String),
    /// `:root`
    Root,
    /// The scope root itself; implicit left operand of a leading combinator.
    ScopeRoot,
    /// `:lt(n)`. The index counts preceding element siblings that match `candidate`: the
    /// compound parts before the predicate, anchored to the enclosing combinator.
    IndexLessThan { n: usize, candidate: Box<Evaluator> },
    /// `:gt(n)`
    IndexGreaterThan { n: usize, candidate: Box<Evaluator> },
    /// `:eq(n)`
    IndexEquals { n: usize, candidate: Box<Evaluator> },
    Nth { kind: NthKind, formula: NthFormula },
    OnlyChild,
    OnlyOfType,
    Empty,
    /// `:contains(text)` and relatives. Normalised sources store the needle lower-cased.
    ContainsText { source: TextSource, needle: String },
    /// `:matches(regex)` and relatives. Normalised sources compile the pattern case-insensitively.
    MatchesText { source: TextSource, regex: Regex },
    /// Compound selector: every part must match the same node.
    And(Vec<Evaluator>),
    /// Selector group: any branch may match.
    Or(Vec<Evaluator>),
    Not(Box<Evaluator>),
    Is(Box<Evaluator>),
    /// `:has(sel)`: some descendant matches, with the subject as scope.
    Has(Box<Evaluator>),
    /// `left right`
    Descendant(Box<Evaluator>, Box<Evaluator>),
    /// `left > right`
    Child(Box<Evaluator>, Box<Evaluator>),
    /// `left + right`
    AdjacentSibling(Box<Evaluator>, Box<Evaluator>),
    /// `left ~ right`
    GeneralSibling(Box<Evaluator>, Box<Evaluator>),
}

impl Evaluator {
    pub fn matches<N: SelectNode>(&self, node: &N, ctx: &MatchContext<'_, N>) -> bool {
        match self {
            Evaluator::ScopeRoot => node == ctx.scope,
            _ if !node.is_element() => false,
            Evaluator::Universal => true,
            Evaluator::Tag(tag) => tag.matches(node),
            Evaluator::Id(id) => node.id().is_some_and(|v| v == *id),
            Evaluator::Class(class) => node.has_class(class),
            Evaluator::Attribute(sel) => sel.matches(node, ctx.options.attribute_value_case()),
            Evaluator::AttributeStarting(prefix) => attribute::has_attribute_starting(node, prefix),
            Evaluator::Root => is_root(node, ctx.scope),
            Evaluator::IndexLessThan { n, candidate } => {
                candidate_index(node, candidate, ctx).is_some_and(|i| i < *n)
            }
            Evaluator::IndexGreaterThan { n, candidate } => {
                candidate_index(node, candidate, ctx).is_some_and(|i| i > *n)
            }
            Evaluator::IndexEquals { n, candidate } => {
                candidate_index(node, candidate, ctx).is_some_and(|i| i == *n)
            }
            Evaluator::Nth { kind, formula } => element_parent(node)
                .and_then(|parent| kind.position(node, &parent))
                .is_some_and(|pos| formula.matches(pos)),
            Evaluator::OnlyChild => {
                element_parent(node).is_some_and(|p| p.element_children().len() == 1)
            }
            Evaluator::OnlyOfType => element_parent(node).is_some_and(|p| {
                let tag = node.tag_name();
                p.element_children().iter().filter(|c| c.tag_name() == tag).count() == 1
            }),
            Evaluator::Empty => node.children().iter().all(|c| c.kind() == NodeKind::Comment),
            Evaluator::ContainsText { source, needle } => {
                let text = source.read(node);
                if source.is_normalized() {
                    text.to_lowercase().contains(needle.as_str())
                } else {
                    text.contains(needle.as_str())
                }
            }
            Evaluator::MatchesText { source, regex } => regex_find(regex, &source.read(node)),
            Evaluator::And(parts) => parts.iter().all(|e| e.matches(node, ctx)),
            Evaluator::Or(branches) => branches.iter().any(|e| e.matches(node, ctx)),
            Evaluator::Not(inner) => !inner.matches(node, ctx),
            Evaluator::Is(inner) => inner.matches(node, ctx),
            Evaluator::Has(inner) => has_descendant(inner, node, &ctx.rescoped(node)),
            Evaluator::Descendant(left, right) => {
                node != ctx.scope
                    && right.matches(node, ctx)
                    && node
                        .ancestors()
                        .take_while_inclusive(|a| a != ctx.scope)
                        .any(|a| left.matches(&a, ctx))
            }
            Evaluator::Child(left, right) => {
                node != ctx.scope
                    && right.matches(node, ctx)
                    && node.parent().is_some_and(|p| left.matches(&p, ctx))
            }
            Evaluator::AdjacentSibling(left, right) => {
                node != ctx.scope
                    && right.matches(node, ctx)
                    && node.previous_element_sibling().is_some_and(|s| left.matches(&s, ctx))
            }
            Evaluator::GeneralSibling(left, right) => {
                node != ctx.scope
                    && right.matches(node, ctx)
                    && node.preceding_element_siblings().iter().any(|s| left.matches(s, ctx))
            }
        }
    }

    pub(crate) fn index_candidate_mut(&mut self) -> Option<&mut Box<Evaluator>> {
        match self {
            Evaluator::IndexLessThan { candidate, .. }
            | Evaluator::IndexGreaterThan { candidate, .. }
            | Evaluator::IndexEquals { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    /// Combine compound parts; a single part is returned as is.
    pub fn and(mut parts: Vec<Evaluator>) -> Evaluator {
        if parts.len() == 1 { parts.swap_remove(0) } else { Evaluator::And(parts) }
    }

    /// Combine group branches; a single branch is returned as is.
    pub fn or(mut branches: Vec<Evaluator>) -> Evaluator {
        if branches.len() == 1 { branches.swap_remove(0) } else { Evaluator::Or(branches) }
    }
}

/// `:root` is the scope root, or the document element when the scope is a document.
fn is_root<N: SelectNode>(node: &N, scope: &N) -> bool {
    if scope.kind() == NodeKind::Document {
        scope.element_children().first() == Some(node)
    } else {
        node == scope
    }
}

/// Parent if it is an element; position pseudo-classes never match below a document node.
fn element_parent<N: SelectNode>(node: &N) -> Option<N> {
    node.parent().filter(SelectNode::is_element)
}

/// 0-based position of `node` among its element siblings matching `candidate`. `None` when
/// `node` is the scope root or not a candidate itself.
fn candidate_index<N: SelectNode>(node: &N, candidate: &Evaluator, ctx: &MatchContext<'_, N>) -> Option<usize> {
    if node == ctx.scope || !candidate.matches(node, ctx) {
        return None;
    }
    Some(node.preceding_element_siblings().iter().filter(|s| candidate.matches(*s, ctx)).count())
}

fn has_descendant<N: SelectNode>(inner: &Evaluator, subject: &N, ctx: &MatchContext<'_, N>) -> bool {
    let mut stack = subject.element_children();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if inner.matches(&node, ctx) {
            return true;
        }
        stack.extend(node.element_children().into_iter().rev());
    }
    false
}

/// Unanchored regex search. A failing match (e.g. backtrack limit) counts as no match.
pub(crate) fn regex_find(regex: &Regex, text: &str) -> bool {
    match regex.is_match(text) {
        Ok(found) => found,
        Err(error) => {
            warn!(pattern = regex.as_str(), %error, "regex evaluation failed; treating as no match");
            false
        }
    }
}

fn fmt_relation(f: &mut fmt::Formatter<'_>, left: &Evaluator, op: &str, right: &Evaluator) -> fmt::Result {
    if matches!(left, Evaluator::ScopeRoot) && op != " " {
        write!(f, "{} {right}", op.trim())
    } else {
        write!(f, "{left}{op}{right}")
    }
}

fn fmt_text_arg(f: &mut fmt::Formatter<'_>, name: &str, source: TextSource, arg: &str) -> fmt::Result {
    write!(f, ":{name}{}({arg})", source.suffix())
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::Universal => f.write_str("*"),
            Evaluator::Tag(tag) => write!(f, "{tag}"),
            Evaluator::Id(id) => write!(f, "#{id}"),
            Evaluator::Class(class) => write!(f, ".{class}"),
            Evaluator::Attribute(sel) => write!(f, "{sel}"),
            Evaluator::AttributeStarting(prefix) => write!(f, "[^{prefix}]"),
            Evaluator::Root => f.write_str(":root"),
            Evaluator::ScopeRoot => f.write_str(":scope"),
            Evaluator::IndexLessThan { n, .. } => write!(f, ":lt({n})"),
            Evaluator::IndexGreaterThan { n, .. } => write!(f, ":gt({n})"),
            Evaluator::IndexEquals { n, .. } => write!(f, ":eq({n})"),
            Evaluator::Nth { kind, formula } => match (kind, *formula == NthFormula::FIRST) {
                (NthKind::Child, true) => f.write_str(":first-child"),
                (NthKind::OfType, true) => f.write_str(":first-of-type"),
                (NthKind::LastChild | NthKind::LastOfType, true) => write!(f, ":{}", kind.name()),
                (_, false) => write!(f, ":nth-{}({formula})", kind.name()),
            },
            Evaluator::OnlyChild => f.write_str(":only-child"),
            Evaluator::OnlyOfType => f.write_str(":only-of-type"),
            Evaluator::Empty => f.write_str(":empty"),
            Evaluator::ContainsText { source, needle } => {
                let quoted = format!("\"{}\"", attribute::escape_quoted(needle));
                fmt_text_arg(f, "contains", *source, &quoted)
            }
            Evaluator::MatchesText { source, regex } => {
                fmt_text_arg(f, "matches", *source, regex.as_str())
            }
            Evaluator::And(parts) => parts.iter().try_for_each(|p| write!(f, "{p}")),
            Evaluator::Or(branches) => f.write_str(&branches.iter().join(", ")),
            Evaluator::Not(inner) => write!(f, ":not({inner})"),
            Evaluator::Is(inner) => write!(f, ":is({inner})"),
            Evaluator::Has(inner) => write!(f, ":has({inner})"),
            Evaluator::Descendant(left, right) => fmt_relation(f, left, " ", right),
            Evaluator::Child(left, right) => fmt_relation(f, left, " > ", right),
            Evaluator::AdjacentSibling(left, right) => fmt_relation(f, left, " + ", right),
            Evaluator::GeneralSibling(left, right) => fmt_relation(f, left, " ~ ", right),
        }
    }
}
