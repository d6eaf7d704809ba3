use core::fmt;

use fancy_regex::Regex;

use crate::model::SelectNode;
use crate::options::CaseSensitivity;

/// Value test applied to an attribute.
#[derive(Debug, Clone)]
pub enum AttributeOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Equals(String),
    /// `[attr!=val]`: attribute missing or value different
    NotEquals(String),
    /// `[attr^=val]`
    Prefix(String),
    /// `[attr$=val]`
    Suffix(String),
    /// `[attr*=val]`
    Contains(String),
    /// `[attr~=regex]`
    Matches(Regex),
}

impl AttributeOp {
    pub fn operator(&self) -> &'static str {
        match self {
            AttributeOp::Exists => "",
            AttributeOp::Equals(_) => "=",
            AttributeOp::NotEquals(_) => "!=",
            AttributeOp::Prefix(_) => "^=",
            AttributeOp::Suffix(_) => "$=",
            AttributeOp::Contains(_) => "*=",
            AttributeOp::Matches(_) => "~=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeSelector {
    /// Lower-cased attribute name.
    pub name: String,
    pub op: AttributeOp,
}

impl AttributeSelector {
    pub fn new(name: &str, op: AttributeOp) -> Self {
        Self { name: name.to_ascii_lowercase(), op }
    }

    pub fn matches<N: SelectNode>(&self, node: &N, case: CaseSensitivity) -> bool {
        let value = node.attribute(&self.name);
        match (&self.op, value) {
            (AttributeOp::NotEquals(expected), None) => !expected.is_empty(),
            (_, None) => false,
            (AttributeOp::Exists, Some(_)) => true,
            (AttributeOp::Equals(expected), Some(v)) => case.equals(&v, expected),
            (AttributeOp::NotEquals(expected), Some(v)) => !case.equals(&v, expected),
            (AttributeOp::Prefix(expected), Some(v)) => case.starts_with(&v, expected),
            (AttributeOp::Suffix(expected), Some(v)) => case.ends_with(&v, expected),
            (AttributeOp::Contains(expected), Some(v)) => case.contains(&v, expected),
            (AttributeOp::Matches(regex), Some(v)) => super::regex_find(regex, &v),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            AttributeOp::Exists => write!(f, "[{}]", self.name),
            AttributeOp::Matches(regex) => write!(f, "[{}~={}]", self.name, regex.as_str()),
            AttributeOp::Equals(v)
            | AttributeOp::NotEquals(v)
            | AttributeOp::Prefix(v)
            | AttributeOp::Suffix(v)
            | AttributeOp::Contains(v) => {
                write!(f, "[{}{}\"{}\"]", self.name, self.op.operator(), escape_quoted(v))
            }
        }
    }
}

pub(crate) fn escape_quoted(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `[^prefix]`: any attribute whose name starts with `prefix`.
pub fn has_attribute_starting<N: SelectNode>(node: &N, prefix: &str) -> bool {
    node.attributes().iter().filter_map(SelectNode::name).any(|name| {
        name.to_string()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
