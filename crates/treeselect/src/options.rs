/// Case policy for attribute value comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    /// ASCII-case-insensitive.
    Insensitive,
}

impl CaseSensitivity {
    pub fn equals(self, value: &str, expected: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => value == expected,
            CaseSensitivity::Insensitive => value.eq_ignore_ascii_case(expected),
        }
    }

    pub fn starts_with(self, value: &str, prefix: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => value.starts_with(prefix),
            CaseSensitivity::Insensitive => value
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
        }
    }

    pub fn ends_with(self, value: &str, suffix: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => value.ends_with(suffix),
            CaseSensitivity::Insensitive => value
                .len()
                .checked_sub(suffix.len())
                .and_then(|start| value.get(start..))
                .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)),
        }
    }

    pub fn contains(self, value: &str, needle: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => value.contains(needle),
            CaseSensitivity::Insensitive => {
                value.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
            }
        }
    }
}

/// Matching options for a `select` call.
///
/// ```
/// use treeselect::{CaseSensitivity, SelectOptions};
///
/// let options = SelectOptions::new()
///     .with_attribute_value_case(CaseSensitivity::Insensitive)
///     .with_scope_root(false);
/// assert!(!options.include_scope_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOptions {
    attribute_value_case: CaseSensitivity,
    include_scope_root: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self { attribute_value_case: CaseSensitivity::Sensitive, include_scope_root: true }
    }
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute_value_case(mut self, case: CaseSensitivity) -> Self {
        self.attribute_value_case = case;
        self
    }

    pub fn attribute_value_case(&self) -> CaseSensitivity {
        self.attribute_value_case
    }

    /// Whether a scope root may itself appear in the result.
    #[must_use]
    pub fn with_scope_root(mut self, include: bool) -> Self {
        self.include_scope_root = include;
        self
    }

    pub fn include_scope_root(&self) -> bool {
        self.include_scope_root
    }
}
