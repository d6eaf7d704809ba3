use core::fmt;
use std::sync::Arc;

use thiserror::Error as ThisError;

/// Coarse classification of a failed `select` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected before any parsing was attempted.
    Validation,
    /// The query text is not a well-formed selector.
    Parse,
}

/// Error returned by compilation and by the facade entry points.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Byte offset into the query for parse errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Validation(_) => None,
            Error::Parse(e) => Some(e.offset),
        }
    }

    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("invalid query: {reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Machine-readable reason of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    UnexpectedCharacter,
    UnexpectedEnd,
    UnterminatedString,
    UnterminatedAttribute,
    UnbalancedParenthesis,
    UnknownPseudoClass,
    InvalidNthFormula,
    InvalidIndex,
    InvalidRegex,
    EmptySelector,
    EmptyArgument,
    DanglingEscape,
}

impl ParseErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorCode::UnexpectedCharacter => "unexpected-character",
            ParseErrorCode::UnexpectedEnd => "unexpected-end",
            ParseErrorCode::UnterminatedString => "unterminated-string",
            ParseErrorCode::UnterminatedAttribute => "unterminated-attribute",
            ParseErrorCode::UnbalancedParenthesis => "unbalanced-parenthesis",
            ParseErrorCode::UnknownPseudoClass => "unknown-pseudo-class",
            ParseErrorCode::InvalidNthFormula => "invalid-nth-formula",
            ParseErrorCode::InvalidIndex => "invalid-index",
            ParseErrorCode::InvalidRegex => "invalid-regex",
            ParseErrorCode::EmptySelector => "empty-selector",
            ParseErrorCode::EmptyArgument => "empty-argument",
            ParseErrorCode::DanglingEscape => "dangling-escape",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed selector text.
///
/// `offset` is a byte offset into `query`, which is always the full text handed to the
/// compiler, including for failures inside nested `:has(...)` / `:not(...)` selectors.
#[derive(Debug, Clone, ThisError)]
#[error("{message} at offset {offset} in query '{query}' ({code})")]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub query: String,
    pub offset: usize,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    pub fn new(
        code: ParseErrorCode,
        query: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self { code, query: query.into(), offset, message: message.into(), source: None }
    }

    /// Compose an error with a source cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }
}

pub type Result<T> = core::result::Result<T, Error>;
