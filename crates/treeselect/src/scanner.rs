//! Cursor over selector text.
//!
//! A scanner reads a window of the full query. Nested selectors (`:has(...)`, `:not(...)`)
//! get their own scanner over the parenthesized window, so every offset it reports stays
//! relative to the outer query.
use crate::error::{ParseError, ParseErrorCode};

pub struct Scanner<'a> {
    query: &'a str,
    input: &'a str,
    base: usize,
    pos: usize,
}

type SResult<T> = Result<T, ParseError>;

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

pub(crate) fn is_combinator(c: char) -> bool {
    matches!(c, '>' | '+' | '~')
}

impl<'a> Scanner<'a> {
    pub fn new(query: &'a str) -> Self {
        Self { query, input: query, base: 0, pos: 0 }
    }

    /// Scanner over `query[start..start + len]`. Windows come from the compiler's own
    /// bracket matching, so they are always in bounds and on character boundaries.
    pub(crate) fn nested(query: &'a str, start: usize, len: usize) -> Self {
        Self { query, input: &query[start..start + len], base: start, pos: 0 }
    }

    pub fn query(&self) -> &'a str {
        self.query
    }

    /// Byte offset of the cursor within the outer query.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.remainder().chars().nth(n)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// ASCII-case-insensitive lookahead.
    pub fn matches(&self, seq: &str) -> bool {
        self.remainder()
            .get(..seq.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(seq))
    }

    pub fn matches_any(&self, chars: &[char]) -> bool {
        self.peek().is_some_and(|c| chars.contains(&c))
    }

    /// Consume `seq` if it is next.
    pub fn match_chomp(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.len();
            true
        } else {
            false
        }
    }

    pub fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// Rest of the window, consumed.
    pub fn consume_rest(&mut self) -> &'a str {
        let rest = self.remainder();
        self.pos = self.input.len();
        rest
    }

    /// Returns whether any whitespace was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        !self.consume_while(char::is_whitespace).is_empty()
    }

    /// Letters, digits, `-`, `_`, non-ASCII and backslash escapes.
    pub fn consume_identifier(&mut self) -> SResult<String> {
        let start = self.offset();
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => out.push(self.consume_escape()?),
                Some(c) if is_ident_char(c) => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
                _ => break,
            }
        }
        if out.is_empty() {
            return Err(match self.peek() {
                None => self.error(ParseErrorCode::UnexpectedEnd, "expected identifier"),
                Some(c) => self.error_at(
                    start,
                    ParseErrorCode::UnexpectedCharacter,
                    format!("expected identifier, found '{c}'"),
                ),
            });
        }
        Ok(out)
    }

    /// Backslash escape at the cursor: `\` followed by up to six hex digits (plus one
    /// optional whitespace), or by any other single character taken literally.
    fn consume_escape(&mut self) -> SResult<char> {
        let start = self.offset();
        self.advance();
        let hex = self.remainder().chars().take(6).take_while(char::is_ascii_hexdigit).count();
        if hex > 0 {
            let digits = &self.remainder()[..hex];
            self.pos += hex;
            if self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            return Ok(u32::from_str_radix(digits, 16)
                .ok()
                .and_then(char::from_u32)
                .filter(|&c| c != '\0')
                .unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        self.advance().ok_or_else(|| {
            self.error_at(start, ParseErrorCode::DanglingEscape, "escape at end of input")
        })
    }

    /// Quoted string at the cursor (`'...'` or `"..."`). With `unescape`, backslash
    /// escapes are resolved; otherwise the content is returned as written.
    pub fn consume_quoted(&mut self, unescape: bool) -> SResult<String> {
        let start = self.offset();
        let Some(quote) = self.advance().filter(|&c| c == '"' || c == '\'') else {
            return Err(self.error_at(start, ParseErrorCode::UnexpectedCharacter, "expected quote"));
        };
        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        start,
                        ParseErrorCode::UnterminatedString,
                        format!("unterminated string, expected closing {quote}"),
                    ));
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') if unescape => out.push(self.consume_escape()?),
                Some('\\') => {
                    self.advance();
                    out.push('\\');
                    if let Some(next) = self.advance() {
                        out.push(next);
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Consume `open ... close` with nesting, skipping quoted strings and escapes.
    /// Returns the outer-query offset of the content and the content itself.
    pub fn consume_balanced(
        &mut self,
        open: char,
        close: char,
        code: ParseErrorCode,
    ) -> SResult<(usize, &'a str)> {
        let start = self.offset();
        if self.peek() != Some(open) {
            return Err(self.error(ParseErrorCode::UnexpectedCharacter, format!("expected '{open}'")));
        }
        self.advance();
        let content_start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    self.advance();
                }
                q if quote == Some(q) => quote = None,
                _ if quote.is_some() => {}
                '"' | '\'' => quote = Some(c),
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let content = &self.input[content_start..self.pos - close.len_utf8()];
                        return Ok((self.base + content_start, content));
                    }
                }
                _ => {}
            }
        }
        let message = match code {
            ParseErrorCode::UnterminatedAttribute => format!("unterminated attribute selector, expected '{close}'"),
            _ => format!("unbalanced '{open}', expected '{close}'"),
        };
        Err(self.error_at(start, code, message))
    }

    pub fn error(&self, code: ParseErrorCode, message: impl Into<String>) -> ParseError {
        self.error_at(self.offset(), code, message)
    }

    pub fn error_at(
        &self,
        offset: usize,
        code: ParseErrorCode,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::new(code, self.query, offset, message)
    }
}

/// Resolve backslash escapes in free text (unquoted arguments).
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// `Scanner::nested` is crate-private, so its test lives here rather than in tests/scanner.rs.
#[cfg(test)]
mod tests {
    use super::Scanner;
    use crate::error::ParseErrorCode;
    use rstest::rstest;

    #[rstest]
    fn nested_scanner_reports_outer_offsets() {
        let query = "div:has(p.x)";
        let mut s = Scanner::nested(query, 8, 3);
        assert_eq!(s.remainder(), "p.x");
        assert_eq!(s.consume_identifier().unwrap(), "p");
        assert_eq!(s.offset(), 9);
        let err = s.error(ParseErrorCode::UnexpectedCharacter, "boom");
        assert_eq!(err.offset, 9);
        assert_eq!(err.query, query);
    }
}
