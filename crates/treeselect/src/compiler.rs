//! Selector text to [`Evaluator`] tree.
//!
//! Grammar (informal):
//!
//! ```text
//! group     := complex ( ',' complex )*
//! complex   := combinator? compound ( ( ws | ws? combinator ws? ) compound )*
//! compound  := ( type | '*' )? ( '#' id | '.' class | '[' attr ']' | ':' pseudo )*
//! ```
//!
//! Nested selectors of `:has`, `:not` and `:is` are compiled by a fresh compiler over the
//! parenthesised window of the same query.
use fancy_regex::{Regex, RegexBuilder};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{ParseError, ParseErrorCode, Result};
use crate::evaluator::{
    AttributeOp, AttributeSelector, Evaluator, NthFormula, NthKind, TagSelector, TextSource,
};
use crate::model::normalize_whitespace;
use crate::scanner::{is_combinator, is_ident_char, unescape, Scanner};

type PResult<T> = core::result::Result<T, ParseError>;

/// Compile a selector query. Leading and trailing whitespace is ignored.
pub fn compile(query: &str) -> Result<Evaluator> {
    let evaluator = compile_window(query, 0, query.len())?;
    trace!(query, evaluator = %evaluator, "compiled selector");
    Ok(evaluator)
}

fn compile_window(query: &str, start: usize, len: usize) -> PResult<Evaluator> {
    let mut compiler = Compiler { scanner: Scanner::nested(query, start, len) };
    let evaluator = compiler.parse_group()?;
    match compiler.scanner.peek() {
        None => Ok(evaluator),
        Some(')') => Err(compiler
            .scanner
            .error(ParseErrorCode::UnbalancedParenthesis, "unexpected ')'")),
        Some(c) => Err(compiler
            .scanner
            .error(ParseErrorCode::UnexpectedCharacter, format!("unexpected '{c}'"))),
    }
}

struct Compiler<'a> {
    scanner: Scanner<'a>,
}

impl<'a> Compiler<'a> {
    fn parse_group(&mut self) -> PResult<Evaluator> {
        let mut branches = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.is_empty() || self.scanner.peek() == Some(',') {
                return Err(self.scanner.error(ParseErrorCode::EmptySelector, "empty selector"));
            }
            branches.push(self.parse_complex()?);
            if !self.scanner.match_chomp(",") {
                break;
            }
        }
        Ok(Evaluator::or(branches))
    }

    fn parse_complex(&mut self) -> PResult<Evaluator> {
        let mut current = self.scanner.peek().filter(|&c| is_combinator(c)).map(|_| Evaluator::ScopeRoot);
        loop {
            let spaced = self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None | Some(',') => break,
                Some(c) if is_combinator(c) => {
                    self.scanner.advance();
                    self.scanner.skip_whitespace();
                    let Some(left) = current.take() else {
                        return Err(self.scanner.error(
                            ParseErrorCode::UnexpectedCharacter,
                            format!("unexpected combinator '{c}'"),
                        ));
                    };
                    if self.scanner.is_empty() {
                        return Err(self.scanner.error(
                            ParseErrorCode::UnexpectedEnd,
                            format!("expected selector after '{c}'"),
                        ));
                    }
                    let right = self.parse_compound()?;
                    current = Some(relate(c, left, right));
                }
                Some(c) => {
                    current = Some(match current.take() {
                        None => self.parse_compound()?,
                        Some(left) if spaced => relate(' ', left, self.parse_compound()?),
                        Some(_) if c == ')' => {
                            return Err(self
                                .scanner
                                .error(ParseErrorCode::UnbalancedParenthesis, "unexpected ')'"));
                        }
                        Some(_) => {
                            return Err(self.scanner.error(
                                ParseErrorCode::UnexpectedCharacter,
                                format!("unexpected '{c}'"),
                            ));
                        }
                    });
                }
            }
        }
        current.ok_or_else(|| self.scanner.error(ParseErrorCode::EmptySelector, "empty selector"))
    }

    fn parse_compound(&mut self) -> PResult<Evaluator> {
        let mut parts: SmallVec<[Evaluator; 4]> = SmallVec::new();
        loop {
            let part = match self.scanner.peek() {
                Some('*') if parts.is_empty() => self.parse_universal()?,
                Some('#') => {
                    self.scanner.advance();
                    Evaluator::Id(self.scanner.consume_identifier()?)
                }
                Some('.') => {
                    self.scanner.advance();
                    Evaluator::Class(self.scanner.consume_identifier()?)
                }
                Some('[') => self.parse_attribute()?,
                Some(':') => self.parse_pseudo(&parts)?,
                Some(c) if parts.is_empty() && (is_ident_char(c) || c == '\\') => {
                    self.parse_type()?
                }
                _ => break,
            };
            parts.push(part);
        }
        if parts.is_empty() {
            return Err(match self.scanner.peek() {
                None => self.scanner.error(ParseErrorCode::UnexpectedEnd, "expected selector"),
                Some(')') => {
                    self.scanner.error(ParseErrorCode::UnbalancedParenthesis, "unexpected ')'")
                }
                Some(c) => self.scanner.error(
                    ParseErrorCode::UnexpectedCharacter,
                    format!("unexpected '{c}', expected selector"),
                ),
            });
        }
        Ok(Evaluator::and(parts.into_vec()))
    }

    fn parse_universal(&mut self) -> PResult<Evaluator> {
        self.scanner.advance();
        if !self.scanner.match_chomp("|") {
            return Ok(Evaluator::Universal);
        }
        if self.scanner.match_chomp("*") {
            return Ok(Evaluator::Universal);
        }
        let local = self.scanner.consume_identifier()?.to_ascii_lowercase();
        Ok(Evaluator::Tag(TagSelector::AnyNamespace(local)))
    }

    fn parse_type(&mut self) -> PResult<Evaluator> {
        let name = self.scanner.consume_identifier()?.to_ascii_lowercase();
        if !self.scanner.match_chomp("|") {
            return Ok(Evaluator::Tag(TagSelector::Name(name)));
        }
        if self.scanner.match_chomp("*") {
            return Ok(Evaluator::Tag(TagSelector::Namespace(name)));
        }
        let local = self.scanner.consume_identifier()?.to_ascii_lowercase();
        Ok(Evaluator::Tag(TagSelector::Qualified { prefix: name, local }))
    }

    fn parse_attribute(&mut self) -> PResult<Evaluator> {
        let (start, content) =
            self.scanner
                .consume_balanced('[', ']', ParseErrorCode::UnterminatedAttribute)?;
        let mut inner = Scanner::nested(self.scanner.query(), start, content.len());
        inner.skip_whitespace();

        if inner.match_chomp("^") {
            let prefix = inner.consume_identifier()?;
            inner.skip_whitespace();
            expect_end(&inner, "after attribute prefix")?;
            return Ok(Evaluator::AttributeStarting(prefix.to_ascii_lowercase()));
        }

        let mut name = inner.consume_identifier()?;
        while inner.peek() == Some(':') && inner.peek_nth(1).is_some_and(is_ident_char) {
            inner.advance();
            name.push(':');
            name.push_str(&inner.consume_identifier()?);
        }
        inner.skip_whitespace();
        if inner.is_empty() {
            return Ok(Evaluator::Attribute(AttributeSelector::new(&name, AttributeOp::Exists)));
        }

        let operator_offset = inner.offset();
        let operator = ["!=", "^=", "$=", "*=", "~=", "="]
            .into_iter()
            .find(|op| inner.match_chomp(op))
            .ok_or_else(|| {
                inner.error(
                    ParseErrorCode::UnexpectedCharacter,
                    format!("expected attribute operator after '{name}'"),
                )
            })?;
        let is_regex = operator == "~=";
        inner.skip_whitespace();

        let value_offset = inner.offset();
        let value = if inner.matches_any(&['"', '\'']) {
            let value = inner.consume_quoted(!is_regex)?;
            inner.skip_whitespace();
            expect_end(&inner, "after attribute value")?;
            value
        } else {
            let raw = inner.consume_rest().trim_end();
            if is_regex { raw.to_owned() } else { unescape(raw) }
        };

        if value.is_empty() && !matches!(operator, "=" | "!=") {
            return Err(inner.error_at(
                value_offset,
                ParseErrorCode::EmptyArgument,
                format!("empty value for [{name}{operator}]"),
            ));
        }

        let op = match operator {
            "=" => AttributeOp::Equals(value),
            "!=" => AttributeOp::NotEquals(value),
            "^=" => AttributeOp::Prefix(value),
            "$=" => AttributeOp::Suffix(value),
            "*=" => AttributeOp::Contains(value),
            "~=" => AttributeOp::Matches(compile_regex(&inner, value_offset, &value, false)?),
            _ => {
                return Err(inner.error_at(
                    operator_offset,
                    ParseErrorCode::UnexpectedCharacter,
                    format!("unsupported attribute operator '{operator}'"),
                ));
            }
        };
        Ok(Evaluator::Attribute(AttributeSelector::new(&name, op)))
    }

    /// `preceding` holds the compound parts before this pseudo-class; index predicates count
    /// their position among siblings matching them.
    fn parse_pseudo(&mut self, preceding: &[Evaluator]) -> PResult<Evaluator> {
        let start = self.scanner.offset();
        self.scanner.advance();
        if self.scanner.peek() == Some(':') {
            return Err(self.scanner.error_at(
                start,
                ParseErrorCode::UnknownPseudoClass,
                "pseudo-elements are not supported",
            ));
        }
        let name = self.scanner.consume_identifier()?.to_ascii_lowercase();
        let evaluator = match name.as_str() {
            "root" => Evaluator::Root,
            "scope" => Evaluator::ScopeRoot,
            "empty" => Evaluator::Empty,
            "first-child" => Evaluator::Nth { kind: NthKind::Child, formula: NthFormula::FIRST },
            "last-child" => Evaluator::Nth { kind: NthKind::LastChild, formula: NthFormula::FIRST },
            "first-of-type" => Evaluator::Nth { kind: NthKind::OfType, formula: NthFormula::FIRST },
            "last-of-type" => {
                Evaluator::Nth { kind: NthKind::LastOfType, formula: NthFormula::FIRST }
            }
            "only-child" => Evaluator::OnlyChild,
            "only-of-type" => Evaluator::OnlyOfType,
            "lt" => Evaluator::IndexLessThan {
                n: self.index_argument(&name)?,
                candidate: index_candidate(preceding),
            },
            "gt" => Evaluator::IndexGreaterThan {
                n: self.index_argument(&name)?,
                candidate: index_candidate(preceding),
            },
            "eq" => Evaluator::IndexEquals {
                n: self.index_argument(&name)?,
                candidate: index_candidate(preceding),
            },
            "nth-child" => self.nth_argument(&name, NthKind::Child)?,
            "nth-last-child" => self.nth_argument(&name, NthKind::LastChild)?,
            "nth-of-type" => self.nth_argument(&name, NthKind::OfType)?,
            "nth-last-of-type" => self.nth_argument(&name, NthKind::LastOfType)?,
            "has" => Evaluator::Has(Box::new(self.selector_argument(&name)?)),
            "not" => Evaluator::Not(Box::new(self.selector_argument(&name)?)),
            "is" => Evaluator::Is(Box::new(self.selector_argument(&name)?)),
            "contains" => self.contains_argument(&name, TextSource::Text)?,
            "containsown" => self.contains_argument(&name, TextSource::OwnText)?,
            "containswholetext" => self.contains_argument(&name, TextSource::WholeText)?,
            "containswholeowntext" => self.contains_argument(&name, TextSource::WholeOwnText)?,
            "matches" => self.matches_argument(&name, TextSource::Text)?,
            "matchesown" => self.matches_argument(&name, TextSource::OwnText)?,
            "matcheswholetext" => self.matches_argument(&name, TextSource::WholeText)?,
            "matcheswholeowntext" => self.matches_argument(&name, TextSource::WholeOwnText)?,
            _ => {
                return Err(self.scanner.error_at(
                    start,
                    ParseErrorCode::UnknownPseudoClass,
                    format!("unknown pseudo-class ':{name}'"),
                ));
            }
        };
        Ok(evaluator)
    }

    /// Parenthesised argument of `:name(...)`: outer offset of the content and the content.
    fn argument(&mut self, name: &str) -> PResult<(usize, &'a str)> {
        if self.scanner.peek() != Some('(') {
            let code = if self.scanner.is_empty() {
                ParseErrorCode::UnexpectedEnd
            } else {
                ParseErrorCode::UnexpectedCharacter
            };
            return Err(self.scanner.error(code, format!("expected '(' after ':{name}'")));
        }
        self.scanner.consume_balanced('(', ')', ParseErrorCode::UnbalancedParenthesis)
    }

    /// Like [`Compiler::argument`], with surrounding whitespace trimmed and emptiness rejected.
    fn trimmed_argument(&mut self, name: &str) -> PResult<(usize, &'a str)> {
        let (start, raw) = self.argument(name)?;
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.scanner.error_at(
                start,
                ParseErrorCode::EmptyArgument,
                format!(":{name}(...) requires an argument"),
            ));
        }
        Ok((start + leading, trimmed))
    }

    fn index_argument(&mut self, name: &str) -> PResult<usize> {
        let (start, arg) = self.trimmed_argument(name)?;
        arg.bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| arg.parse::<usize>().ok())
            .flatten()
            .ok_or_else(|| {
                self.scanner.error_at(
                    start,
                    ParseErrorCode::InvalidIndex,
                    format!("expected a non-negative integer in ':{name}', found '{arg}'"),
                )
            })
    }

    fn nth_argument(&mut self, name: &str, kind: NthKind) -> PResult<Evaluator> {
        let (start, arg) = self.trimmed_argument(name)?;
        let formula = NthFormula::parse(arg).ok_or_else(|| {
            self.scanner.error_at(
                start,
                ParseErrorCode::InvalidNthFormula,
                format!("invalid nth formula '{arg}' in ':{name}'"),
            )
        })?;
        Ok(Evaluator::Nth { kind, formula })
    }

    fn selector_argument(&mut self, name: &str) -> PResult<Evaluator> {
        let (start, arg) = self.trimmed_argument(name)?;
        compile_window(self.scanner.query(), start, arg.len())
    }

    /// Quoted (with escapes) or bare (escapes resolved) text argument.
    fn text_argument(&mut self, name: &str, unescape_text: bool) -> PResult<(usize, String)> {
        let (start, arg) = self.trimmed_argument(name)?;
        if !arg.starts_with(['"', '\'']) {
            let text = if unescape_text { unescape(arg) } else { arg.to_owned() };
            return Ok((start, text));
        }
        let mut inner = Scanner::nested(self.scanner.query(), start, arg.len());
        let text = inner.consume_quoted(unescape_text)?;
        expect_end(&inner, "after quoted argument")?;
        if text.is_empty() {
            return Err(inner.error_at(
                start,
                ParseErrorCode::EmptyArgument,
                format!(":{name}(...) requires a non-empty argument"),
            ));
        }
        Ok((start, text))
    }

    fn contains_argument(&mut self, name: &str, source: TextSource) -> PResult<Evaluator> {
        let (_, text) = self.text_argument(name, true)?;
        let needle = if source.is_normalized() {
            normalize_whitespace(&text).to_lowercase()
        } else {
            text
        };
        Ok(Evaluator::ContainsText { source, needle })
    }

    fn matches_argument(&mut self, name: &str, source: TextSource) -> PResult<Evaluator> {
        let (start, pattern) = self.text_argument(name, false)?;
        let regex = compile_regex(&self.scanner, start, &pattern, source.is_normalized())?;
        Ok(Evaluator::MatchesText { source, regex })
    }
}

fn expect_end(scanner: &Scanner<'_>, context: &str) -> PResult<()> {
    match scanner.peek() {
        None => Ok(()),
        Some(c) => Err(scanner.error(
            ParseErrorCode::UnexpectedCharacter,
            format!("unexpected '{c}' {context}"),
        )),
    }
}

/// Combinator `c` between `left` and the compound `right`. Index predicates of `right` are
/// anchored to the same relation, so they only count siblings reachable through it.
fn relate(c: char, left: Evaluator, mut right: Evaluator) -> Evaluator {
    let parts = match &mut right {
        Evaluator::And(parts) => parts.as_mut_slice(),
        single => core::slice::from_mut(single),
    };
    for candidate in parts.iter_mut().filter_map(Evaluator::index_candidate_mut) {
        let inner = core::mem::replace(candidate, Box::new(Evaluator::Universal));
        **candidate = relation(c, left.clone(), *inner);
    }
    relation(c, left, right)
}

fn relation(c: char, left: Evaluator, right: Evaluator) -> Evaluator {
    let (left, right) = (Box::new(left), Box::new(right));
    match c {
        '>' => Evaluator::Child(left, right),
        '+' => Evaluator::AdjacentSibling(left, right),
        '~' => Evaluator::GeneralSibling(left, right),
        _ => Evaluator::Descendant(left, right),
    }
}

fn index_candidate(preceding: &[Evaluator]) -> Box<Evaluator> {
    Box::new(match preceding {
        [] => Evaluator::Universal,
        parts => Evaluator::and(parts.to_vec()),
    })
}

fn compile_regex(
    scanner: &Scanner<'_>,
    offset: usize,
    pattern: &str,
    case_insensitive: bool,
) -> PResult<Regex> {
    RegexBuilder::new(pattern).case_insensitive(case_insensitive).build().map_err(|e| {
        scanner
            .error_at(offset, ParseErrorCode::InvalidRegex, format!("invalid regex '{pattern}'"))
            .with_source(e)
    })
}
