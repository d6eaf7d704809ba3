use core::fmt;

/// `an+b` from `:nth-child()` and relatives.
///
/// A position `p` (1-based) matches when `p = a*n + b` for some integer `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthFormula {
    pub a: i32,
    pub b: i32,
}

impl NthFormula {
    pub const FIRST: NthFormula = NthFormula { a: 0, b: 1 };

    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `an+b` (whitespace allowed around the sign) or a bare integer.
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String =
            raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_lowercase();
        match compact.as_str() {
            "" => None,
            "odd" => Some(Self::new(2, 1)),
            "even" => Some(Self::new(2, 0)),
            expr => match expr.split_once('n') {
                Some((a_part, b_part)) => {
                    let a = match a_part {
                        "" | "+" => 1,
                        "-" => -1,
                        digits => parse_signed(digits)?,
                    };
                    let b = match b_part {
                        "" => 0,
                        rest if rest.starts_with(['+', '-']) => parse_signed(rest)?,
                        _ => return None,
                    };
                    Some(Self::new(a, b))
                }
                None => Some(Self::new(0, parse_signed(expr)?)),
            },
        }
    }

    pub fn matches(&self, position: usize) -> bool {
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        let Ok(pos) = i64::try_from(position) else {
            return false;
        };
        if a == 0 {
            return pos == b;
        }
        let diff = pos - b;
        diff * a >= 0 && diff % a == 0
    }
}

/// Optional sign followed by at least one digit.
fn parse_signed(s: &str) -> Option<i32> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for NthFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, b) => {
                match a {
                    1 => f.write_str("n")?,
                    -1 => f.write_str("-n")?,
                    a => write!(f, "{a}n")?,
                }
                match b {
                    0 => Ok(()),
                    b if b > 0 => write!(f, "+{b}"),
                    b => write!(f, "{b}"),
                }
            }
        }
    }
}
