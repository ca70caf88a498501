//! Reversible token substitution over raw page text.
//!
//! Every rule maps a literal pattern to a two-character sentinel code: the
//! [`SENTINEL`] marker followed by one character from the Unicode private-use
//! block. Encoding doubles any marker already present, then folds the rules
//! over the buffer in table order. Decoding is a single left-to-right scan.
//!
//! ```text
//! <div class="a">hi</div>   ──encode──▶   º\u{E016} º\u{E021}"a">hiº\u{E015}
//! ```

use crate::error::{CodecError, Result};

/// Sentinel marker that starts every code. Literal markers are doubled.
pub const SENTINEL: char = 'º';

/// First code character. Codes are allocated upward from here.
pub const CODE_BASE: u32 = 0xE000;

/// Last code character (end of the BMP private-use block).
const CODE_LAST: u32 = 0xF8FF;

const ESCAPED_SENTINEL: &str = "ºº";

/// Patterns of the built-in HTML/JS table, in match order.
///
/// Compound forms come before the shorter forms they contain.
pub const HTML_PATTERNS: &[&str] = &[
    "<!DOCTYPE html>",
    "<script>",
    "</script>",
    "<script",
    "<html>",
    "</html>",
    "<head>",
    "</head>",
    "<body>",
    "</body>",
    "<header>",
    "</header>",
    "<style>",
    "</style>",
    "<footer>",
    "</footer>",
    "<footer",
    "<nav>",
    "</nav>",
    "<nav",
    "<div>",
    "</div>",
    "<div",
    "<span>",
    "</span>",
    "<button",
    "</button>",
    "<input",
    "<img",
    "placeholder",
    " style=",
    "hidden",
    "type=",
    "class=",
    "document.getElementById(",
    "getElementById(",
    "addEventListener(",
    "console.log(",
    "innerHTML",
    "alert(",
    "function",
    "toString()",
    "return ",
    "<form",
    "</form>",
    "<table",
    "</table>",
    "onclick",
    "font-size",
    "background-color",
    "background",
    "color",
    "border",
    "padding",
    "margin",
    "height",
    "width",
    "const",
    "Number",
    "JSON",
    "while",
    "stringify",
    "filter",
    "push",
    "replace",
    "indexOf",
    "async",
    "await",
    "length",
    "parse",
    "forEach",
];

/// One substitution rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRule {
    pattern: String,
    code: char,
    sentinel: String,
}

impl TokenRule {
    fn new(pattern: &str, code: char) -> Self {
        let mut sentinel = String::with_capacity(SENTINEL.len_utf8() + code.len_utf8());
        sentinel.push(SENTINEL);
        sentinel.push(code);
        Self {
            pattern: pattern.to_string(),
            code,
            sentinel,
        }
    }

    /// The literal text this rule replaces.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The private-use character that follows the marker.
    pub fn code(&self) -> char {
        self.code
    }

    /// The full sentinel code (marker + code character).
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

/// Ordered rule list. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTable {
    rules: Vec<TokenRule>,
}

impl TokenTable {
    /// Build a table from patterns, assigning codes in order from [`CODE_BASE`].
    ///
    /// Rejects empty patterns, patterns containing the marker or a code
    /// character, and any earlier pattern that is a substring of a later one.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<S> = patterns.into_iter().collect();
        let max = (CODE_LAST - CODE_BASE + 1) as usize;
        if patterns.len() > max {
            return Err(CodecError::TableTooLarge {
                len: patterns.len(),
                max,
            });
        }

        for (index, pattern) in patterns.iter().enumerate() {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                return Err(CodecError::EmptyPattern { index });
            }
            if pattern.chars().any(is_reserved) {
                return Err(CodecError::ReservedCharacter {
                    pattern: pattern.to_string(),
                });
            }
        }

        for (i, earlier) in patterns.iter().enumerate() {
            for later in &patterns[i + 1..] {
                if later.as_ref().contains(earlier.as_ref()) {
                    return Err(CodecError::ShadowedPattern {
                        earlier: earlier.as_ref().to_string(),
                        later: later.as_ref().to_string(),
                    });
                }
            }
        }

        Ok(Self::from_patterns(patterns.iter().map(|p| p.as_ref())))
    }

    /// The built-in table for HTML pages with inline CSS and JavaScript.
    pub fn html_default() -> Self {
        Self::from_patterns(HTML_PATTERNS.iter().copied())
    }

    fn from_patterns<'a>(patterns: impl Iterator<Item = &'a str>) -> Self {
        let rules = patterns
            .zip((CODE_BASE..=CODE_LAST).filter_map(char::from_u32))
            .map(|(pattern, code)| TokenRule::new(pattern, code))
            .collect();
        Self { rules }
    }

    /// Rules in match order.
    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up the pattern for a code character.
    pub fn pattern_for(&self, code: char) -> Option<&str> {
        let offset = (code as u32).checked_sub(CODE_BASE)?;
        self.rules
            .get(offset as usize)
            .map(|rule| rule.pattern.as_str())
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::html_default()
    }
}

fn is_reserved(ch: char) -> bool {
    ch == SENTINEL || (CODE_BASE..=CODE_LAST).contains(&(ch as u32))
}

/// Recode `text`: escape literal markers, then apply every rule in order.
pub fn encode(text: &str, table: &TokenTable) -> String {
    let escaped = text.replace(SENTINEL, ESCAPED_SENTINEL);
    let encoded = table.rules.iter().fold(escaped, |buf, rule| {
        if buf.contains(rule.pattern.as_str()) {
            buf.replace(rule.pattern.as_str(), &rule.sentinel)
        } else {
            buf
        }
    });

    tracing::debug!(
        input_len = text.len(),
        output_len = encoded.len(),
        rules = table.len(),
        "recoded payload"
    );
    encoded
}

/// Reverse [`encode`].
///
/// Fails on a marker followed by an unknown code character, or on a trailing
/// lone marker.
pub fn decode(text: &str, table: &TokenTable) -> Result<String> {
    let mut out = String::with_capacity(text.len() * 2);
    let mut chars = text.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch != SENTINEL {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, SENTINEL)) => out.push(SENTINEL),
            Some((_, code)) => match table.pattern_for(code) {
                Some(pattern) => out.push_str(pattern),
                None => return Err(CodecError::UnknownSentinel { code, offset }),
            },
            None => return Err(CodecError::TruncatedSentinel { offset }),
        }
    }

    Ok(out)
}
