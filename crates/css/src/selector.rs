//! Lexical helpers over raw selector text.
//!
//! None of these build a selector AST: classification only needs to know where
//! top-level commas and the first pseudo-class colon sit, and whether a selector
//! carries escapes or vendor prefixes.

use core::iter::Peekable;
use core::str::Chars;

/// Pseudo-classes and pseudo-elements whose state cannot be queried offline.
pub const STATEFUL_PSEUDOS: &[&str] = &[
    ":link",
    ":visited",
    ":hover",
    ":active",
    ":focus",
    ":focus-within",
    ":focus-visible",
    ":enabled",
    ":disabled",
    ":checked",
    ":indeterminate",
    ":required",
    ":invalid",
    ":valid",
    ":target",
    ":lang",
    ":placeholder-shown",
    "::placeholder",
    "::first-line",
    "::first-letter",
    "::selection",
    "::before",
    "::after",
    ":before",
    ":after",
    ":first-letter",
    ":first-line",
];

/// Vendor prefixes that mark a browser-specific polyfill selector.
const VENDOR_PREFIXES: &[&str] = &["moz", "ms", "webkit", "o"];

/// Which kind of literal an escaped selector starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// `.name`
    Class,
    /// `#name`
    Id,
}

/// Unescaped leading class or id name of a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapedLiteral {
    /// Attribute the literal is compared against.
    pub kind: LiteralKind,
    /// The name with escapes resolved, e.g. `hover:underline`.
    pub name: String,
}

/// Scan state tracking brackets, parentheses, strings and escapes.
#[derive(Default)]
struct Scanner {
    depth: usize,
    quote: Option<char>,
    escaped: bool,
}

impl Scanner {
    /// Feed one character; returns `true` when it sits at the top level unescaped.
    fn top_level(&mut self, ch: char) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        if ch == '\\' {
            self.escaped = true;
            return false;
        }
        if let Some(open) = self.quote {
            if ch == open {
                self.quote = None;
            }
            return false;
        }
        match ch {
            '"' | '\'' => {
                self.quote = Some(ch);
                false
            }
            '(' | '[' => {
                self.depth += 1;
                false
            }
            ')' | ']' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }
}

/// Split a selector list on its top-level commas.
///
/// Commas inside `:is(...)`, attribute selectors, strings or escapes do not split.
pub fn split_selector_list(selector: &str) -> Vec<String> {
    let mut branches = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    for (idx, ch) in selector.char_indices() {
        if scanner.top_level(ch) && ch == ',' {
            branches.push(&selector[start..idx]);
            start = idx + 1;
        }
    }
    branches.push(&selector[start..]);
    branches
        .into_iter()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Whether the selector targets a vendor-prefixed pseudo (`::-webkit-...`, `:-moz-...`).
pub fn is_polyfill(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    lower.match_indices(":-").any(|(idx, _)| {
        let rest = &lower[idx + 2..];
        VENDOR_PREFIXES
            .iter()
            .any(|prefix| rest.strip_prefix(prefix).is_some_and(|tail| tail.starts_with('-')))
    })
}

/// Whether the selector contains a backslash escape.
pub fn has_escape(selector: &str) -> bool {
    selector.contains('\\')
}

/// Whether the selector references a stateful pseudo-class or pseudo-element.
pub fn has_stateful_pseudo(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    STATEFUL_PSEUDOS.iter().any(|pseudo| lower.contains(pseudo))
}

/// Split a selector at its first top-level colon into `(base, modifier)`.
///
/// `base + modifier` always reproduces the input. Returns `None` when there is
/// no such colon.
pub fn split_pseudo(selector: &str) -> Option<(String, String)> {
    let mut scanner = Scanner::default();
    let idx = selector
        .char_indices()
        .find(|&(_, ch)| scanner.top_level(ch) && ch == ':')
        .map(|(idx, _)| idx)?;
    Some((selector[..idx].to_owned(), selector[idx..].to_owned()))
}

/// The part of a pseudo base that can be queried: trailing combinators and
/// whitespace are stripped, so `.menu > ` becomes `.menu`.
pub fn queryable_base(base: &str) -> &str {
    base.trim_end_matches(|ch: char| ch.is_whitespace() || matches!(ch, '>' | '+' | '~'))
}

/// Whether `selector` is a bare AMP custom element tag like `amp-carousel`.
pub fn is_amp_element(selector: &str) -> bool {
    selector.len() > "amp-".len()
        && selector.starts_with("amp-")
        && selector
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Resolve the escape starting after a backslash, returning the decoded character.
fn read_escape(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let mut hex = String::new();
    while hex.len() < 6 {
        match chars.peek() {
            Some(ch) if ch.is_ascii_hexdigit() => {
                hex.push(*ch);
                chars.next();
            }
            _ => break,
        }
    }
    if hex.is_empty() {
        return chars.next();
    }
    if chars.peek().is_some_and(|ch| ch.is_whitespace()) {
        chars.next();
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}

/// Recover the unescaped class or id literal a selector starts with.
///
/// `.hover\:underline:hover` yields class `hover:underline`. Returns `None` when
/// the selector does not start with `.` or `#`.
pub fn escaped_literal(selector: &str) -> Option<EscapedLiteral> {
    let mut chars = selector.trim().chars().peekable();
    let kind = match chars.next()? {
        '.' => LiteralKind::Class,
        '#' => LiteralKind::Id,
        _ => return None,
    };
    let mut name = String::new();
    while let Some(&ch) = chars.peek() {
        if ch == '\\' {
            chars.next();
            if let Some(decoded) = read_escape(&mut chars) {
                name.push(decoded);
            }
        } else if is_name_char(ch) {
            name.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    (!name.is_empty()).then_some(EscapedLiteral { kind, name })
}
