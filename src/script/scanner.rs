//! Extraction primitives over a single step line.
//!
//! Each function takes the unconsumed text and returns the extracted value
//! together with whatever follows it. Nothing is stored between calls, so the
//! caller threads the remainder explicitly from one field to the next.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::actions::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("missing opening '{0}'")]
    MissingOpen(char),
    #[error("missing closing '{0}'")]
    MissingClose(char),
    #[error("expected two comma-separated fields")]
    MissingComma,
    #[error("no defines.{0}.<name> reference found")]
    MissingSymbol(&'static str),
    #[error("field is empty")]
    EmptyField,
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// Namespace of a `defines.<category>.<name>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Direction,
    Inventory,
}

impl SymbolCategory {
    pub fn name(self) -> &'static str {
        match self {
            SymbolCategory::Direction => "direction",
            SymbolCategory::Inventory => "inventory",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            SymbolCategory::Direction => &RE_DIRECTION,
            SymbolCategory::Inventory => &RE_INVENTORY,
        }
    }
}

static RE_DIRECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"defines\.direction\.([A-Za-z_][A-Za-z0-9_]*)").expect("direction pattern")
});

static RE_INVENTORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"defines\.inventory\.([A-Za-z_][A-Za-z0-9_]*)").expect("inventory pattern")
});

static RE_CANCEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bcancel\s*=\s*(true|false)\b").expect("cancel pattern"));

/// Slice strictly between the first `open` and the next `close` after it.
fn delimited(text: &str, open: char, close: char) -> Result<(&str, &str), ScanError> {
    let start = text.find(open).ok_or(ScanError::MissingOpen(open))? + open.len_utf8();
    let len = text[start..]
        .find(close)
        .ok_or(ScanError::MissingClose(close))?;
    let end = start + len;
    Ok((&text[start..end], text[end + close.len_utf8()..].trim_start()))
}

fn parse_f64(raw: &str) -> Result<f64, ScanError> {
    let raw = raw.trim();
    raw.parse()
        .map_err(|_| ScanError::InvalidNumber(raw.to_string()))
}

/// Parse a bare integer field such as a quantity or tick count.
pub fn parse_int(raw: &str) -> Result<i32, ScanError> {
    let raw = raw.trim();
    raw.parse()
        .map_err(|_| ScanError::InvalidNumber(raw.to_string()))
}

/// Content of the leading `[n]` step index.
pub fn step_index(text: &str) -> Result<(&str, &str), ScanError> {
    delimited(text.trim(), '[', ']')
}

/// Content of the first double-quoted string.
pub fn quoted(text: &str) -> Result<(&str, &str), ScanError> {
    delimited(text.trim(), '"', '"')
}

/// First `{x, y}` pair.
pub fn position(text: &str) -> Result<(Position, &str), ScanError> {
    let (inner, rest) = delimited(text, '{', '}')?;
    let (x, y) = inner.split_once(',').ok_or(ScanError::MissingComma)?;
    Ok((Position::new(parse_f64(x)?, parse_f64(y)?), rest))
}

/// Text between the first two commas, trimmed. The remainder starts after
/// the second comma.
pub fn between_commas(text: &str) -> Result<(&str, &str), ScanError> {
    let text = text.trim();
    let first = text.find(',').ok_or(ScanError::MissingComma)?;
    let second = text[first + 1..]
        .find(',')
        .ok_or(ScanError::MissingComma)?
        + first
        + 1;
    Ok((text[first + 1..second].trim(), text[second + 1..].trim_start()))
}

/// Final segment of the first `defines.<category>.<name>` reference.
pub fn symbol(text: &str, category: SymbolCategory) -> Result<(&str, &str), ScanError> {
    let caps = category
        .pattern()
        .captures(text)
        .ok_or(ScanError::MissingSymbol(category.name()))?;
    let whole = caps.get(0).ok_or(ScanError::MissingSymbol(category.name()))?;
    let name = caps.get(1).map_or("", |m| m.as_str());
    Ok((name, text[whole.end()..].trim_start()))
}

/// Trailing scalar of a step: everything up to the closing `}` of the
/// step (or the end of the line when the step is unbraced), minus the
/// separating comma.
pub fn tail(text: &str) -> Result<(&str, &str), ScanError> {
    let (raw, rest) = match text.find('}') {
        Some(close) => (&text[..close], &text[close + 1..]),
        None => (text, ""),
    };
    let value = raw.trim().trim_start_matches(',').trim();
    if value.is_empty() {
        return Err(ScanError::EmptyField);
    }
    Ok((value, rest.trim_start()))
}

/// Optional `cancel = true|false` trailer. Absent means `false`.
pub fn cancel_flag(text: &str) -> bool {
    RE_CANCEL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str() == "true")
}

/// Whether the next field in `text` (after separators) is a quoted string.
pub fn next_is_quoted(text: &str) -> bool {
    text.trim_start_matches(|c: char| c == ',' || c.is_whitespace())
        .starts_with('"')
}
