//! Decoding of unquoted scalars: booleans, numbers, special floats and
//! date-times.

use crate::problem::ProblemKind;
use crate::scanner::{Fault, is_value_terminator};
use crate::time::{self, Temporal};
use crate::value::{Integer, Literal};
use std::borrow::Cow;

#[cfg(test)]
#[path = "./literal_tests.rs"]
mod tests;

/// Scans a date-time at `start`. Only succeeds if the literal ends at a
/// value boundary.
pub(crate) fn temporal(bytes: &[u8], start: usize) -> Option<(usize, Literal<'static>)> {
    let (len, temporal) = time::munch(bytes.get(start..)?)?;
    let end = start + len;
    if let Some(&next) = bytes.get(end)
        && !is_value_terminator(next)
    {
        return None;
    }
    let literal = match temporal {
        Temporal::Instant(v) => Literal::Instant(v),
        Temporal::LocalDateTime(v) => Literal::LocalDateTime(v),
        Temporal::LocalDate(v) => Literal::LocalDate(v),
        Temporal::LocalTime(v) => Literal::LocalTime(v),
    };
    Some((end, literal))
}

/// Decodes an unquoted token that starts at byte offset `at`.
///
/// Tokens that do not look like a number become strings holding their raw
/// text. Number-shaped tokens that fail to decode are reported and also kept
/// as raw text.
pub(crate) fn bare<'de>(token: &'de str, at: usize) -> (Literal<'de>, Option<Fault>) {
    match token {
        "true" => return (Literal::Boolean(true), None),
        "false" => return (Literal::Boolean(false), None),
        "inf" | "+inf" => return (Literal::Float(f64::INFINITY), None),
        "-inf" => return (Literal::Float(f64::NEG_INFINITY), None),
        "nan" | "+nan" | "-nan" => return (Literal::Float(f64::NAN), None),
        _ => {}
    }
    match token.as_bytes().first() {
        Some(b) if b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.') => number(token, at),
        _ => (Literal::String(Cow::Borrowed(token)), None),
    }
}

fn number<'de>(token: &'de str, at: usize) -> (Literal<'de>, Option<Fault>) {
    let invalid = || {
        (
            Literal::String(Cow::Borrowed(token)),
            Some(Fault::new(
                ProblemKind::InvalidNumber { text: token.into() },
                at,
            )),
        )
    };

    let radix = match token.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let Some(digits) = strip_underscores(&token[2..], |b| (b as char).is_digit(radix)) else {
            return invalid();
        };
        return match i64::from_str_radix(&digits, radix) {
            Ok(value) if !digits.starts_with(['+', '-']) => {
                (Literal::Integer(Integer::wide(value)), None)
            }
            _ => invalid(),
        };
    }

    if token.contains(['.', 'e', 'E']) {
        let point = decimal_point_fault(token, at);
        let parsed = strip_underscores(token, |b| b.is_ascii_digit())
            .and_then(|clean| clean.parse::<f64>().ok());
        return match (parsed, point) {
            (Some(value), point) => (Literal::Float(value), point),
            (None, Some(point)) => (Literal::String(Cow::Borrowed(token)), Some(point)),
            (None, None) => invalid(),
        };
    }

    match strip_underscores(token, |b| b.is_ascii_digit()).and_then(|clean| clean.parse().ok()) {
        Some(value) => (Literal::Integer(Integer::decimal(value)), None),
        None => invalid(),
    }
}

/// Every `.` must sit between two digits.
fn decimal_point_fault(token: &str, at: usize) -> Option<Fault> {
    let bytes = token.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'.' {
            continue;
        }
        let before = i > 0 && bytes[i - 1].is_ascii_digit();
        let after = bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit());
        if !before || !after {
            return Some(Fault::new(ProblemKind::InvalidDecimalPoint, at));
        }
    }
    None
}

/// Removes `_` separators, each of which must sit between two digits.
fn strip_underscores(text: &str, is_digit: impl Fn(u8) -> bool) -> Option<Cow<'_, str>> {
    if !text.contains('_') {
        return Some(Cow::Borrowed(text));
    }
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c == '_' {
            let before = i > 0 && is_digit(bytes[i - 1]);
            let after = bytes.get(i + 1).is_some_and(|&b| is_digit(b));
            if !before || !after {
                return None;
            }
        } else {
            out.push(c);
        }
    }
    Some(Cow::Owned(out))
}
