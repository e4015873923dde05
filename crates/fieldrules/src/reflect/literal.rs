//! Default literal parsing
//!
//! Literals are plain strings taken from `default` annotations and parsed
//! into the field's own type. Booleans accept the usual truthy and falsy
//! spellings; durations use the `1h30m`, `250ms`, `1.5s` notation.

use std::time::Duration;

/// A literal that cannot be parsed into the target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected} literal `{literal}`: {reason}")]
pub struct LiteralError {
    /// Target type description.
    pub expected: &'static str,
    /// The literal as written.
    pub literal: String,
    /// Parser detail.
    pub reason: String,
}

impl LiteralError {
    pub(crate) fn new(expected: &'static str, literal: &str, reason: impl ToString) -> Self {
        Self {
            expected,
            literal: literal.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Parses a boolean literal.
///
/// Accepts `1`, `t`, `true`, `y`, `yes`, `on` and `0`, `f`, `false`, `n`,
/// `no`, `off`, case-insensitively.
pub fn parse_bool(literal: &str) -> Result<bool, LiteralError> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
        _ => Err(LiteralError::new("bool", literal, "unrecognized spelling")),
    }
}

/// Parses a number with `FromStr`, trimming surrounding whitespace.
pub fn parse_number<T>(literal: &str, expected: &'static str) -> Result<T, LiteralError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    literal
        .trim()
        .parse::<T>()
        .map_err(|e| LiteralError::new(expected, literal, e))
}

const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parses a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// A sequence of decimal numbers, each with a unit (`ns`, `us`/`µs`, `ms`,
/// `s`, `m`, `h`). A bare `0` is accepted. Negative durations are rejected.
pub fn parse_duration(literal: &str) -> Result<Duration, LiteralError> {
    let err = |reason: &str| LiteralError::new("duration", literal, reason);

    let mut rest = literal.trim();
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return Err(err("negative durations are not supported"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(err("empty duration"));
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() || number == "." {
            return Err(err("expected a number"));
        }
        let value: f64 = number.parse().map_err(|_| err("malformed number"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        if unit.is_empty() {
            return Err(err("missing unit"));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| err("unknown unit"))?;

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(err("duration overflows"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
