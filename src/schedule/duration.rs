//! Compound duration strings such as `"1h25m"`, `"30s"` or `"-1.5h"`.

use chrono::TimeDelta;
use thiserror::Error;

/// Nanoseconds per accepted unit suffix
const UNITS: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Fraction digits beyond this cannot change the nanosecond result
const MAX_FRACTION_DIGITS: usize = 18;

/// Reasons a duration string is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Nothing to parse
    #[error("duration is empty")]
    Empty,

    /// A unit appeared without a number in front of it
    #[error("expected a number at '{0}'")]
    MissingNumber(String),

    /// A number appeared without a unit after it
    #[error("missing unit after '{0}'")]
    MissingUnit(String),

    /// Unit suffix is not one of ns, us, ms, s, m, h
    #[error("unknown unit '{0}' (expected ns, us, ms, s, m or h)")]
    UnknownUnit(String),

    /// Value does not fit the supported range
    #[error("duration out of range")]
    Overflow,
}

/// Parse a compound duration.
///
/// Accepts an optional sign followed by one or more `<number><unit>` pairs,
/// where the number may carry a decimal fraction. A bare `"0"` is also valid.
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationError> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::MissingNumber(rest.to_string()));
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(rest.to_string()));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| DurationError::Overflow)?
        };
        let mut nanos = whole.checked_mul(scale).ok_or(DurationError::Overflow)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| DurationError::Overflow)?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or(DurationError::Overflow)?;
        }

        total = total.checked_add(nanos).ok_or(DurationError::Overflow)?;
        if total > i64::MAX as u128 {
            return Err(DurationError::Overflow);
        }
        rest = tail;
    }

    let nanos = total as i64;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Render a duration for operator output, e.g. `1h 5m 0s`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_seconds = duration.num_seconds();
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total_seconds = total_seconds.abs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}{}h {}m {}s", sign, hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}{}m {}s", sign, minutes, seconds)
    } else {
        format!("{}{}s", sign, seconds)
    }
}
