//! Relative time windows.
//!
//! A search always covers a backward-looking window ending "now". The window
//! is given as a negative duration literal such as `-1h` or `-90m30s`.

use crate::error::{DurationError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

/// Largest magnitude a signed nanosecond count can carry (2^63).
const MAX_MAGNITUDE: u64 = 1 << 63;

/// An absolute `[start, end]` search range.
///
/// Always satisfies `start <= end`; windows built from a duration satisfy
/// `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Parses a relative duration and anchors it at the current time.
    ///
    /// # Errors
    ///
    /// See [`TimeWindow::parse_at`].
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_at(raw, Utc::now())
    }

    /// Parses a relative duration and anchors it at `now`.
    ///
    /// Leading spaces/tabs and trailing spaces/tabs/newlines are ignored.
    /// The literal must start with `-`; forward-looking windows are
    /// rejected even though the grammar itself allows them.
    ///
    /// # Errors
    ///
    /// Returns [`DurationError::InvalidDuration`] for empty, positive or
    /// zero-length durations and [`DurationError::MalformedDuration`] when
    /// the literal does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeDelta, TimeZone, Utc};
    /// use gw_search::core::TimeWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    /// let window = TimeWindow::parse_at("-1h", now).unwrap();
    /// assert_eq!(window.end(), now);
    /// assert_eq!(window.start(), now - TimeDelta::hours(1));
    /// ```
    pub fn parse_at(raw: &str, now: DateTime<Utc>) -> Result<Self> {
        let trimmed = raw
            .trim_start_matches([' ', '\t'])
            .trim_end_matches([' ', '\t', '\n']);

        if trimmed.is_empty() {
            return Err(DurationError::InvalidDuration {
                reason: "duration is empty".to_string(),
            }
            .into());
        }
        if !trimmed.starts_with('-') {
            return Err(DurationError::InvalidDuration {
                reason: "durations must be negative".to_string(),
            }
            .into());
        }

        let delta = parse_duration(trimmed)?;
        if delta.is_zero() {
            return Err(DurationError::InvalidDuration {
                reason: "duration must be non-zero".to_string(),
            }
            .into());
        }

        let start = now
            .checked_add_signed(delta)
            .ok_or_else(|| DurationError::MalformedDuration {
                input: trimmed.to_string(),
                reason: "window start is out of range".to_string(),
            })?;

        Ok(Self { start, end: now })
    }

    /// Start of the window (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the window.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Parses a signed duration literal such as `-1h30m`, `1.5s` or `-250ms`.
///
/// The grammar is `[-+]?(<decimal><unit>)+` or the bare literal `0`, with
/// units `ns`, `us`/`µs`/`μs`, `ms`, `s`, `m` and `h`.
///
/// # Errors
///
/// Returns [`DurationError::MalformedDuration`] on any grammar violation or
/// if the value does not fit in a signed 64-bit nanosecond count.
pub fn parse_duration(literal: &str) -> std::result::Result<TimeDelta, DurationError> {
    let malformed = |reason: &str| DurationError::MalformedDuration {
        input: literal.to_string(),
        reason: reason.to_string(),
    };

    let (negative, mut rest) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(malformed("missing value"));
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(malformed("expected a number"));
        }

        let (whole, after_whole, has_whole) =
            leading_int(rest).ok_or_else(|| malformed("value overflows"))?;
        rest = after_whole;

        let mut fraction = 0_u64;
        let mut scale = 1.0_f64;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (f, s, after_fraction, consumed) = leading_fraction(after_dot);
            fraction = f;
            scale = s;
            has_fraction = consumed;
            rest = after_fraction;
        }
        if !has_whole && !has_fraction {
            return Err(malformed("expected digits around '.'"));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(malformed("missing unit"));
        }
        let (unit_name, after_unit) = rest.split_at(unit_len);
        rest = after_unit;
        let unit =
            unit_nanos(unit_name).ok_or_else(|| malformed(&format!("unknown unit {unit_name:?}")))?;

        if whole > MAX_MAGNITUDE / unit {
            return Err(malformed("value overflows"));
        }
        let mut value = whole * unit;
        if fraction > 0 {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let partial = (fraction as f64 * (unit as f64 / scale)) as u64;
            value = value.saturating_add(partial);
            if value > MAX_MAGNITUDE {
                return Err(malformed("value overflows"));
            }
        }

        total = total
            .checked_add(value)
            .filter(|t| *t <= MAX_MAGNITUDE)
            .ok_or_else(|| malformed("value overflows"))?;
    }

    let nanos = if negative {
        0_i64
            .checked_sub_unsigned(total)
            .ok_or_else(|| malformed("value overflows"))?
    } else {
        i64::try_from(total).map_err(|_| malformed("value overflows"))?
    };

    Ok(TimeDelta::nanoseconds(nanos))
}

/// Nanoseconds per unit, or `None` for unknown units.
fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Consumes leading ASCII digits.
///
/// Returns the value, the remainder and whether any digit was consumed, or
/// `None` if the value does not fit in 63 bits.
fn leading_int(s: &str) -> Option<(u64, &str, bool)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    for b in s[..digits].bytes() {
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
        if value > MAX_MAGNITUDE {
            return None;
        }
    }
    Some((value, &s[digits..], digits > 0))
}

/// Consumes the digits after a decimal point.
///
/// Digits beyond 63 bits of precision are consumed but ignored. Returns the
/// fraction numerator, its scale, the remainder and whether any digit was
/// consumed.
fn leading_fraction(s: &str) -> (u64, f64, &str, bool) {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    let mut scale = 1.0_f64;
    let mut overflowed = false;
    for b in s[..digits].bytes() {
        if overflowed {
            continue;
        }
        match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .filter(|v| *v <= MAX_MAGNITUDE)
        {
            Some(v) => {
                value = v;
                scale *= 10.0;
            }
            None => overflowed = true,
        }
    }
    (value, scale, &s[digits..], digits > 0)
}
