//! Typed interpretation of raw values.
//!
//! Values are stored as raw strings and converted on demand, so a malformed value
//! never fails a load and survives a save untouched. The functions here back the
//! typed accessors on [`Key`](crate::Key) and the serde layer in [`de`](crate::de).
//!
//! ## Conversions
//!
//! | Target   | Accepted input |
//! |----------|----------------|
//! | bool     | `1 t T TRUE true True YES yes Yes y Y ON on On` and the matching false spellings |
//! | integer  | decimal, or `0x`/`0o`/`0b` prefixed, optional sign |
//! | float    | anything [`str::parse::<f64>`] accepts |
//! | duration | Go-style sequences such as `2h45m`, `1.5s`, `-300ms`, `0` |
//! | time     | RFC 3339 (`1993-10-07T20:17:05Z`) |
//! | list     | delimiter-separated, every element trimmed, `\<delim>` escapes a delimiter |
//!
//! ## Reference expansion
//!
//! `%(name)s` is replaced by the value of `name`, looked up through a caller
//! supplied function. Expansion repeats so references may chain, and is bounded at
//! [`MAX_EXPANSION_DEPTH`] passes so self-referencing values terminate.

use crate::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on `%(name)s` expansion passes.
pub const MAX_EXPANSION_DEPTH: usize = 99;

static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\(([^)]+)\)s").unwrap());

/// Parses a boolean spelling.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::parse_bool;
///
/// assert_eq!(parse_bool("on").unwrap(), true);
/// assert_eq!(parse_bool("No").unwrap(), false);
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "YES" | "yes" | "Yes" | "y" | "Y"
        | "ON" | "on" | "On" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "NO" | "no" | "No" | "n" | "N"
        | "OFF" | "off" | "Off" => Ok(false),
        _ => Err(Error::conversion(value, "bool")),
    }
}

/// Splits an optional sign and radix prefix off an integer literal.
fn split_radix(value: &str) -> (bool, u32, &str) {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let lower = digits.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (negative, 16, &digits[2..]),
        Some("0o") => (negative, 8, &digits[2..]),
        Some("0b") => (negative, 2, &digits[2..]),
        _ => (negative, 10, digits),
    }
}

/// Parses a signed integer, accepting `0x`, `0o` and `0b` prefixes.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::parse_int;
///
/// assert_eq!(parse_int("-42").unwrap(), -42);
/// assert_eq!(parse_int("0x3000").unwrap(), 0x3000);
/// ```
pub fn parse_int(value: &str) -> Result<i64> {
    let (negative, radix, digits) = split_radix(value);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(Error::conversion(value, "integer"));
    }
    let magnitude =
        u64::from_str_radix(digits, radix).map_err(|_| Error::conversion(value, "integer"))?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| Error::conversion(value, "integer"))
    } else {
        i64::try_from(magnitude).map_err(|_| Error::conversion(value, "integer"))
    }
}

/// Parses an unsigned integer, accepting `0x`, `0o` and `0b` prefixes.
pub fn parse_uint(value: &str) -> Result<u64> {
    let (negative, radix, digits) = split_radix(value);
    if negative || digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(Error::conversion(value, "unsigned integer"));
    }
    u64::from_str_radix(digits, radix).map_err(|_| Error::conversion(value, "unsigned integer"))
}

pub fn parse_float(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| Error::conversion(value, "float"))
}

/// Parses a Go-style duration such as `2h45m` or `-1.5s`.
///
/// Units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::parse_duration;
/// use chrono::Duration;
///
/// assert_eq!(parse_duration("2h45m").unwrap(), Duration::minutes(165));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::milliseconds(1500));
/// assert!(parse_duration("10 apples").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = || Error::conversion(value, "duration");

    let (negative, mut rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let number = &rest[..number_len];
        if number.is_empty() || number == "." {
            return Err(invalid());
        }
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale: i128 = match &rest[..unit_len] {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;
        let mut divisor: i128 = 1;
        for digit in fraction.bytes().take(18) {
            divisor *= 10;
            nanos += i128::from(digit - b'0') * scale / divisor;
        }
        total_nanos = total_nanos.checked_add(nanos).ok_or_else(invalid)?;
    }

    let total = i64::try_from(total_nanos).map_err(|_| invalid())?;
    Ok(Duration::nanoseconds(if negative { -total } else { total }))
}

/// Formats a duration the way [`parse_duration`] reads it back.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(Duration::minutes(90)), "1h30m0s");
/// assert_eq!(format_duration(Duration::milliseconds(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::microseconds(-250)), "-250µs");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let Some(total) = duration.num_nanoseconds() else {
        return format!("{}s", duration.num_seconds());
    };
    if total == 0 {
        return "0s".to_string();
    }
    let sign = if total < 0 { "-" } else { "" };
    let nanos = total.unsigned_abs();

    if nanos < 1_000_000_000 {
        let (unit, scale) = match nanos {
            0..=999 => ("ns", 1),
            1_000..=999_999 => ("µs", 1_000),
            _ => ("ms", 1_000_000),
        };
        return format!("{sign}{}{unit}", decimal(nanos, scale));
    }

    let hours = nanos / 3_600_000_000_000;
    let minutes = nanos / 60_000_000_000 % 60;
    let seconds = nanos % 60_000_000_000;
    let mut out = sign.to_string();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, 1_000_000_000));
    out.push('s');
    out
}

/// `value / scale` as a decimal without trailing zeros.
fn decimal(value: u64, scale: u64) -> String {
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Parses an RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|_| Error::conversion(value, "RFC 3339 time"))
}

/// Parses a timestamp with a `chrono` format string (which must include an offset).
pub fn parse_time_format(value: &str, format: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, format).map_err(|_| Error::conversion(value, "time"))
}

/// Splits a value on `delim`, trimming every element.
///
/// An empty value yields an empty list. `\` followed by the delimiter produces a
/// literal delimiter; any other escape is kept as written. A trailing delimiter
/// does not produce a trailing empty element.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::split_list;
///
/// assert_eq!(split_list("en, zh, de", ","), vec!["en", "zh", "de"]);
/// assert_eq!(split_list(r"a\,b, c", ","), vec!["a,b", "c"]);
/// assert!(split_list("", ",").is_empty());
/// ```
pub fn split_list(value: &str, delim: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    if delim.is_empty() {
        return vec![value.trim().to_string()];
    }

    let mut items = Vec::with_capacity(2);
    let mut current = String::new();
    let mut rest = value;
    while let Some(ch) = rest.chars().next() {
        if ch == '\\' {
            let after = &rest[1..];
            if after.starts_with(delim) {
                current.push_str(delim);
                rest = &after[delim.len()..];
            } else if after.starts_with('\\') {
                current.push('\\');
                rest = &after[1..];
            } else {
                current.push('\\');
                rest = after;
            }
        } else if rest.starts_with(delim) {
            items.push(current.trim().to_string());
            current.clear();
            rest = &rest[delim.len()..];
        } else {
            current.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    if !current.is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

/// Expands `%(name)s` references through `lookup`.
///
/// References that `lookup` cannot resolve are kept verbatim. Expansion stops when
/// a pass changes nothing or after [`MAX_EXPANSION_DEPTH`] passes.
///
/// # Examples
///
/// ```rust
/// use ini_doc::value::expand_references;
///
/// let lookup = |name: &str| match name {
///     "NAME" => Some("ini".to_string()),
///     "VERSION" => Some("v1".to_string()),
///     _ => None,
/// };
/// assert_eq!(
///     expand_references("gopkg.in/%(NAME)s.%(VERSION)s/%(MISSING)s", lookup),
///     "gopkg.in/ini.v1/%(MISSING)s"
/// );
/// ```
pub fn expand_references<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("%(") {
        return value.to_string();
    }

    let mut current = value.to_string();
    for _ in 0..MAX_EXPANSION_DEPTH {
        let mut changed = false;
        let next = VAR_PATTERN.replace_all(&current, |caps: &regex::Captures<'_>| {
            match lookup(&caps[1]) {
                Some(resolved) => {
                    changed = true;
                    resolved
                }
                None => caps[0].to_string(),
            }
        });
        if !changed {
            break;
        }
        current = next.into_owned();
    }
    current
}
