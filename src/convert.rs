//! Text to value conversion primitives.
//!
//! Every function here is total: it either returns the converted value or a
//! [`ConversionError`]. Nothing is clamped, wrapped or silently truncated.

use crate::error::ConversionError;
use crate::field::FieldKind;
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Parse the boolean vocabulary, case-insensitively.
///
/// `1 t true y yes on` are true, `0 f false n no off` are false.
pub fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    match text.trim().to_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
        _ => Err(ConversionError::invalid("boolean", text)),
    }
}

/// Parse a base-10 signed integer that must fit in `bits` bits
pub fn parse_int(text: &str, bits: u32) -> Result<i64, ConversionError> {
    let value: i64 = text
        .parse()
        .map_err(|_| ConversionError::invalid("int", text))?;
    if bits < 64 {
        let max = (1i64 << (bits - 1)) - 1;
        let min = -(1i64 << (bits - 1));
        if value < min || value > max {
            return Err(ConversionError::invalid("int", text));
        }
    }
    Ok(value)
}

/// Parse a base-10 unsigned integer that must fit in `bits` bits
pub fn parse_uint(text: &str, bits: u32) -> Result<u64, ConversionError> {
    let value: u64 = text
        .parse()
        .map_err(|_| ConversionError::invalid("uint", text))?;
    if bits < 64 && value > (1u64 << bits) - 1 {
        return Err(ConversionError::invalid("uint", text));
    }
    Ok(value)
}

/// Parse a decimal or scientific float. A 32-bit target rejects finite
/// values outside the `f32` range.
pub fn parse_float(text: &str, bits: u32) -> Result<f64, ConversionError> {
    let value: f64 = text
        .parse()
        .map_err(|_| ConversionError::invalid("float", text))?;
    if bits == 32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(ConversionError::invalid("float", text));
    }
    Ok(value)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

// Longest duration accepted, in nanoseconds
const MAX_DURATION_NANOS: u128 = i64::MAX as u128;

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parse a compound duration literal such as `1h30m`, `250ms` or `1.5s`.
///
/// Every component needs a unit; the bare literal `0` is the one exception.
pub fn parse_duration(text: &str) -> Result<Duration, ConversionError> {
    let invalid = || ConversionError::invalid("duration", text);

    let (negative, mut rest) = match text.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = leading_digits(rest);
        let (whole, after) = rest.split_at(int_len);

        let (fraction, after) = match after.strip_prefix('.') {
            Some(f) => f.split_at(leading_digits(f)),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(invalid)?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        total = whole
            .checked_mul(scale)
            .and_then(|n| total.checked_add(n))
            .filter(|&t| t <= MAX_DURATION_NANOS)
            .ok_or_else(invalid)?;

        if !fraction.is_empty() {
            let mut numerator: u128 = 0;
            let mut denominator: u128 = 1;
            for digit in fraction.bytes().take(18) {
                numerator = numerator * 10 + u128::from(digit - b'0');
                denominator *= 10;
            }
            total = (numerator * scale / denominator)
                .checked_add(total)
                .filter(|&t| t <= MAX_DURATION_NANOS)
                .ok_or_else(invalid)?;
        }

        rest = tail;
    }

    if negative && total != 0 {
        return Err(ConversionError::invalid("non-negative duration", text));
    }
    Ok(Duration::from_nanos(total as u64))
}

/// Parse an absolute URL; a value without a scheme is rejected
pub fn parse_url(text: &str) -> Result<Url, ConversionError> {
    match Url::parse(text) {
        Ok(url) if !url.scheme().is_empty() => Ok(url),
        _ => Err(ConversionError::invalid("url", text)),
    }
}

/// Split on `sep`, trim each part and drop the empty ones
pub fn split_and_trim(text: &str, sep: &str) -> Vec<String> {
    text.split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, ConversionError> {
    serde_json::from_str(text).map_err(|e| ConversionError::Json(e.to_string()))
}

/// Convert `raw` to the value of a field of `kind`
pub fn convert(kind: &FieldKind, raw: &str, sep: &str) -> Result<Value, ConversionError> {
    match kind {
        FieldKind::Optional(inner) => match inner.as_ref() {
            FieldKind::Url => parse_url(raw).map(Value::Url),
            other => convert(other, raw, sep),
        },
        FieldKind::String => Ok(Value::Str(raw.to_string())),
        FieldKind::Bool => parse_bool(raw).map(Value::Bool),
        FieldKind::Int(bits) => parse_int(raw, *bits).map(Value::Int),
        FieldKind::Uint(bits) => parse_uint(raw, *bits).map(Value::Uint),
        FieldKind::Float(bits) => parse_float(raw, *bits).map(Value::Float),
        FieldKind::Duration => parse_duration(raw).map(Value::Duration),
        FieldKind::Url => Err(ConversionError::Unsupported(
            "use Option<Url> for URL fields, not Url".to_string(),
        )),
        FieldKind::List(elem) => match elem.as_ref() {
            FieldKind::String => Ok(Value::List(split_and_trim(raw, sep))),
            other => Err(ConversionError::Unsupported(format!(
                "only string lists are supported, not list of {other}"
            ))),
        },
    }
}
