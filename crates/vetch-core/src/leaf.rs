//! # Stock Leaf Transforms
//!
//! Pure functions from a raw JSON value to its canonical form. Each one
//! accepts exactly one value and either returns the canonical value or
//! fails; none of them consults a default or a required flag, which are
//! the business of the parser wrapping them.
//!
//! ## Canonical forms
//!
//! - Hex strings are lowercase with a `0x` prefix.
//! - Amounts are decimal integer strings in base units. Floats are
//!   rejected: they cannot carry an exact quantity.

use serde_json::Value;

use crate::error::{LeafRejection, ParseError};
use crate::shape::Shape;

/// Accept any string unchanged.
pub fn string(value: &Value) -> Result<Value, ParseError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        other => Err(ParseError::type_mismatch(Shape::String, other)),
    }
}

/// Accept any boolean unchanged.
pub fn boolean(value: &Value) -> Result<Value, ParseError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        other => Err(ParseError::type_mismatch(Shape::Boolean, other)),
    }
}

/// Accept an integral JSON number or a decimal integer string, returning a
/// JSON number.
pub fn integer(value: &Value) -> Result<Value, ParseError> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => Err(LeafRejection::FloatRejected(n.as_f64().unwrap_or(f64::NAN)).into()),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(Value::from(i))
            } else if let Ok(u) = trimmed.parse::<u64>() {
                Ok(Value::from(u))
            } else {
                Err(LeafRejection::InvalidInteger(s.clone()).into())
            }
        }
        other => Err(ParseError::type_mismatch(Shape::Number, other)),
    }
}

/// Canonicalize a hex string: optional `0x`/`0X` prefix on input, lowercase
/// digits with a `0x` prefix on output.
pub fn hex(value: &Value) -> Result<Value, ParseError> {
    hex_digits(value).map(|digits| Value::String(format!("0x{digits}")))
}

/// Canonicalize a hex identifier of exactly `bytes` bytes.
///
/// Used for digests, addresses, and similar fixed-width identifiers, e.g.
/// `fixed_hex(32)` for a SHA-256 digest.
pub fn fixed_hex(bytes: usize) -> impl Fn(&Value) -> Result<Value, ParseError> + Send + Sync + Clone {
    move |value| {
        let digits = hex_digits(value)?;
        if digits.len() != bytes * 2 {
            return Err(LeafRejection::WrongLength {
                expected: bytes,
                found: digits.len(),
            }
            .into());
        }
        Ok(Value::String(format!("0x{digits}")))
    }
}

/// Largest `decimals` for which one whole unit fits in a `u128`.
pub const MAX_DECIMALS: u32 = 38;

/// Convert an amount in whole units into an integer string of base units,
/// where one whole unit is `10^decimals` base units.
///
/// Accepts an integral JSON number or a decimal string (`"12.5"`, `"-3"`,
/// `".25"`). More fractional digits than `decimals` is an error, never a
/// rounding. With `decimals` above [`MAX_DECIMALS`] every input is rejected
/// as an overflow.
pub fn amount(decimals: u32) -> impl Fn(&Value) -> Result<Value, ParseError> + Send + Sync + Clone {
    move |value| {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            Value::Number(n) => {
                return Err(LeafRejection::FloatRejected(n.as_f64().unwrap_or(f64::NAN)).into())
            }
            other => return Err(ParseError::type_mismatch(Shape::String, other)),
        };
        scale_amount(&text, decimals).map(Value::String)
    }
}

fn hex_digits(value: &Value) -> Result<String, ParseError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ParseError::type_mismatch(Shape::String, value))?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if let Some(character) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(LeafRejection::InvalidHex {
            input: raw.to_string(),
            character,
        }
        .into());
    }
    Ok(digits.to_ascii_lowercase())
}

fn scale_amount(text: &str, decimals: u32) -> Result<String, ParseError> {
    let invalid = || ParseError::from(LeafRejection::InvalidAmount(text.to_string()));
    let overflow = || ParseError::from(LeafRejection::Overflow(text.to_string()));

    if decimals > MAX_DECIMALS {
        return Err(overflow());
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(LeafRejection::TooManyDecimals {
            input: text.to_string(),
            decimals,
        }
        .into());
    }

    let scaled = format!("{whole}{fraction:0<width$}", width = decimals as usize);
    let units: u128 = scaled.parse().map_err(|_| overflow())?;

    if negative && units != 0 {
        Ok(format!("-{units}"))
    } else {
        Ok(units.to_string())
    }
}
