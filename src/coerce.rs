//! Type coercion: turn a raw lookup result into a field's native value.
//!
//! | Field type | Accepted input |
//! |------------|----------------|
//! | `String` | anything, used verbatim |
//! | `Vec<u8>` | base64, standard alphabet, no padding |
//! | `bool` | `1`/`0`, `t`/`f`, `true`/`false`, any case |
//! | signed / unsigned ints | decimal, `0x`, `0o` (or leading `0`), `0b` literals |
//! | `f32` / `f64` | float literals, must fit the width |
//! | `Complex<_>` | `real,imaginary` |
//! | anything else | exactly one whitespace-delimited token, via [`Scan`](crate::Scan) |
//!
//! The field is only written once the whole value parsed, so a failed
//! coercion leaves it untouched.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use crate::error::CoerceError;
use crate::record::Slot;
use crate::types::Complex;

const INVALID_SYNTAX: &str = "invalid syntax";
const OUT_OF_RANGE: &str = "value out of range";

/// A converted value, as handed to reporters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i128),
    Uint(u128),
    F32(f32),
    F64(f64),
    Complex32(Complex<f32>),
    Complex64(Complex<f64>),
    /// Rendered form of a scanned custom type.
    Scanned(String),
    /// No source had the key of an optional field.
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) | Value::Scanned(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&STANDARD_NO_PAD.encode(b)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Complex32(c) => write!(f, "{c}"),
            Value::Complex64(c) => write!(f, "{c}"),
            Value::Missing => Ok(()),
        }
    }
}

/// Convert `raw` into the slot's type and store it.
pub fn coerce(raw: &str, slot: &mut Slot<'_>) -> Result<Value, CoerceError> {
    let target = slot.type_name();
    let fail = |reason: String| CoerceError::new(target, reason);

    match slot {
        Slot::Str(field) => {
            **field = raw.to_string();
            Ok(Value::Str(raw.to_string()))
        }
        Slot::Bytes(field) => {
            // Line breaks are ignored, so wrapped base64 decodes too.
            let encoded: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
            let bytes = STANDARD_NO_PAD
                .decode(encoded)
                .map_err(|e| fail(e.to_string()))?;
            **field = bytes.clone();
            Ok(Value::Bytes(bytes))
        }
        Slot::Bool(field) => {
            let value = parse_bool(raw).ok_or_else(|| fail(INVALID_SYNTAX.into()))?;
            **field = value;
            Ok(Value::Bool(value))
        }
        Slot::I8(field) => set_signed(&mut **field, raw).map_err(fail),
        Slot::I16(field) => set_signed(&mut **field, raw).map_err(fail),
        Slot::I32(field) => set_signed(&mut **field, raw).map_err(fail),
        Slot::I64(field) => set_signed(&mut **field, raw).map_err(fail),
        Slot::Isize(field) => set_signed(&mut **field, raw).map_err(fail),
        Slot::U8(field) => set_unsigned(&mut **field, raw).map_err(fail),
        Slot::U16(field) => set_unsigned(&mut **field, raw).map_err(fail),
        Slot::U32(field) => set_unsigned(&mut **field, raw).map_err(fail),
        Slot::U64(field) => set_unsigned(&mut **field, raw).map_err(fail),
        Slot::Usize(field) => set_unsigned(&mut **field, raw).map_err(fail),
        Slot::F32(field) => {
            let value = parse_float::<f32>(raw, f32::is_infinite).map_err(fail)?;
            **field = value;
            Ok(Value::F32(value))
        }
        Slot::F64(field) => {
            let value = parse_float::<f64>(raw, f64::is_infinite).map_err(fail)?;
            **field = value;
            Ok(Value::F64(value))
        }
        Slot::Complex32(field) => {
            let value = parse_complex(raw, |s| parse_float::<f32>(s, f32::is_infinite))
                .map_err(fail)?;
            **field = value;
            Ok(Value::Complex32(value))
        }
        Slot::Complex64(field) => {
            let value = parse_complex(raw, |s| parse_float::<f64>(s, f64::is_infinite))
                .map_err(fail)?;
            **field = value;
            Ok(Value::Complex64(value))
        }
        Slot::Scan(field) => {
            let token = single_token(raw).map_err(fail)?;
            field.scan_token(token).map_err(fail)?;
            Ok(Value::Scanned(field.render()))
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let text = raw.trim();
    if ["1", "t", "true"].iter().any(|s| text.eq_ignore_ascii_case(s)) {
        Some(true)
    } else if ["0", "f", "false"].iter().any(|s| text.eq_ignore_ascii_case(s)) {
        Some(false)
    } else {
        None
    }
}

fn set_signed<T: TryFrom<i128>>(field: &mut T, raw: &str) -> Result<Value, String> {
    let value = parse_signed(raw)?;
    *field = T::try_from(value).map_err(|_| OUT_OF_RANGE.to_string())?;
    Ok(Value::Int(value))
}

fn set_unsigned<T: TryFrom<u128>>(field: &mut T, raw: &str) -> Result<Value, String> {
    let value = parse_unsigned(raw)?;
    *field = T::try_from(value).map_err(|_| OUT_OF_RANGE.to_string())?;
    Ok(Value::Uint(value))
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn parse_signed(raw: &str) -> Result<i128, String> {
    let (negative, body) = split_sign(raw.trim());
    let magnitude = i128::try_from(parse_magnitude(body)?).map_err(|_| OUT_OF_RANGE)?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_unsigned(raw: &str) -> Result<u128, String> {
    match split_sign(raw.trim()) {
        (true, _) => Err(INVALID_SYNTAX.into()),
        (false, body) => parse_magnitude(body),
    }
}

/// Unsigned integer literal with an optional base prefix and `_` separators.
fn parse_magnitude(text: &str) -> Result<u128, String> {
    let (radix, digits, prefixed) = match text.get(..2) {
        Some("0x" | "0X") => (16, &text[2..], true),
        Some("0o" | "0O") => (8, &text[2..], true),
        Some("0b" | "0B") => (2, &text[2..], true),
        _ if text.len() > 1 && text.starts_with('0') => (8, &text[1..], true),
        _ => (10, text, false),
    };

    // A separator may follow the base prefix, as in `0x_1F` or `0_17`.
    let well_formed = !digits.is_empty()
        && (prefixed || !digits.starts_with('_'))
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(INVALID_SYNTAX.into());
    }

    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    u128::from_str_radix(&digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => OUT_OF_RANGE.to_string(),
        _ => INVALID_SYNTAX.to_string(),
    })
}

fn parse_float<T>(raw: &str, is_infinite: fn(T) -> bool) -> Result<T, String>
where
    T: FromStr + Copy,
    T::Err: fmt::Display,
{
    let text = raw.trim();
    let value: T = text.parse().map_err(|e: T::Err| e.to_string())?;

    // Finite literals that overflow the width parse to infinity.
    let unsigned = text.trim_start_matches(['+', '-']);
    let spelled_infinite =
        unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity");
    if is_infinite(value) && !spelled_infinite {
        return Err(OUT_OF_RANGE.into());
    }
    Ok(value)
}

fn parse_complex<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Complex<T>, String> {
    let mut parts = raw.split(',');
    let (Some(re), Some(im)) = (parts.next(), parts.next()) else {
        return Err("expected \"real,imaginary\"".into());
    };
    Ok(Complex::new(parse(re)?, parse(im)?))
}

fn single_token(raw: &str) -> Result<&str, String> {
    let mut tokens = raw.split_whitespace();
    let token = tokens.next().ok_or("nothing to scan")?;
    if tokens.next().is_some() {
        return Err("expected a single token".into());
    }
    Ok(token)
}
