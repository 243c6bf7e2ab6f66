//! Integer, BIT and floating-point coercions.
//!
//! Coercions never truncate: a fractional value for an integer column or an
//! out-of-range integer is an error, not a rounded number.

use crate::error::ValueError;
use crate::value::Value;

/// Coerce to an integer without losing information.
fn integral(value: &Value, target: &str) -> Result<i64, ValueError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(f) => float_to_i64(*f, target),
        Value::Text(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Ok(i);
            }
            match t.parse::<f64>() {
                Ok(f) => float_to_i64(f, target),
                Err(_) => Err(ValueError::coercion(format!(
                    "cannot convert text {:?} to {}",
                    s, target
                ))),
            }
        }
        other => Err(ValueError::coercion(format!(
            "cannot convert {} value to {}",
            other.kind(),
            target
        ))),
    }
}

fn float_to_i64(f: f64, target: &str) -> Result<i64, ValueError> {
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !f.is_finite() || f.fract() != 0.0 || !(-LIMIT..LIMIT).contains(&f) {
        return Err(ValueError::coercion(format!(
            "cannot safely convert {} to {}",
            f, target
        )));
    }
    Ok(f as i64)
}

fn narrow<T: TryFrom<i64>>(value: &Value, target: &str) -> Result<T, ValueError> {
    let i = integral(value, target)?;
    T::try_from(i).map_err(|_| ValueError::coercion(format!("{} is out of range for {}", i, target)))
}

pub(super) fn tinyint(value: &Value) -> Result<u8, ValueError> {
    narrow(value, "TINYINT")
}

pub(super) fn smallint(value: &Value) -> Result<i16, ValueError> {
    narrow(value, "SMALLINT")
}

pub(super) fn int(value: &Value) -> Result<i32, ValueError> {
    narrow(value, "INT")
}

pub(super) fn bigint(value: &Value) -> Result<i64, ValueError> {
    integral(value, "BIGINT")
}

/// Truthiness: any non-zero number is 1.
pub(super) fn bit(value: &Value) -> Result<u8, ValueError> {
    let b = match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) if !f.is_nan() => *f != 0.0,
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" => true,
            "0" | "false" | "f" | "no" | "n" => false,
            _ => {
                return Err(ValueError::coercion(format!(
                    "cannot convert text {:?} to BIT",
                    s
                )));
            }
        },
        other => {
            return Err(ValueError::coercion(format!(
                "cannot convert {} value to BIT",
                other.kind()
            )));
        }
    };
    Ok(u8::from(b))
}

pub(super) fn float(value: &Value) -> Result<f64, ValueError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(f64::from(u8::from(*b))),
        Value::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            ValueError::coercion(format!("cannot convert text {:?} to a floating-point number", s))
        }),
        other => Err(ValueError::coercion(format!(
            "cannot convert {} value to a floating-point number",
            other.kind()
        ))),
    }
}

/// REAL is stored as single precision; finite doubles beyond `f32` range are rejected.
pub(super) fn real(value: &Value) -> Result<f32, ValueError> {
    let f = float(value)?;
    let r = f as f32;
    if f.is_finite() && r.is_infinite() {
        return Err(ValueError::coercion(format!("{} is out of range for REAL", f)));
    }
    Ok(r)
}
