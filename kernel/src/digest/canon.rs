//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! Every digest in the workspace (orders, graphs, run reports) is taken over
//! bytes produced here.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (byte order).
//! 2. No whitespace between tokens.
//! 3. Strings are escaped by `serde_json` (RFC 8259 §7).
//! 4. Numbers must be integers (`i64` or `u64`). Floats, NaN and Infinity are
//!    rejected; callers render scores as fixed-precision strings instead.
//! 5. Array order is preserved.

use crate::error::KernelError;

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`KernelError::NonIntegerNumber`] if any JSON number is not
/// representable as `i64` or `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, KernelError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), KernelError> {
    use serde_json::Value;
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => write_scalar(buf, value),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                write_scalar(buf, value);
            } else {
                return Err(KernelError::NonIntegerNumber { raw: n.to_string() });
            }
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            buf.push(b'{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_scalar(buf, &Value::String(k.clone()));
                buf.push(b':');
                write_value(buf, v)?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

/// Scalars go through `serde_json`'s compact writer, which cannot fail on a
/// `Vec<u8>` sink.
fn write_scalar(buf: &mut Vec<u8>, value: &serde_json::Value) {
    let _ = serde_json::to_writer(&mut *buf, value);
}
