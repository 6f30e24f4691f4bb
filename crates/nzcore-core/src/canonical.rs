//! Canonical JSON encoding (RFC 8785 / JCS) for deterministic serialization.
//!
//! Rules:
//! - Object keys: sorted by UTF-16 code units
//! - No insignificant whitespace
//! - Numbers: shortest ECMAScript form
//! - Strings: minimal required escapes, lowercase `\u00xx` for control chars
//!
//! **CRITICAL**: This encoding is FROZEN. Changes break all existing
//! signatures and document ids.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::Write;

use crate::bytes::ct_str_eq;
use crate::document::{Document, SIGNATURE_FIELD};
use crate::error::{Error, Result};

/// Serialize a JSON value to its canonical form.
pub fn to_canonical_json(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Assert that `text` already is the canonical form of the value it parses
/// to. The parsed value is re-serialized and compared byte-for-byte in
/// constant time; any difference is `NonCanonicalJson`.
pub fn assert_canonical(text: &str) -> Result<()> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::NonCanonicalJson(format!("parse: {e}")))?;
    let reserialized = to_canonical_json(&value)?;
    if !ct_str_eq(text, &reserialized) {
        return Err(Error::NonCanonicalJson(
            "input differs from its canonical form".into(),
        ));
    }
    Ok(())
}

/// Canonical serialization of a document with its `signature` field removed.
/// These are the bytes that get signed and verified.
pub fn prepare_for_signing(doc: &Document) -> Result<String> {
    let mut value = serde_json::to_value(doc)
        .map_err(|e| Error::NonCanonicalJson(format!("serialize: {e}")))?;
    match value.as_object_mut() {
        Some(map) => {
            map.remove(SIGNATURE_FIELD);
        }
        None => return Err(Error::NonCanonicalJson("document is not an object".into())),
    }
    to_canonical_json(&value)
}

/// Constant-time equality of two values' canonical forms.
pub fn canonical_equal(a: &Value, b: &Value) -> Result<bool> {
    let ca = to_canonical_json(a)?;
    let cb = to_canonical_json(b)?;
    Ok(ct_str_eq(&ca, &cb))
}

fn write_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| utf16_cmp(a, b));
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[key.as_str()])?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Key ordering is over UTF-16 code units, not Unicode scalar values: a
/// supplementary-plane character sorts by its surrogate pair.
fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn write_number(out: &mut String, n: &serde_json::Number) -> Result<()> {
    if let Some(u) = n.as_u64() {
        write!(out, "{u}").expect("write to string");
        return Ok(());
    }
    if let Some(i) = n.as_i64() {
        write!(out, "{i}").expect("write to string");
        return Ok(());
    }
    let f = n
        .as_f64()
        .ok_or_else(|| Error::NonCanonicalJson(format!("unrepresentable number: {n}")))?;
    if !f.is_finite() {
        return Err(Error::NonCanonicalJson("non-finite number".into()));
    }
    out.push_str(&format_ecmascript(f));
    Ok(())
}

/// Shortest ECMAScript number form: plain decimal in the range where
/// `Number.prototype.toString` stays decimal, exponent notation with an
/// explicit sign outside it.
fn format_ecmascript(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let mut s = format!("{f:e}");
        if let Some(pos) = s.find('e') {
            if !s[pos + 1..].starts_with('-') {
                s.insert(pos + 1, '+');
            }
        }
        s
    } else if f == f.trunc() && abs < 9_007_199_254_740_992.0 {
        // Exact integer below 2^53 prints without fraction or exponent.
        // Past that bound the cast saturates, so larger integer-valued
        // floats go through the general path instead.
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{000c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                write!(out, "\\u{:04x}", c as u32).expect("write to string");
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
