//! Canonical JSON encoding used for block fingerprints.
//!
//! Keys are sorted at every nesting level and the output uses the separators,
//! ASCII escaping and float formatting of Python's
//! `json.dumps(obj, sort_keys=True)`, so that digests of exported ledgers can
//! be reproduced byte for byte.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use std::io;

use crate::error::Result;

/// `serde_json` formatter producing Python-compatible JSON bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    // Fragments never contain quotes, backslashes or control characters;
    // those arrive through `write_char_escape`.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(|b| (b' '..=b'~').contains(&b)) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                let mut buf = [0u8; 4];
                writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
            } else {
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Format a finite float the way Python's `repr(float)` does: shortest
/// round-trip digits, fixed notation for decimal exponents in `[-4, 16)`,
/// scientific notation with a signed two-digit exponent otherwise.
pub fn python_float_repr(value: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. "-1.57961e3".
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        if point <= 0 {
            format!("{}0.{}{}", sign, "0".repeat((-point) as usize), digits)
        } else if point as usize >= digits.len() {
            format!(
                "{}{}{}.0",
                sign,
                digits,
                "0".repeat(point as usize - digits.len())
            )
        } else {
            let (int_part, frac_part) = digits.split_at(point as usize);
            format!("{}{}.{}", sign, int_part, frac_part)
        }
    } else {
        let mantissa = if digits.len() == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs())
    }
}

/// Rebuild a JSON value with object keys sorted at every level.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key.clone(), sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Canonical bytes of a JSON value: sorted keys, Python separators and escaping.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    let sorted = sort_keys(value);
    let mut out = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut out, PythonFormatter);
    sorted.serialize(&mut serializer)?;
    Ok(out)
}

/// Canonical encoding as a `String`.
pub fn canonical_string(value: &Value) -> Result<String> {
    let bytes = canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| crate::error::LedgerError::EncodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_keys_and_separators() {
        let value = json!({"b": 2, "a": 1, "c": "hello"});
        assert_eq!(
            canonical_string(&value).unwrap(),
            r#"{"a": 1, "b": 2, "c": "hello"}"#
        );
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let value = json!({"outer": {"z": 1, "a": [3, 2, 1]}, "inner": {}});
        assert_eq!(
            canonical_string(&value).unwrap(),
            r#"{"inner": {}, "outer": {"a": [3, 2, 1], "z": 1}}"#
        );
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let mut first = Map::new();
        first.insert("Month".into(), json!(1));
        first.insert("Payment".into(), json!(1579.61));
        let mut second = Map::new();
        second.insert("Payment".into(), json!(1579.61));
        second.insert("Month".into(), json!(1));

        assert_ne!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(
            canonical_bytes(&Value::Object(first)).unwrap(),
            canonical_bytes(&Value::Object(second)).unwrap()
        );
    }

    #[test]
    fn test_python_float_repr() {
        assert_eq!(python_float_repr(1579.61), "1579.61");
        assert_eq!(python_float_repr(250000.0), "250000.0");
        assert_eq!(python_float_repr(0.0), "0.0");
        assert_eq!(python_float_repr(-0.0), "-0.0");
        assert_eq!(python_float_repr(0.5), "0.5");
        assert_eq!(python_float_repr(0.0001), "0.0001");
        assert_eq!(python_float_repr(0.00001), "1e-05");
        assert_eq!(python_float_repr(1.5e-7), "1.5e-07");
        assert_eq!(python_float_repr(1e16), "1e+16");
        assert_eq!(python_float_repr(1234567890123456.0), "1234567890123456.0");
        assert_eq!(python_float_repr(-445.28), "-445.28");
        assert_eq!(python_float_repr(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let value = json!({"info": "Prêt €", "emoji": "😀"});
        assert_eq!(
            canonical_string(&value).unwrap(),
            r#"{"emoji": "\ud83d\ude00", "info": "Pr\u00eat \u20ac"}"#
        );
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let value = json!({"note": "a\"b\\c\nd\u{1}e\u{7f}"});
        assert_eq!(
            canonical_string(&value).unwrap(),
            r#"{"note": "a\"b\\c\nd\u0001e\u007f"}"#
        );
    }
}
