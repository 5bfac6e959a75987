//! Single-field decoding for the positional string encoding.
//!
//! The encoding is chosen by sniffing the first character:
//! `T`/`F` booleans, `[a|b|c]` lists, `{<base64 json>}` nested values,
//! and decimal integers for everything else. An empty field is absent.

use crate::error::{RefdocError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

pub fn decode_scalar(part: &str) -> Result<Option<Value>> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(None);
    }

    match part {
        "T" => return Ok(Some(Value::Bool(true))),
        "F" => return Ok(Some(Value::Bool(false))),
        _ => {}
    }

    if let Some(body) = part.strip_prefix('[') {
        let body = body.strip_suffix(']').unwrap_or(body);
        let mut items = Vec::new();
        for item in body.split('|') {
            if let Some(value) = decode_scalar(item)? {
                items.push(value);
            }
        }
        return Ok(Some(Value::Array(items)));
    }

    if let Some(body) = part.strip_prefix('{') {
        let body = body.strip_suffix('}').unwrap_or(body);
        let bytes = STANDARD.decode(body)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        return Ok(Some(value));
    }

    part.parse::<i64>()
        .map(|n| Some(Value::from(n)))
        .map_err(|_| RefdocError::Decode(format!("unrecognized field encoding: {:?}", part)))
}
