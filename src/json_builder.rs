//! JSON request body assembly.
//!
//! String escaping matches `examples/original_source/src/json_build.c`'s
//! `append_json_string` byte-for-byte (`"`, `\`, `\b`, `\f`, `\n`, `\r`,
//! `\t`, everything else control goes through `\u00XX`). The C source also
//! merges caller-supplied `params_json`/`tooling_json` fragments into the
//! outer object by stripping their surrounding braces and splicing the
//! resulting text — spec.md §9 calls this out as fragile and suggests a
//! safer implementation would parse-and-remerge at the object level
//! instead. This crate takes that safer path: `merge_extra` below parses
//! the request into a `serde_json::Value::Object` and merges the extra
//! fields as object keys, so a caller-supplied fragment can never corrupt
//! the surrounding JSON structure.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Escape a string body (no surrounding quotes) the way the original
/// writer does. `serde_json` already does this internally for normal
/// serialization; this is exposed for callers building raw JSON
/// fragments by hand (e.g. tool schemas) outside of `#[derive(Serialize)]`.
pub fn escape_json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Serialize `request`, then merge `extra`'s keys into the resulting
/// object (extra keys win on conflict — matching the original's
/// append-after-required-fields splice order). Returns the final body
/// bytes.
pub fn serialize_with_extra<T: Serialize>(request: &T, extra: Option<&Map<String, Value>>) -> Result<Vec<u8>, Error> {
    let mut value = serde_json::to_value(request).map_err(|e| Error::json(e.to_string()))?;
    if let Some(extra) = extra {
        let Value::Object(obj) = &mut value else {
            return Err(Error::json("request did not serialize to a JSON object"));
        };
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    serde_json::to_vec(&value).map_err(|e| Error::json(e.to_string()))
}
