//! Lenient JSON normalisation for hand-written manifests
//!
//! Manifests in the wild carry a UTF-8 BOM, comments and trailing commas,
//! and spell keys in any case. `standardize` rewrites the text into strict
//! JSON; `decode` then lowercases top-level keys before deserializing.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Strip a BOM, comments and trailing commas outside string literals
pub fn standardize(raw: &str) -> String {
    let src = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            '}' | ']' => {
                strip_trailing_comma(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn strip_trailing_comma(out: &mut String) {
    let end = out.trim_end().len();
    if out[..end].ends_with(',') {
        out.truncate(end - 1);
    }
}

/// Lowercase the keys of a top-level object; nested objects are untouched
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Decode lenient JSON text into `T`
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(&standardize(raw))?;
    serde_json::from_value(lowercase_keys(value))
}
