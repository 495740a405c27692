//! Response extractor — turns a free-form model reply into exactly one JSON object.
//!
//! Models wrap JSON in prose, markdown fences, or emit several brace spans.
//! Extraction tries a fenced block first, then scans every `{` as a candidate
//! start, tracking depth outside string literals, and returns the first
//! balanced span that parses as an object.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("model returned empty response")]
    EmptyResponse,

    #[error("model did not return valid JSON")]
    NoJsonObject,
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").expect("fence pattern is valid")
    })
}

/// Locates and parses one JSON object in `text`.
pub fn extract_json_object(text: &str) -> Result<JsonObject, ExtractError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    if let Some(object) = fenced_object(text) {
        return Ok(object);
    }

    for (start, ch) in text.char_indices() {
        if ch != '{' {
            continue;
        }
        if let Some(end) = balanced_end(text, start) {
            if let Some(object) = parse_object(&text[start..end]) {
                return Ok(object);
            }
        }
    }

    Err(ExtractError::NoJsonObject)
}

fn fenced_object(text: &str) -> Option<JsonObject> {
    let captures = fence_pattern().captures(text)?;
    parse_object(captures.get(1)?.as_str().trim())
}

fn parse_object(candidate: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Byte offset one past the `}` that closes the `{` at `start`, ignoring
/// braces inside string literals. `None` if the span never closes.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
