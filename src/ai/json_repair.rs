//! JSON Extraction for Model Output
//!
//! Text models wrap JSON in prose, code fences, or cut it off mid-array.
//! This module recovers a `serde_json::Value` from that output:
//! - Markdown code fence wrapping (```json ... ```)
//! - Trailing commas
//! - Missing closing braces/brackets and truncated strings
//! - JSON embedded in explanatory text

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{EngineError, ErrorCategory, LlmError, Result};

/// Extract and parse JSON from a model response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new().parse_or_repair(content).map(|(value, _)| value)
}

/// Extract a JSON array, unwrapping `{"<key>": [...]}` envelopes
///
/// Models asked for an array sometimes answer with an object holding one.
pub fn extract_json_array(content: &str) -> Result<Vec<Value>> {
    match extract_json_from_response(content)? {
        Value::Array(items) => Ok(items),
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| parse_error("Expected a JSON array in model output")),
        other => Err(parse_error(format!(
            "Expected a JSON array, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_error(message: impl Into<String>) -> EngineError {
    EngineError::Llm(LlmError::new(ErrorCategory::ParseError, message))
}

/// Lexical state while walking JSON text
#[derive(Default)]
struct Scan {
    in_string: bool,
    escape: bool,
}

impl Scan {
    /// Feed one char; returns true when the char is structural (outside a string)
    fn step(&mut self, ch: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escape = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ => !self.in_string,
        }
    }
}

/// Progressive JSON repair
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 2,
        }
    }

    /// Parse JSON, attempting repair if the first parse fails
    ///
    /// Returns (Value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Initial JSON parse failed, attempting repair");

        // Prose around the payload is the most common failure
        if let Some(embedded) = extract_embedded(&cleaned)
            && let Ok(value) = serde_json::from_str::<Value>(&embedded)
        {
            warn!("JSON extracted from mixed content");
            return Ok((value, true));
        }

        let start = cleaned.find(['{', '[']).unwrap_or(0);
        let candidate = &cleaned[start..];

        for level in 1..=self.max_repair_attempts {
            let repaired = repair(candidate, level);
            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                warn!(level, "JSON repaired");
                return Ok((value, true));
            }
        }

        Err(parse_error(format!(
            "Failed to parse or repair JSON. Content preview: {}...",
            cleaned.chars().take(200).collect::<String>()
        )))
    }
}

fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}');
    let s = match s.strip_prefix("```") {
        Some(rest) => rest.split_once('\n').map(|(_, body)| body).unwrap_or(""),
        None => s,
    };
    let s = s.trim_end();
    s.strip_suffix("```").unwrap_or(s).trim().to_string()
}

fn repair(s: &str, level: usize) -> String {
    let mut result = remove_trailing_commas(s);
    if level >= 2 {
        result = result
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect();
    }
    close_open_structures(&result)
}

/// Drop commas directly followed by `]` or `}`
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut scan = Scan::default();

    for (i, &ch) in chars.iter().enumerate() {
        let structural = scan.step(ch);
        if structural && ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        result.push(ch);
    }

    result
}

/// Close an unterminated string and any open arrays/objects, innermost first
fn close_open_structures(s: &str) -> String {
    let mut stack = Vec::new();
    let mut scan = Scan::default();

    for ch in s.chars() {
        if !scan.step(ch) {
            continue;
        }
        match ch {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut result = s.trim_end().to_string();
    if scan.in_string {
        result.push('"');
    }
    let trimmed = result.trim_end_matches([',', ' ', '\n', '\r', '\t']).len();
    result.truncate(trimmed);
    result.extend(stack.into_iter().rev());
    result
}

/// First balanced `{...}` or `[...]` in `s`
fn extract_embedded(s: &str) -> Option<String> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut scan = Scan::default();

    for (i, ch) in s[start..].char_indices() {
        if !scan.step(ch) {
            continue;
        }
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
