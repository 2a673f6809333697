// src/llm/mod.rs
pub mod prompts;
pub mod provider;

pub use provider::{generator_from_config, ChatCompletionGenerator, DocumentGenerator};

use serde_json::{Map, Value};

/// Best-effort JSON object from model output: the whole text, else the span
/// between the first `{` and the last `}`, else an empty object.
pub fn parse_json_payload(text: &str) -> Map<String, Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str(text.trim()) {
        return map;
    }
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Map::new();
    };
    if end <= start {
        return Map::new();
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// String entries of a JSON array; anything else yields an empty list
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}
