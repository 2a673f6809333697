// src/parsing/json_search.rs
//! Depth-first search over untyped JSON with hard bounds on depth and
//! visited nodes, so hostile payloads cannot blow the stack or spin forever.

use serde_json::Value;

pub const MAX_DEPTH: usize = 128;
pub const MAX_NODES: usize = 100_000;

/// First object (pre-order, document order) for which `predicate` holds.
pub fn find_object<'a, P>(root: &'a Value, predicate: P) -> Option<&'a Value>
where
    P: Fn(&serde_json::Map<String, Value>) -> bool,
{
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];
    let mut visited = 0usize;

    while let Some((node, depth)) = stack.pop() {
        visited += 1;
        if visited > MAX_NODES {
            tracing::warn!("JSON search aborted after {} nodes", MAX_NODES);
            return None;
        }

        match node {
            Value::Object(map) => {
                if predicate(map) {
                    return Some(node);
                }
                if depth < MAX_DEPTH {
                    // reversed so children pop in document order
                    stack.extend(map.values().rev().map(|child| (child, depth + 1)));
                }
            }
            Value::Array(items) => {
                if depth < MAX_DEPTH {
                    stack.extend(items.iter().rev().map(|child| (child, depth + 1)));
                }
            }
            _ => {}
        }
    }

    None
}

/// First object whose `key` field is the string `expected`, or an array
/// containing it (JSON-LD allows `"@type": ["JobPosting", ...]`).
pub fn find_by_type<'a>(root: &'a Value, key: &str, expected: &str) -> Option<&'a Value> {
    find_object(root, |map| match map.get(key) {
        Some(Value::String(tag)) => tag == expected,
        Some(Value::Array(tags)) => tags.iter().any(|tag| tag.as_str() == Some(expected)),
        _ => false,
    })
}
