use serde_json::Value;
use std::collections::VecDeque;

/// Keys probed before any other key of an object, in this order.
pub(crate) const PREFERRED_KEYS: [&str; 4] = ["data", "text", "result", "translation"];

/// Upper bound on the number of containers visited while searching.
const MAX_VISITED_CONTAINERS: usize = 10_000;

/// Find the first usable translated string in a decoded response body.
///
/// The search is breadth-first. Each object offers its preferred keys first,
/// then its remaining entries in document order; arrays are scanned in order.
/// A non-blank string is returned trimmed as soon as it is seen, while nested
/// objects and arrays are queued for later levels.
pub fn extract_translation(payload: &Value) -> Option<String> {
    let mut queue: VecDeque<&Value> = VecDeque::from([payload]);
    let mut visited = 0usize;

    while let Some(current) = queue.pop_front() {
        visited += 1;
        if visited > MAX_VISITED_CONTAINERS {
            return None;
        }

        match current {
            Value::String(text) => {
                if let Some(found) = non_blank(text) {
                    return Some(found);
                }
            }
            Value::Object(map) => {
                for key in PREFERRED_KEYS {
                    if let Some(value) = map.get(key)
                        && let Some(found) = inspect(value, &mut queue)
                    {
                        return Some(found);
                    }
                }
                // Preferred entries were already inspected above.
                for (key, value) in map {
                    if PREFERRED_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    if let Some(found) = inspect(value, &mut queue) {
                        return Some(found);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let Some(found) = inspect(item, &mut queue) {
                        return Some(found);
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    None
}

fn inspect<'a>(value: &'a Value, queue: &mut VecDeque<&'a Value>) -> Option<String> {
    match value {
        Value::String(text) => non_blank(text),
        Value::Object(_) | Value::Array(_) => {
            queue.push_back(value);
            None
        }
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
