//! Reassemble flat dot-notation keys into nested containers
//!
//! The numeric-segment heuristic here is a compatibility contract: remote
//! documents depend on the exact shapes it produces, so it is replicated
//! as-is rather than tidied up. In short: a segment that parses as a
//! number produces an array container at that level; a single-segment
//! non-numeric top-level key passes through untouched; assignments that
//! JSON cannot represent (a non-numeric property on an array) are dropped.

use serde_json::{Map, Value};

/// True for anything `Number(str)` would accept, including the empty
/// string and padded whitespace
fn is_number(part: &str) -> bool {
    let trimmed = part.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok()
}

/// Containers replace "empty" scalar slots when a deeper path needs them
fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn new_container(part: &str) -> Value {
    if is_number(part) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Transform a flat object whose keys may be dot paths (`"a.b.0"`) into a
/// properly nested structure. Idempotent on already-nested input: keys
/// without dots pass through unchanged, and values are never recursed
/// into.
pub fn nest_by_dot_notation(data: &Value) -> Value {
    let entries: Vec<(String, Value)> = match data {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        other => return other.clone(),
    };

    let mut response = if data.is_array() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    };

    'entries: for (key, value) in entries {
        let parts: Vec<&str> = key.split('.').collect();

        if parts.len() == 1 && !is_number(parts[0]) {
            insert_entry(&mut response, parts[0], value);
            continue;
        }

        let mut current = &mut response;
        for part in &parts[..parts.len() - 1] {
            match descend(current, part) {
                Some(next) => current = next,
                // not representable in JSON; the whole entry vanishes
                None => continue 'entries,
            }
        }
        insert_entry(current, parts[parts.len() - 1], value);
    }

    response
}

/// Get or create the container stored at `part`, choosing the container
/// kind from `part` itself
fn descend<'a>(container: &'a mut Value, part: &str) -> Option<&'a mut Value> {
    match container {
        Value::Object(map) => {
            let slot = map
                .entry(part.to_string())
                .or_insert_with(|| new_container(part));
            if is_vacant(slot) && !slot.is_object() && !slot.is_array() {
                *slot = new_container(part);
            }
            Some(slot)
        }
        Value::Array(items) => {
            let index: usize = part.parse().ok()?;
            while items.len() <= index {
                items.push(Value::Null);
            }
            let slot = &mut items[index];
            if is_vacant(slot) && !slot.is_object() && !slot.is_array() {
                *slot = new_container(part);
            }
            Some(slot)
        }
        _ => None,
    }
}

fn insert_entry(container: &mut Value, key: &str, value: Value) {
    match container {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
        }
        Value::Array(items) => {
            if let Ok(index) = key.parse::<usize>() {
                while items.len() <= index {
                    items.push(Value::Null);
                }
                items[index] = value;
            }
            // non-numeric properties on arrays have no JSON form; dropped
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dot_keys_nest_into_objects() {
        let flat = json!({ "a.b": 1, "a.c": 2, "top": "x" });
        assert_eq!(
            nest_by_dot_notation(&flat),
            json!({ "a": { "b": 1, "c": 2 }, "top": "x" })
        );
    }

    #[test]
    fn numeric_segments_build_arrays() {
        let flat = json!({ "0.0": "a", "0.1": "b", "1.0": "c" });
        assert_eq!(
            nest_by_dot_notation(&flat),
            json!({ "0": ["a", "b"], "1": ["c"] })
        );
    }

    #[test]
    fn array_input_stays_an_array() {
        let input = json!([{ "x": 1 }, "two"]);
        assert_eq!(nest_by_dot_notation(&input), input);
    }

    #[test]
    fn numeric_leaf_under_object_parent_stays_a_key() {
        // the container kind comes from the segment that creates it, so a
        // non-numeric parent yields an object even for numeric leaves
        let flat = json!({ "a.2": "x" });
        assert_eq!(nest_by_dot_notation(&flat), json!({ "a": { "2": "x" } }));
    }

    #[test]
    fn sparse_array_indexes_pad_with_null() {
        let flat = json!({ "0.2": "x" });
        assert_eq!(nest_by_dot_notation(&flat), json!({ "0": [null, null, "x"] }));
    }

    #[test]
    fn single_segment_numeric_key_is_kept_on_objects() {
        let flat = json!({ "5": "five", "name": "n" });
        assert_eq!(nest_by_dot_notation(&flat), json!({ "5": "five", "name": "n" }));
    }

    #[test]
    fn idempotent_on_nested_input() {
        let flat = json!({ "a.b": 1, "tags.0": "x", "tags.1": "y" });
        let once = nest_by_dot_notation(&flat);
        let twice = nest_by_dot_notation(&once);
        assert_eq!(once, json!({ "a": { "b": 1 }, "tags": { "0": "x", "1": "y" } }));
        assert_eq!(once, twice);
    }

    #[test]
    fn mixed_array_and_object_nesting() {
        let flat = json!({
            "mapping.commonModelName": "Orders",
            "0.0": "id",
            "0.1": "total"
        });
        assert_eq!(
            nest_by_dot_notation(&flat),
            json!({
                "mapping": { "commonModelName": "Orders" },
                "0": ["id", "total"]
            })
        );
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(nest_by_dot_notation(&json!("text")), json!("text"));
        assert_eq!(nest_by_dot_notation(&json!(3)), json!(3));
    }
}
