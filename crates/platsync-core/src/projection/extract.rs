//! Slicing remote documents by dot-notation key paths

use serde_json::{Map, Value};

/// Look up a dot-notation path inside a document. Array segments accept
/// numeric indexes. Returns `None` as soon as any segment is missing.
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => {
                let index: usize = part.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Extract the requested key paths from a document. Keys whose path is
/// not fully present are omitted; a null or non-object document yields an
/// empty result rather than an error. Each key is looked up independently.
pub fn extract_properties(data: &Value, keys: &[String]) -> Map<String, Value> {
    let mut result = Map::new();

    if data.is_null() {
        return result;
    }

    for key in keys {
        if let Some(value) = lookup_path(data, key) {
            result.insert(key.clone(), value.clone());
        }
    }

    result
}

/// Delete the value at `key_path` from its parent and reattach it at the
/// top level: spread its own keys when `spread` is set, otherwise assign
/// it under `destination` (or the path's leaf key). A path that does not
/// resolve leaves the document unchanged.
pub fn move_key_to_root(
    mut data: Value,
    key_path: &str,
    spread: bool,
    destination: Option<&str>,
) -> Value {
    let parts: Vec<&str> = key_path.split('.').collect();
    let Some(moved) = remove_at_path(&mut data, &parts) else {
        return data;
    };
    let leaf = parts.last().expect("split yields at least one part");

    if spread {
        if let (Value::Object(root), Value::Object(inner)) = (&mut data, &moved) {
            for (key, value) in inner {
                root.insert(key.clone(), value.clone());
            }
        }
    } else if let Value::Object(root) = &mut data {
        let key = destination.unwrap_or(leaf);
        root.insert(key.to_string(), moved);
    }

    data
}

fn remove_at_path(data: &mut Value, parts: &[&str]) -> Option<Value> {
    let (leaf, parents) = parts.split_last()?;
    let mut current = data;
    for part in parents {
        current = current.as_object_mut()?.get_mut(*part)?;
    }
    current.as_object_mut()?.remove(*leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_found_paths_and_omits_missing_ones() {
        let doc = json!({
            "a": { "b": 1 },
            "c": 2,
            "list": ["x", "y"]
        });

        let result = extract_properties(&doc, &keys(&["a.b", "c", "a.missing", "list.1"]));
        assert_eq!(result.get("a.b"), Some(&json!(1)));
        assert_eq!(result.get("c"), Some(&json!(2)));
        assert_eq!(result.get("list.1"), Some(&json!("y")));
        assert!(!result.contains_key("a.missing"));
    }

    #[test]
    fn null_document_extracts_nothing() {
        let result = extract_properties(&Value::Null, &keys(&["a", "b.c"]));
        assert!(result.is_empty());
    }

    #[test]
    fn move_to_root_spread_flattens_and_removes() {
        let doc = json!({ "meta": { "tags": { "x": 1 } }, "id": 5 });
        let moved = move_key_to_root(doc, "meta.tags", true, None);
        assert_eq!(moved, json!({ "meta": {}, "id": 5, "x": 1 }));
        assert!(lookup_path(&moved, "meta.tags").is_none());
    }

    #[test]
    fn move_to_root_assigns_under_leaf_or_destination() {
        let doc = json!({ "frontend": { "iosRedirectUri": "u" }, "_id": "1" });
        let moved = move_key_to_root(doc.clone(), "frontend.iosRedirectUri", false, None);
        assert_eq!(
            moved,
            json!({ "frontend": {}, "_id": "1", "iosRedirectUri": "u" })
        );

        let moved = move_key_to_root(doc, "frontend.iosRedirectUri", false, Some("redirect"));
        assert_eq!(
            moved,
            json!({ "frontend": {}, "_id": "1", "redirect": "u" })
        );
    }

    #[test]
    fn move_to_root_with_missing_path_is_a_no_op() {
        let doc = json!({ "id": 5 });
        assert_eq!(move_key_to_root(doc.clone(), "meta.tags", true, None), doc);
    }
}
