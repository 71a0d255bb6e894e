//! Compose an outgoing document from an entity folder's files
//!
//! The inverse of extraction: each declared file contributes to one JSON
//! document according to its push file entry. Files that are declared but
//! absent on disk are skipped; raw (non-JSON) files contribute only when
//! non-empty. Malformed JSON in a declared file is an error; the
//! document cannot be trusted past that point.

use crate::fsio;
use crate::projection::extract::lookup_path;
use crate::settings::{PushFileSpec, PushStructure};
use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// Build the outgoing document for one entity folder
pub async fn compose_document(dir: &Path, structure: &PushStructure) -> Result<Value> {
    let mut result = Map::new();

    for file in &structure.files {
        let path = fsio::join_slash_path(dir, &file.name);
        if !fsio::exists(&path).await {
            continue;
        }

        if file.name.ends_with(".json") {
            let contents = fsio::read_json(&path).await?;
            apply_json_file(&mut result, file, &contents);
        } else {
            let text = fsio::read_to_string(&path).await?;
            apply_text_file(&mut result, file, &text);
        }
    }

    Ok(Value::Object(result))
}

fn apply_json_file(result: &mut Map<String, Value>, file: &PushFileSpec, contents: &Value) {
    if let Value::Object(source) = contents {
        for key in &file.copy_keys {
            if let Some(value) = source.get(key) {
                result.insert(key.clone(), value.clone());
            }
        }

        for key in &file.spread_to_root {
            if let Some(Value::Object(inner)) = source.get(key) {
                for (k, v) in inner {
                    result.insert(k.clone(), v.clone());
                }
            }
        }
    }

    for (key, value) in &file.add_keys {
        result.insert(key.clone(), value.clone());
    }

    for rule in &file.rearrange_keys {
        let Some(value) = lookup_path(contents, &rule.from) else {
            continue;
        };
        if is_falsy(value) {
            continue;
        }
        set_nested(result, &rule.to, value.clone());
    }

    if file.manual_structure {
        return;
    }

    if file.root {
        if let Some(key) = &file.key {
            if file.nested {
                set_nested(result, key, contents.clone());
            } else {
                result.insert(key.clone(), contents.clone());
            }
        }
    } else if let Value::Object(source) = contents {
        for (key, value) in source {
            result.insert(key.clone(), value.clone());
        }
    }
}

fn apply_text_file(result: &mut Map<String, Value>, file: &PushFileSpec, text: &str) {
    if !file.root || text.is_empty() {
        return;
    }
    let Some(key) = &file.key else {
        return;
    };

    if file.nested {
        set_nested(result, key, Value::String(text.to_string()));
    } else {
        result.insert(key.clone(), Value::String(text.to_string()));
    }
}

/// Assign `value` at a dot path, creating intermediate objects and
/// preserving sibling keys already present along the way
fn set_nested(result: &mut Map<String, Value>, dot_path: &str, value: Value) {
    let mut parts = dot_path.split('.').collect::<Vec<_>>();
    let leaf = parts.pop().expect("split yields at least one part");

    let mut current = result;
    for part in parts {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut().expect("slot was just made an object");
    }
    current.insert(leaf.to_string(), value);
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn structure(files: Value) -> PushStructure {
        serde_json::from_value(json!({ "files": files })).unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn merges_json_and_assigns_root_keys() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.json", r#"{ "_id": "1", "name": "Orders" }"#);
        write(&dir, "fields.json", r#"{ "total": "number" }"#);

        let structure = structure(json!([
            { "name": "config.json" },
            { "name": "fields.json", "root": true, "key": "fields" }
        ]));

        let doc = compose_document(dir.path(), &structure).await.unwrap();
        assert_eq!(
            doc,
            json!({ "_id": "1", "name": "Orders", "fields": { "total": "number" } })
        );
    }

    #[tokio::test]
    async fn declared_but_absent_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.json", r#"{ "_id": "1" }"#);

        let structure = structure(json!([
            { "name": "config.json" },
            { "name": "missing.json", "root": true, "key": "gone" }
        ]));

        let doc = compose_document(dir.path(), &structure).await.unwrap();
        assert_eq!(doc, json!({ "_id": "1" }));
    }

    #[tokio::test]
    async fn raw_files_fill_nested_paths_without_clobbering() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.json", r#"{ "mapping": { "commonModelName": "Orders" } }"#);
        write(&dir, "from.js", "export const from = 1;");
        write(&dir, "empty.js", "");

        let structure = structure(json!([
            { "name": "config.json" },
            { "name": "from.js", "root": true, "key": "mapping.fromCommonModel", "nested": true },
            { "name": "empty.js", "root": true, "key": "mapping.toCommonModel", "nested": true }
        ]));

        let doc = compose_document(dir.path(), &structure).await.unwrap();
        assert_eq!(
            doc,
            json!({
                "mapping": {
                    "commonModelName": "Orders",
                    "fromCommonModel": "export const from = 1;"
                }
            })
        );
    }

    #[tokio::test]
    async fn manual_structure_contributes_only_via_operators() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "oauth.json",
            r#"{
                "_id": "o1",
                "connectionPlatform": "shopify",
                "scopes": "read_orders",
                "frontend": { "separator": " " },
                "iosRedirectUri": "app://done",
                "secret": "should-not-merge"
            }"#,
        );

        let structure = structure(json!([
            {
                "name": "oauth.json",
                "manualStructure": true,
                "copyKeys": ["_id", "connectionPlatform", "scopes", "frontend"],
                "rearrangeKeys": [
                    { "from": "iosRedirectUri", "to": "frontend.iosRedirectUri" }
                ],
                "addKeys": { "isOauth": true }
            }
        ]));

        let doc = compose_document(dir.path(), &structure).await.unwrap();
        assert_eq!(
            doc,
            json!({
                "_id": "o1",
                "connectionPlatform": "shopify",
                "scopes": "read_orders",
                "frontend": { "separator": " ", "iosRedirectUri": "app://done" },
                "isOauth": true
            })
        );
        assert!(doc.get("secret").is_none());
    }

    #[tokio::test]
    async fn spread_to_root_merges_object_valued_keys() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "public.json",
            r#"{ "details": { "status": "live", "type": "api" }, "other": 1 }"#,
        );

        let structure = structure(json!([
            {
                "name": "public.json",
                "manualStructure": true,
                "spreadToRoot": ["details"]
            }
        ]));

        let doc = compose_document(dir.path(), &structure).await.unwrap();
        assert_eq!(doc, json!({ "status": "live", "type": "api" }));
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.json", "{ not json");

        let structure = structure(json!([{ "name": "config.json" }]));
        assert!(compose_document(dir.path(), &structure).await.is_err());
    }
}
