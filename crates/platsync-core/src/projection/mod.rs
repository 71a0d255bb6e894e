//! Document projector: bidirectional mapping between remote JSON
//! documents and entity-folder files
//!
//! Extraction slices a remote document into local files by declarative
//! rule; composition reassembles local files into an outgoing document.
//! The two directions share the dot-path conventions, so a pull followed
//! by a push reproduces the document on every covered key path.

pub mod compose;
pub mod extract;
pub mod nest;

pub use compose::compose_document;
pub use extract::{extract_properties, lookup_path, move_key_to_root};
pub use nest::nest_by_dot_notation;

use crate::fsio;
use crate::settings::ExtractionRule;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Project a remote document into an entity folder, one file per rule.
/// Existing rule targets are replaced; parent directories are created as
/// needed. Object content passes through the nest pass and serializes
/// with 4-space indentation; scalar content is written raw.
pub async fn write_entity_files(
    dir: &Path,
    document: &Value,
    rules: &[ExtractionRule],
) -> Result<()> {
    fsio::create_dir_all(dir).await?;

    for rule in rules {
        let file_path = fsio::join_slash_path(dir, &rule.path);
        fsio::remove(&file_path).await?;
        if let Some(parent) = file_path.parent() {
            fsio::create_dir_all(parent).await?;
        }

        let properties = extract_properties(document, &rule.keys);

        let mut data = if rule.root && rule.keys.len() == 1 {
            properties
                .into_iter()
                .next()
                .map(|(_, value)| value)
                .unwrap_or_else(|| Value::String(String::new()))
        } else {
            Value::Object(properties)
        };

        for step in &rule.move_to_root {
            data = move_key_to_root(data, &step.key, step.spread, step.destination.as_deref());
        }

        match data {
            Value::String(text) => fsio::write_string(&file_path, &text).await?,
            Value::Object(_) | Value::Array(_) => {
                fsio::write_json(&file_path, &nest_by_dot_notation(&data)).await?
            }
            other => fsio::write_string(&file_path, &other.to_string()).await?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PushStructure;
    use serde_json::json;
    use tempfile::TempDir;

    fn rules(value: Value) -> Vec<ExtractionRule> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn root_rule_writes_the_raw_value() {
        let dir = TempDir::new().unwrap();
        let doc = json!({ "a": { "b": 1 }, "c": 2 });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([{ "path": "value.txt", "keys": ["a.b"], "root": true }])),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(dir.path().join("value.txt")).unwrap();
        assert_eq!(content, "1");
    }

    #[tokio::test]
    async fn missing_root_value_writes_an_empty_file() {
        let dir = TempDir::new().unwrap();
        let doc = json!({ "c": 2 });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([{ "path": "value.txt", "keys": ["a.b"], "root": true }])),
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("value.txt")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn dotted_keys_nest_in_the_written_file() {
        let dir = TempDir::new().unwrap();
        let doc = json!({
            "_id": "m1",
            "mapping": { "commonModelName": "Orders", "other": true }
        });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([{
                "path": "config.json",
                "keys": ["_id", "mapping.commonModelName"]
            }])),
        )
        .await
        .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("config.json")).unwrap())
                .unwrap();
        assert_eq!(
            written,
            json!({ "_id": "m1", "mapping": { "commonModelName": "Orders" } })
        );
    }

    #[tokio::test]
    async fn subdirectory_targets_get_their_parents() {
        let dir = TempDir::new().unwrap();
        let doc = json!({ "mapping": { "fromCommonModel": "code();" } });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([{
                "path": "schema/fromCommonModel.js",
                "keys": ["mapping.fromCommonModel"],
                "root": true
            }])),
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("schema/fromCommonModel.js")).unwrap(),
            "code();"
        );
    }

    #[tokio::test]
    async fn move_to_root_steps_apply_in_order() {
        let dir = TempDir::new().unwrap();
        let doc = json!({
            "oauth": {
                "frontend": { "iosRedirectUri": "app://done", "separator": " " }
            }
        });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([{
                "path": "oauth.json",
                "keys": ["oauth.frontend"],
                "root": true,
                "moveToRoot": [{ "key": "iosRedirectUri", "spread": false }]
            }])),
        )
        .await
        .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("oauth.json")).unwrap())
                .unwrap();
        assert_eq!(
            written,
            json!({ "separator": " ", "iosRedirectUri": "app://done" })
        );
    }

    #[tokio::test]
    async fn extraction_then_composition_round_trips_covered_keys() {
        let dir = TempDir::new().unwrap();
        let doc = json!({
            "_id": "m1",
            "name": "Orders",
            "fields": { "total": "number" },
            "ignored": "not covered"
        });

        write_entity_files(
            dir.path(),
            &doc,
            &rules(json!([
                { "path": "config.json", "keys": ["_id", "name"] },
                { "path": "fields.json", "keys": ["fields"], "root": true }
            ])),
        )
        .await
        .unwrap();

        let push: PushStructure = serde_json::from_value(json!({
            "files": [
                { "name": "config.json" },
                { "name": "fields.json", "root": true, "key": "fields" }
            ]
        }))
        .unwrap();

        let composed = compose_document(dir.path(), &push).await.unwrap();
        assert_eq!(
            composed,
            json!({
                "_id": "m1",
                "name": "Orders",
                "fields": { "total": "number" }
            })
        );
    }
}
