//! Entity-folder helpers: identifier reads and config backfills
//!
//! An entity folder's `config.json` carries the remote `_id` once the
//! entity has been synced; a folder without one has never been created
//! remotely.

use crate::fsio;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

pub fn config_path(entity_dir: &Path) -> PathBuf {
    entity_dir.join(CONFIG_FILE)
}

/// Remote identifier from an entity folder, when present
pub async fn read_config_id(entity_dir: &Path) -> Result<Option<String>> {
    read_id_from(&config_path(entity_dir)).await
}

/// Remote identifier from an arbitrary JSON file, when present
pub async fn read_id_from(path: &Path) -> Result<Option<String>> {
    if !fsio::exists(path).await {
        return Ok(None);
    }
    let document = fsio::read_json(path).await?;
    Ok(document
        .get("_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string))
}

/// Set top-level keys in a JSON file, preserving everything else. Used to
/// backfill assigned identifiers after a create.
pub async fn update_json_file(path: &Path, updates: &[(&str, Value)]) -> Result<()> {
    let mut document = fsio::read_json(path).await?;
    if let Value::Object(map) = &mut document {
        for (key, value) in updates {
            map.insert(key.to_string(), value.clone());
        }
    }
    fsio::write_json(path, &document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn id_reads_tolerate_absence_and_emptiness() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_config_id(dir.path()).await.unwrap(), None);

        std::fs::write(config_path(dir.path()), r#"{ "name": "Orders" }"#).unwrap();
        assert_eq!(read_config_id(dir.path()).await.unwrap(), None);

        std::fs::write(config_path(dir.path()), r#"{ "_id": "" }"#).unwrap();
        assert_eq!(read_config_id(dir.path()).await.unwrap(), None);

        std::fs::write(config_path(dir.path()), r#"{ "_id": "abc123" }"#).unwrap();
        assert_eq!(
            read_config_id(dir.path()).await.unwrap(),
            Some("abc123".to_string())
        );
    }

    #[tokio::test]
    async fn backfill_preserves_existing_keys() {
        let dir = TempDir::new().unwrap();
        let path = config_path(dir.path());
        std::fs::write(&path, r#"{ "name": "Orders" }"#).unwrap();

        update_json_file(&path, &[("_id", json!("abc123")), ("version", json!(2))])
            .await
            .unwrap();

        let document = fsio::read_json(&path).await.unwrap();
        assert_eq!(
            document,
            json!({ "name": "Orders", "_id": "abc123", "version": 2 })
        );
    }

    #[tokio::test]
    async fn malformed_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(config_path(dir.path()), "{ nope").unwrap();
        assert!(read_config_id(dir.path()).await.is_err());
    }
}
