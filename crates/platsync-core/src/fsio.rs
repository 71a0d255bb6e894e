//! File-system adapter shared by the scaffolding and sync flows
//!
//! Thin wrappers over `tokio::fs` that attach path context to every error
//! and normalize the handful of operations the flows need: existence
//! checks, JSON round-trips with the workspace's 4-space indentation,
//! directory listings, renames, recursive removal.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Join a workspace root with a `/`-separated relative path from the
/// settings document
pub fn join_slash_path(root: &Path, slash_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in slash_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

pub async fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse a local JSON file. A parse failure here is not recoverable by the
/// calling flow; the error carries the offending path.
pub async fn read_json(path: &Path) -> Result<Value> {
    let text = read_to_string(path).await?;
    serde_json::from_str(&text)
        .with_context(|| format!("Malformed JSON in {}", path.display()))
}

pub async fn write_string(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Serialize with stable 4-space indentation, matching every generated
/// file in the workspace
pub fn to_pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut serializer)
        .expect("JSON value serialization is infallible");
    String::from_utf8(buf).expect("serde_json emits UTF-8")
}

pub async fn write_json(path: &Path, value: &Value) -> Result<()> {
    write_string(path, &to_pretty_json(value)).await
}

pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

pub async fn rename(old_path: &Path, new_path: &Path) -> Result<()> {
    fs::rename(old_path, new_path).await.with_context(|| {
        format!(
            "Failed to rename {} to {}",
            old_path.display(),
            new_path.display()
        )
    })
}

/// Remove a file or a directory tree; absent paths are not an error
pub async fn remove(path: &Path) -> Result<()> {
    if !exists(path).await {
        return Ok(());
    }
    let metadata = fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .await
            .with_context(|| format!("Failed to remove directory {}", path.display()))
    } else {
        fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to remove {}", path.display()))
    }
}

/// Names of the immediate subdirectories, sorted for stable iteration
pub async fn list_subdirectories(path: &Path) -> Result<Vec<String>> {
    list_entries(path, true).await
}

/// Names of the immediate plain files, sorted for stable iteration
pub async fn list_files(path: &Path) -> Result<Vec<String>> {
    list_entries(path, false).await
}

async fn list_entries(path: &Path, directories: bool) -> Result<Vec<String>> {
    let mut reader = fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to read directory {}", path.display()))?;
    let mut names = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory {}", path.display()))?
    {
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() == directories {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn join_and_roundtrip_json() {
        let dir = TempDir::new().unwrap();
        let path = join_slash_path(dir.path(), "a/b/config.json");
        assert!(path.ends_with(Path::new("a").join("b").join("config.json")));

        create_dir_all(path.parent().unwrap()).await.unwrap();
        let value = serde_json::json!({ "_id": "abc", "nested": { "n": 1 } });
        write_json(&path, &value).await.unwrap();

        let text = read_to_string(&path).await.unwrap();
        assert!(text.contains("    \"_id\": \"abc\""));
        assert_eq!(read_json(&path).await.unwrap(), value);
    }

    #[tokio::test]
    async fn remove_handles_files_dirs_and_absence() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        write_string(&file, "x").await.unwrap();
        remove(&file).await.unwrap();
        assert!(!exists(&file).await);

        let sub = dir.path().join("sub/inner");
        create_dir_all(&sub).await.unwrap();
        write_string(&sub.join("f.txt"), "x").await.unwrap();
        remove(&dir.path().join("sub")).await.unwrap();
        assert!(!exists(&dir.path().join("sub")).await);

        // absent path is fine
        remove(&dir.path().join("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn listings_are_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        create_dir_all(&dir.path().join("zeta")).await.unwrap();
        create_dir_all(&dir.path().join("alpha")).await.unwrap();
        write_string(&dir.path().join("file.json"), "{}").await.unwrap();

        let dirs = list_subdirectories(dir.path()).await.unwrap();
        assert_eq!(dirs, vec!["alpha".to_string(), "zeta".to_string()]);

        let files = list_files(dir.path()).await.unwrap();
        assert_eq!(files, vec!["file.json".to_string()]);
    }

    #[test]
    fn pretty_json_uses_four_spaces() {
        let value = serde_json::json!({ "a": { "b": 1 } });
        let text = to_pretty_json(&value);
        assert_eq!(text, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
    }
}
