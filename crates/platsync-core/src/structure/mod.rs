//! Structure materializer: turns a declarative directory tree into real
//! folders and files
//!
//! Two passes. [`apply_replacements`] resolves placeholder keys in the
//! tree's substitution rules against caller-supplied values, returning a
//! new tree and leaving the canonical one untouched. [`materialize`] then
//! walks the resolved tree, creating directories idempotently and
//! instantiating files from templates.

use crate::fsio;
use crate::settings::StructureNode;
use anyhow::Result;
use colored::Colorize;
use serde_json::{Map, Value};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// Placeholder values for the substitution pass, keyed by placeholder name
pub type ReplacementValues = Map<String, Value>;

/// Resolve placeholder keys in every file's substitution rules. A rule
/// whose `to` names a key present (and non-null) in `values` gets that
/// value; other rules pass through unchanged. Returns a new tree.
pub fn apply_replacements(node: &StructureNode, values: &ReplacementValues) -> StructureNode {
    let mut resolved = node.clone();

    for file in &mut resolved.files {
        for rule in &mut file.replace {
            match values.get(&rule.to) {
                Some(value) if !value.is_null() => rule.to = render_value(value),
                _ => {}
            }
        }
    }

    resolved.folders = resolved
        .folders
        .iter()
        .map(|folder| apply_replacements(folder, values))
        .collect();

    resolved
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Materialize `node` at `target`, creating `target` itself if needed.
///
/// Directories are created idempotently; a directory creation failure
/// aborts the affected subtree. Files are written only when absent unless
/// `overwrite` is set. A missing template source is reported and skips
/// that file only; remaining siblings continue.
pub fn materialize<'a>(
    target: &'a Path,
    node: &'a StructureNode,
    templates_dir: &'a Path,
    overwrite: bool,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        fsio::create_dir_all(target).await?;

        for folder in &node.folders {
            let folder_path = target.join(&folder.name);
            materialize(&folder_path, folder, templates_dir, overwrite).await?;
        }

        for file in &node.files {
            let file_path = target.join(&file.name);

            if fsio::exists(&file_path).await && !overwrite {
                continue;
            }

            let template_path = fsio::join_slash_path(templates_dir, &file.template);
            let template_text = match fsio::read_to_string(&template_path).await {
                Ok(text) => text,
                Err(_) => {
                    eprintln!(
                        "{} Template '{}' not found (wanted by {})",
                        "Warning:".yellow(),
                        file.template,
                        file_path.display()
                    );
                    tracing::warn!(template = %file.template, "template source missing");
                    continue;
                }
            };

            let mut content = template_text;
            for rule in &file.replace {
                content = content.replace(&rule.from, &rule.to);
            }

            fsio::write_string(&file_path, &content).await?;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_structure() -> StructureNode {
        serde_json::from_value(serde_json::json!({
            "name": "entity",
            "files": [
                {
                    "name": "config.json",
                    "template": "entity/config.json",
                    "replace": [
                        { "from": "{{name}}", "to": "entityName" },
                        { "from": "{{active}}", "to": "isActive" }
                    ]
                }
            ],
            "folders": [
                {
                    "name": "nested",
                    "files": [
                        { "name": "readme.txt", "template": "entity/readme.txt" }
                    ]
                },
                { "name": "empty" }
            ]
        }))
        .unwrap()
    }

    fn values(pairs: &[(&str, Value)]) -> ReplacementValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn replacements_resolve_without_mutating_the_original() {
        let original = sample_structure();
        let resolved = apply_replacements(
            &original,
            &values(&[
                ("entityName", Value::String("Orders".into())),
                ("isActive", Value::Bool(true)),
            ]),
        );

        assert_eq!(resolved.files[0].replace[0].to, "Orders");
        assert_eq!(resolved.files[0].replace[1].to, "true");
        // canonical tree still holds the placeholder keys
        assert_eq!(original.files[0].replace[0].to, "entityName");
    }

    #[test]
    fn null_values_leave_the_placeholder_alone() {
        let resolved = apply_replacements(
            &sample_structure(),
            &values(&[("entityName", Value::Null)]),
        );
        assert_eq!(resolved.files[0].replace[0].to, "entityName");
    }

    #[tokio::test]
    async fn materialize_builds_the_tree_and_substitutes() {
        let templates = TempDir::new().unwrap();
        let entity_dir = templates.path().join("entity");
        std::fs::create_dir_all(&entity_dir).unwrap();
        std::fs::write(
            entity_dir.join("config.json"),
            r#"{ "name": "{{name}}", "active": {{active}} }"#,
        )
        .unwrap();
        std::fs::write(entity_dir.join("readme.txt"), "hello").unwrap();

        let target = TempDir::new().unwrap();
        let resolved = apply_replacements(
            &sample_structure(),
            &values(&[
                ("entityName", Value::String("Orders".into())),
                ("isActive", Value::Bool(true)),
            ]),
        );

        materialize(target.path(), &resolved, templates.path(), false)
            .await
            .unwrap();

        let config = std::fs::read_to_string(target.path().join("config.json")).unwrap();
        assert_eq!(config, r#"{ "name": "Orders", "active": true }"#);
        assert_eq!(
            std::fs::read_to_string(target.path().join("nested/readme.txt")).unwrap(),
            "hello"
        );
        assert!(target.path().join("empty").is_dir());
    }

    #[tokio::test]
    async fn materialize_is_idempotent_without_overwrite() {
        let templates = TempDir::new().unwrap();
        std::fs::create_dir_all(templates.path().join("entity")).unwrap();
        std::fs::write(templates.path().join("entity/config.json"), "template").unwrap();
        std::fs::write(templates.path().join("entity/readme.txt"), "hello").unwrap();

        let target = TempDir::new().unwrap();
        let structure = sample_structure();

        materialize(target.path(), &structure, templates.path(), false)
            .await
            .unwrap();
        std::fs::write(target.path().join("config.json"), "edited locally").unwrap();

        materialize(target.path(), &structure, templates.path(), false)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(target.path().join("config.json")).unwrap(),
            "edited locally"
        );

        materialize(target.path(), &structure, templates.path(), true)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(target.path().join("config.json")).unwrap(),
            "template"
        );
    }

    #[tokio::test]
    async fn missing_template_skips_that_file_only() {
        let templates = TempDir::new().unwrap();
        std::fs::create_dir_all(templates.path().join("entity")).unwrap();
        // only readme.txt exists; config.json template is missing
        std::fs::write(templates.path().join("entity/readme.txt"), "hello").unwrap();

        let target = TempDir::new().unwrap();
        materialize(target.path(), &sample_structure(), templates.path(), false)
            .await
            .unwrap();

        assert!(!target.path().join("config.json").exists());
        assert!(target.path().join("nested/readme.txt").exists());
    }
}
