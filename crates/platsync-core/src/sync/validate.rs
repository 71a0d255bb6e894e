//! Post-pull validation: confirm the files a pull should have produced
//!
//! Expectations are derived from the same extraction rules that drive the
//! pull, so a settings change updates both sides at once.

use super::SyncContext;
use crate::fsio;
use crate::naming::{action_folder_name, sanitize_path_component};
use crate::settings::ExtractionRule;
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

/// Check one entity folder against its extraction rules, printing a line
/// per expected file. Returns true when everything is present.
pub async fn validate_entity_pull(
    entity_dir: &Path,
    rules: &[ExtractionRule],
    entity_name: &str,
) -> bool {
    println!("{}", "Validating...".blue());

    if !fsio::exists(entity_dir).await {
        eprintln!("  Folder {}", "✗".red());
        tracing::error!(entity = entity_name, "folder missing");
        return false;
    }

    let mut valid = true;
    for rule in rules {
        let present = fsio::exists(&fsio::join_slash_path(entity_dir, &rule.path)).await;
        if present {
            println!("  {} {}", rule.path, "✔".green());
        } else {
            eprintln!("  {} {}", rule.path, "✗".red());
            tracing::error!(entity = entity_name, file = %rule.path, "file missing");
            valid = false;
        }
    }

    valid
}

/// Check a pulled platform folder: configs, every model schema, every
/// action. Returns true when everything is present.
pub async fn validate_platform_pull(
    ctx: &SyncContext,
    platform_dir: &Path,
    models: &[Value],
    actions: &[Value],
) -> bool {
    println!("{}", "Validating...".blue());

    if !fsio::exists(platform_dir).await {
        eprintln!("  Platform folder {}", "✗".red());
        tracing::error!("platform folder missing");
        return false;
    }

    let mut valid = true;
    let configs_dir = platform_dir.join("configs");

    let config_rules = ctx
        .settings
        .extract_keys
        .platform_connection_definition
        .iter()
        .chain(&ctx.settings.extract_keys.platform)
        .chain(&ctx.settings.extract_keys.platform_detail)
        .chain(&ctx.settings.extract_keys.oauth_connection_definition);
    for rule in config_rules {
        valid &= check_file(&configs_dir, &rule.path, "configs").await;
    }

    for model in models {
        let model_name = model
            .get("modelName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let model_dir = platform_dir
            .join("models")
            .join(sanitize_path_component(model_name));

        if !fsio::exists(&model_dir).await {
            eprintln!("  {} folder {}", model_name, "✗".red());
            tracing::error!(model = model_name, "model folder missing");
            valid = false;
            continue;
        }
        for rule in &ctx.settings.extract_keys.platform_model_schema {
            valid &= check_file(&model_dir, &rule.path, model_name).await;
        }
    }

    for action in actions {
        let model_name = action
            .get("modelName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let action_name = action.get("name").and_then(Value::as_str).unwrap_or_default();
        let action_id = action.get("_id").and_then(Value::as_str).unwrap_or_default();
        let action_dir = platform_dir
            .join("models")
            .join(sanitize_path_component(model_name))
            .join("actions")
            .join(action_folder_name(action_name, action_id));

        if !fsio::exists(&action_dir).await {
            eprintln!("  {}:{} folder {}", model_name, action_name, "✗".red());
            tracing::error!(model = model_name, action = action_name, "action folder missing");
            valid = false;
            continue;
        }
        for rule in &ctx.settings.extract_keys.platform_model_action {
            valid &= check_file(&action_dir, &rule.path, action_name).await;
        }
    }

    valid
}

async fn check_file(dir: &Path, relative: &str, label: &str) -> bool {
    if fsio::exists(&fsio::join_slash_path(dir, relative)).await {
        println!("  {}/{} {}", label, relative, "✔".green());
        true
    } else {
        eprintln!("  {}/{} {}", label, relative, "✗".red());
        tracing::error!(label, file = relative, "file missing");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rules(value: serde_json::Value) -> Vec<ExtractionRule> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn entity_validation_reports_missing_rule_targets() {
        let dir = TempDir::new().unwrap();
        let rules = rules(serde_json::json!([
            { "path": "config.json", "keys": ["_id"] },
            { "path": "fields.json", "keys": ["fields"], "root": true }
        ]));

        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert!(!validate_entity_pull(dir.path(), &rules, "Orders").await);

        std::fs::write(dir.path().join("fields.json"), "{}").unwrap();
        assert!(validate_entity_pull(dir.path(), &rules, "Orders").await);
    }

    #[tokio::test]
    async fn missing_entity_folder_fails_validation() {
        let dir = TempDir::new().unwrap();
        let rules = rules(serde_json::json!([{ "path": "config.json", "keys": ["_id"] }]));
        assert!(!validate_entity_pull(&dir.path().join("absent"), &rules, "Orders").await);
    }
}
