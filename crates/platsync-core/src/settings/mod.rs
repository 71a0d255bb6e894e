//! Declarative settings document: types, loading, validation
//!
//! The document is plain JSON. A default copy ships inside the binary so
//! the tool works out of the box; a `settings.json` at the workspace root
//! takes precedence when present. Validation happens once at load time so
//! the sync flows can trust every structure tree and rule list they are
//! handed.

pub mod model;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use model::{
    ApiDefaults, ExtractKeys, ExtractionRule, FileSpec, MoveRule, Paths, PlatformPushStructures,
    PushFileSpec, PushStructure, PushStructures, RearrangeRule, ReplaceRule, Settings, Statics,
    StructureNode, Structures,
};

/// Settings document shipped with the binary
const DEFAULT_SETTINGS: &str = include_str!("default_settings.json");

/// File name of a workspace-local settings override
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("extraction rule for `{path}` in `{table}` has no keys")]
    EmptyKeys { table: &'static str, path: String },

    #[error("structure `{structure}` contains a folder with an empty name")]
    EmptyFolderName { structure: &'static str },

    #[error("file `{file}` in structure `{structure}` has no template")]
    EmptyTemplate {
        structure: &'static str,
        file: String,
    },

    #[error("push structure `{table}` declares `{file}` as root without a key")]
    RootWithoutKey { table: &'static str, file: String },
}

impl Settings {
    /// Parse and validate the built-in settings document
    pub fn builtin() -> Result<Self, SettingsError> {
        Self::from_str(DEFAULT_SETTINGS)
    }

    /// Parse and validate a settings document from disk
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    /// Load settings for a workspace: `settings.json` at the root when
    /// present, the built-in document otherwise
    pub fn load(workspace_root: &Path) -> Result<Self, SettingsError> {
        let override_path = workspace_root.join(SETTINGS_FILE_NAME);
        if override_path.exists() {
            Self::from_file(&override_path)
        } else {
            Self::builtin()
        }
    }

    fn from_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject documents the sync flows could not execute safely
    fn validate(&self) -> Result<(), SettingsError> {
        let structures: [(&'static str, &StructureNode); 5] = [
            ("commonModel", &self.structures.common_model),
            ("commonEnum", &self.structures.common_enum),
            ("platformFolder", &self.structures.platform_folder),
            ("model", &self.structures.model),
            ("platformOAuth", &self.structures.platform_o_auth),
        ];
        for (name, node) in structures {
            validate_structure(name, node)?;
        }

        let rule_tables: [(&'static str, &[ExtractionRule]); 10] = [
            ("commonModel", &self.extract_keys.common_model),
            ("commonEnum", &self.extract_keys.common_enum),
            (
                "platformConnectionDefinition",
                &self.extract_keys.platform_connection_definition,
            ),
            ("platform", &self.extract_keys.platform),
            ("platformDetail", &self.extract_keys.platform_detail),
            (
                "oauthConnectionDefinition",
                &self.extract_keys.oauth_connection_definition,
            ),
            ("platformModelSchema", &self.extract_keys.platform_model_schema),
            ("platformModelAction", &self.extract_keys.platform_model_action),
            ("platformSchemaPage", &self.extract_keys.platform_schema_page),
            ("platformActionPage", &self.extract_keys.platform_action_page),
        ];
        for (table, rules) in rule_tables {
            for rule in rules {
                if rule.keys.is_empty() {
                    return Err(SettingsError::EmptyKeys {
                        table,
                        path: rule.path.clone(),
                    });
                }
            }
        }

        let push_tables: [(&'static str, &PushStructure); 9] = [
            ("commonModels", &self.push_structures.common_models),
            ("commonEnums", &self.push_structures.common_enums),
            (
                "platform.connectionDefinition",
                &self.push_structures.platform.connection_definition,
            ),
            ("platform.platform", &self.push_structures.platform.platform),
            (
                "platform.oauthConnectionDefinition",
                &self.push_structures.platform.oauth_connection_definition,
            ),
            ("platform.schemas", &self.push_structures.platform.schemas),
            ("platform.schemaPage", &self.push_structures.platform.schema_page),
            ("platform.actions", &self.push_structures.platform.actions),
            ("platform.actionPage", &self.push_structures.platform.action_page),
        ];
        for (table, structure) in push_tables {
            for file in &structure.files {
                if file.root && file.key.is_none() {
                    return Err(SettingsError::RootWithoutKey {
                        table,
                        file: file.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_structure(structure: &'static str, node: &StructureNode) -> Result<(), SettingsError> {
    if node.name.trim().is_empty() {
        return Err(SettingsError::EmptyFolderName { structure });
    }
    for file in &node.files {
        if file.template.trim().is_empty() {
            return Err(SettingsError::EmptyTemplate {
                structure,
                file: file.name.clone(),
            });
        }
    }
    for folder in &node.folders {
        validate_structure(structure, folder)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_settings_parse_and_validate() {
        let settings = Settings::builtin().expect("built-in settings must be valid");
        assert!(!settings.extract_keys.common_model.is_empty());
        assert!(!settings.push_structures.common_models.files.is_empty());
        assert!(!settings.structures.platform_folder.folders.is_empty());
    }

    #[test]
    fn empty_keys_rejected() {
        let mut text: serde_json::Value = serde_json::from_str(DEFAULT_SETTINGS).unwrap();
        text["extractKeys"]["commonModel"][0]["keys"] = serde_json::json!([]);
        let err = Settings::from_str(&text.to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::EmptyKeys { .. }));
    }

    #[test]
    fn root_push_file_without_key_rejected() {
        let mut text: serde_json::Value = serde_json::from_str(DEFAULT_SETTINGS).unwrap();
        text["pushStructures"]["commonModels"]["files"][1] =
            serde_json::json!({ "name": "fields.json", "root": true });
        let err = Settings::from_str(&text.to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::RootWithoutKey { .. }));
    }

    #[test]
    fn builtin_structures_reference_shipped_templates() {
        fn collect<'a>(node: &'a StructureNode, out: &mut Vec<&'a str>) {
            for file in &node.files {
                out.push(&file.template);
            }
            for folder in &node.folders {
                collect(folder, out);
            }
        }

        let settings = Settings::builtin().unwrap();
        let mut templates = Vec::new();
        collect(&settings.structures.common_model, &mut templates);
        collect(&settings.structures.common_enum, &mut templates);
        collect(&settings.structures.platform_folder, &mut templates);
        collect(&settings.structures.model, &mut templates);
        collect(&settings.structures.platform_o_auth, &mut templates);

        let templates_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(&settings.paths.templates);
        for template in templates {
            let path = crate::fsio::join_slash_path(&templates_dir, template);
            assert!(path.exists(), "missing template source: {}", template);
        }
    }

    #[test]
    fn leaf_detection() {
        let node: StructureNode =
            serde_json::from_str(r#"{ "name": "actions" }"#).unwrap();
        assert!(node.is_leaf());

        let node: StructureNode =
            serde_json::from_str(r#"{ "name": "configs", "files": [{ "name": "a.json", "template": "t/a.json" }] }"#)
                .unwrap();
        assert!(!node.is_leaf());
    }
}
