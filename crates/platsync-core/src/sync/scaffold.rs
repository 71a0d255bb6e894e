//! Scaffolding flows: create entity folders from the declarative
//! structure trees

use super::{SyncContext, SyncReport};
use crate::fsio;
use crate::naming::{format_common_name, to_pascal_case};
use crate::settings::StructureNode;
use crate::structure::{apply_replacements, materialize, ReplacementValues};
use anyhow::Result;
use serde_json::{json, Value};

/// Authentication flavor of a platform; decides which auth subtree gets
/// scaffolded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    OAuth,
    OAuthLegacy,
    Bearer,
    Basic,
    ApiKey,
    None,
}

impl AuthMethod {
    /// Folder under the structure's `auth` node, if any
    pub fn folder_name(&self) -> Option<&'static str> {
        match self {
            AuthMethod::OAuth => Some("oauth"),
            AuthMethod::OAuthLegacy => Some("oauthLegacy"),
            AuthMethod::Bearer => Some("bearer"),
            AuthMethod::Basic => Some("basic"),
            AuthMethod::ApiKey => Some("apiKey"),
            AuthMethod::None => None,
        }
    }
}

fn values(pairs: &[(&str, Value)]) -> ReplacementValues {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Scaffold common model folders
pub async fn add_common_models(
    ctx: &SyncContext,
    names: &[String],
    force: bool,
) -> Result<SyncReport> {
    add_named_entities(
        ctx,
        names,
        force,
        "v1/common-models",
        &ctx.settings.structures.common_model,
        &ctx.common_models_dir(),
        "modelName",
    )
    .await
}

/// Scaffold common enum folders
pub async fn add_common_enums(
    ctx: &SyncContext,
    names: &[String],
    force: bool,
) -> Result<SyncReport> {
    add_named_entities(
        ctx,
        names,
        force,
        "v1/public/sdk/common-enums",
        &ctx.settings.structures.common_enum,
        &ctx.common_enums_dir(),
        "enumName",
    )
    .await
}

async fn add_named_entities(
    ctx: &SyncContext,
    names: &[String],
    force: bool,
    collection: &str,
    structure: &StructureNode,
    base_dir: &std::path::Path,
    placeholder: &str,
) -> Result<SyncReport> {
    let mut report = SyncReport {
        total: names.len(),
        succeeded: 0,
    };
    let templates_dir = ctx.templates_dir();

    for name in names {
        let folder_name = format_common_name(name);
        let entity_dir = base_dir.join(&folder_name);

        if fsio::exists(&entity_dir).await {
            eprintln!("{} already exists as {}!", name, folder_name);
            continue;
        }

        let response = ctx.api.get(collection, &[("name", name.clone())]).await?;
        if response.first_row().is_some() && !force {
            eprintln!(
                "{} already exists in the database; pass --force to add it anyway.",
                name
            );
            continue;
        }

        let resolved = apply_replacements(structure, &values(&[(placeholder, json!(folder_name))]));
        materialize(&entity_dir, &resolved, &templates_dir, false).await?;

        println!("{} added as {}!", name, folder_name);
        tracing::info!(name = %folder_name, "scaffolded");
        report.succeeded += 1;
    }

    Ok(report)
}

/// Scaffold a platform folder: configs, one subtree per model, and the
/// auth flavor's folder
pub async fn add_platform(
    ctx: &SyncContext,
    name: &str,
    auth: AuthMethod,
    models: &[String],
    force: bool,
) -> Result<()> {
    let platform_name = to_pascal_case(name);
    let platform_dir = ctx.platform_dir(&platform_name);

    if fsio::exists(&platform_dir).await {
        eprintln!("Platform {} already exists!", name);
        return Ok(());
    }

    let response = ctx
        .api
        .get("v1/public/connection-definitions", &[("name", name.to_string())])
        .await?;
    if response.first_row().is_some() && !force {
        eprintln!(
            "{} already exists in the database; pass --force to add it anyway.",
            name
        );
        return Ok(());
    }

    let base = &ctx.settings.structures.platform_folder;
    let model_template = base
        .folders
        .iter()
        .find(|folder| folder.name == "models")
        .and_then(|folder| folder.folders.first())
        .cloned()
        .unwrap_or_else(|| ctx.settings.structures.model.clone());

    let mut assembled = StructureNode {
        name: platform_name.clone(),
        folders: Vec::new(),
        files: base.files.clone(),
    };

    if let Some(configs) = base.folders.iter().find(|folder| folder.name == "configs") {
        assembled.folders.push(configs.clone());
    }

    let mut models_node = StructureNode {
        name: "models".to_string(),
        folders: Vec::new(),
        files: Vec::new(),
    };
    for model in models {
        let mut resolved = apply_replacements(
            &model_template,
            &values(&[
                ("modelName", json!(model)),
                ("platformVersion", json!("")),
                ("platformId", json!("")),
                ("connectionPlatform", json!(platform_name)),
                ("connectionDefinitionId", json!("")),
            ]),
        );
        resolved.name = model.clone();
        models_node.folders.push(resolved);
    }
    assembled.folders.push(models_node);

    if let Some(auth_folder_name) = auth.folder_name() {
        if let Some(auth_node) = base.folders.iter().find(|folder| folder.name == "auth") {
            let flavor: Vec<StructureNode> = auth_node
                .folders
                .iter()
                .filter(|folder| folder.name == auth_folder_name)
                .cloned()
                .collect();
            assembled.folders.push(StructureNode {
                name: "auth".to_string(),
                folders: flavor,
                files: auth_node.files.clone(),
            });
        }
    }

    let assembled = apply_replacements(
        &assembled,
        &values(&[
            ("platformName", json!(platform_name)),
            ("isOauth", json!(auth == AuthMethod::OAuth)),
            ("connectionDefinitionId", json!("")),
        ]),
    );

    materialize(&platform_dir, &assembled, &ctx.templates_dir(), false).await?;

    println!("{} added as {}!", name, platform_name);
    tracing::info!(platform = %platform_name, "scaffolded");
    Ok(())
}

/// Scaffold model subtrees inside an existing platform folder, seeding
/// their configs from the remote platform record when it exists
pub async fn add_platform_models(
    ctx: &SyncContext,
    platform: &str,
    models: &[String],
) -> Result<SyncReport> {
    let platform_name = to_pascal_case(platform);
    let platform_dir = ctx.platform_dir(&platform_name);

    let mut report = SyncReport {
        total: models.len(),
        succeeded: 0,
    };

    if !fsio::exists(&platform_dir).await {
        eprintln!("{} does not exist!", platform);
        return Ok(report);
    }

    let mut platform_values = vec![
        ("platformId".to_string(), json!("")),
        ("platformVersion".to_string(), json!("")),
        ("connectionPlatform".to_string(), json!(platform_name)),
        ("connectionDefinitionId".to_string(), json!("")),
    ];

    let response = ctx
        .api
        .get("v1/platforms", &[("name", platform.to_string())])
        .await?;
    if response.is_success() {
        if let Some(record) = response.first_row() {
            platform_values = vec![
                ("platformId".to_string(), record.get("_id").cloned().unwrap_or(json!(""))),
                (
                    "platformVersion".to_string(),
                    record.get("platformVersion").cloned().unwrap_or(json!("")),
                ),
                (
                    "connectionPlatform".to_string(),
                    record.get("name").cloned().unwrap_or(json!(platform_name)),
                ),
                (
                    "connectionDefinitionId".to_string(),
                    record.get("connectionDefinitionId").cloned().unwrap_or(json!("")),
                ),
            ];
        }
    }

    let templates_dir = ctx.templates_dir();

    for model in models {
        let model_name = format_common_name(model);
        let model_dir = platform_dir.join("models").join(&model_name);

        if fsio::exists(&model_dir).await {
            eprintln!(
                "{} already exists in {} as {}, skipping...",
                model, platform, model_name
            );
            continue;
        }

        let mut replacements: ReplacementValues = platform_values.iter().cloned().collect();
        replacements.insert("modelName".to_string(), json!(model_name));

        let mut structure = apply_replacements(&ctx.settings.structures.model, &replacements);
        structure.name = model_name.clone();
        // action subfolders carry the model name so sibling models never collide
        if let Some(actions) = structure
            .folders
            .iter_mut()
            .find(|folder| folder.name == "actions")
        {
            for action in &mut actions.folders {
                action.name = format!("{}-{}", action.name, model_name);
            }
        }

        materialize(&model_dir, &structure, &templates_dir, false).await?;

        println!("{} added to {} as {}!", model, platform, model_name);
        tracing::info!(platform = %platform_name, model = %model_name, "scaffolded");
        report.succeeded += 1;
    }

    Ok(report)
}

/// Scaffold (or refresh) the server-side OAuth folder of a platform.
/// The target folder must already exist; files are re-templated in place.
pub async fn add_platform_oauth(ctx: &SyncContext, platform: &str) -> Result<()> {
    let platform_name = to_pascal_case(platform);
    let oauth_dir = ctx.server_oauth_dir().join(&platform_name);

    if !fsio::exists(&oauth_dir).await {
        eprintln!("{} does not exist!", platform);
        return Ok(());
    }

    let resolved = apply_replacements(
        &ctx.settings.structures.platform_o_auth,
        &values(&[("platformName", json!(platform_name))]),
    );
    materialize(&oauth_dir, &resolved, &ctx.templates_dir(), true).await?;

    println!("OAuth folder for {} added!", platform);
    tracing::info!(platform = %platform_name, "oauth folder scaffolded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_methods_map_to_structure_folders() {
        assert_eq!(AuthMethod::OAuth.folder_name(), Some("oauth"));
        assert_eq!(AuthMethod::OAuthLegacy.folder_name(), Some("oauthLegacy"));
        assert_eq!(AuthMethod::ApiKey.folder_name(), Some("apiKey"));
        assert_eq!(AuthMethod::None.folder_name(), None);
    }
}
