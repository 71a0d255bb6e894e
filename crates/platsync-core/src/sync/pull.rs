//! Pull flows: project remote documents into entity folders

use super::validate;
use super::{Selection, SyncContext, SyncReport};
use crate::naming::{action_folder_name, format_common_name, sanitize_path_component, to_pascal_case};
use crate::projection::write_entity_files;
use crate::settings::ExtractionRule;
use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::{json, Value};
use std::path::Path;

/// Pull common models into the workspace
pub async fn pull_common_models(
    ctx: &SyncContext,
    selection: &Selection,
    validate_after: bool,
) -> Result<SyncReport> {
    pull_named_entities(
        ctx,
        "v1/common-models",
        &ctx.settings.extract_keys.common_model,
        &ctx.common_models_dir(),
        selection,
        validate_after,
    )
    .await
}

/// Pull common enums into the workspace
pub async fn pull_common_enums(
    ctx: &SyncContext,
    selection: &Selection,
    validate_after: bool,
) -> Result<SyncReport> {
    pull_named_entities(
        ctx,
        "v1/public/sdk/common-enums",
        &ctx.settings.extract_keys.common_enum,
        &ctx.common_enums_dir(),
        selection,
        validate_after,
    )
    .await
}

/// Shared shape of the common-model and common-enum pulls: fetch a row,
/// write one entity folder per row
async fn pull_named_entities(
    ctx: &SyncContext,
    collection: &str,
    rules: &[ExtractionRule],
    base_dir: &Path,
    selection: &Selection,
    validate_after: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    tracing::info!(collection, "starting pull");

    match selection {
        Selection::All => {
            let rows = ctx.api.get_all_rows(collection, &[]).await?;
            report.total = rows.len();
            println!("Total: {}", report.total);
            println!();

            for row in &rows {
                let Some(raw_name) = row.get("name").and_then(Value::as_str) else {
                    eprintln!("{} Row without a name, skipping", "Warning:".yellow());
                    continue;
                };
                if store_entity(base_dir, raw_name, row, rules, validate_after).await {
                    report.succeeded += 1;
                }
            }
        }
        Selection::Names(names) => {
            report.total = names.len();
            println!("Total: {}", report.total);
            println!();

            for name in names {
                let response = ctx.api.get(collection, &[("name", name.clone())]).await?;
                if !response.is_success() {
                    eprintln!("API Error: {}.", response.error_message());
                    tracing::error!(%name, "pull request failed");
                    continue;
                }
                let Some(row) = response.first_row().cloned() else {
                    eprintln!("{} does not exist!", name);
                    continue;
                };
                if store_entity(base_dir, name, &row, rules, validate_after).await {
                    report.succeeded += 1;
                }
            }
        }
    }

    report.print("pulled");
    Ok(report)
}

async fn store_entity(
    base_dir: &Path,
    raw_name: &str,
    row: &Value,
    rules: &[ExtractionRule],
    validate_after: bool,
) -> bool {
    let folder_name = format_common_name(raw_name);
    println!("Pulling: {}", folder_name);
    tracing::info!(name = %folder_name, "pulling");

    let entity_dir = base_dir.join(&folder_name);
    if let Err(error) = write_entity_files(&entity_dir, row, rules).await {
        eprintln!("{}", format!("{}: {:#}", raw_name, error).red());
        tracing::error!(name = %folder_name, %error, "pull failed");
        return false;
    }

    if validate_after {
        if validate::validate_entity_pull(&entity_dir, rules, raw_name).await {
            println!("{}", "Pull Validated!".green());
        } else {
            eprintln!("{}", "Pull Validation Failed!".red());
        }
        println!();
    }

    true
}

/// Pull platforms: connection definition, platform record, public
/// details, OAuth definition, pages, model schemas, and actions
pub async fn pull_platforms(
    ctx: &SyncContext,
    selection: &Selection,
    validate_after: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    tracing::info!("starting platform pull");

    match selection {
        Selection::All => {
            let rows = ctx
                .api
                .get_all_rows("v1/public/connection-definitions", &[])
                .await?;
            report.total = rows.len();
            println!("Total: {}", report.total);
            println!();

            for row in &rows {
                let platform_name =
                    to_pascal_case(row.get("platform").and_then(Value::as_str).unwrap_or_default());
                let id = row.get("_id").and_then(Value::as_str).unwrap_or_default();
                println!("Pulling: {}", platform_name);
                tracing::info!(platform = %platform_name, "pulling");

                let platform_dir = ctx.platform_dir(&platform_name);
                let query = [("_id", id.to_string())];
                if pull_one_platform(ctx, &query, &platform_dir, &platform_name, validate_after)
                    .await
                {
                    report.succeeded += 1;
                }
                println!();
            }
        }
        Selection::Names(names) => {
            report.total = names.len();
            println!("Total: {}", report.total);
            println!();

            for name in names {
                let platform_name = to_pascal_case(name);
                println!("Pulling: {}", platform_name);
                tracing::info!(platform = %platform_name, "pulling");

                let platform_dir = ctx.platform_dir(&platform_name);
                let query = [("name", name.clone())];
                if pull_one_platform(ctx, &query, &platform_dir, &platform_name, validate_after)
                    .await
                {
                    report.succeeded += 1;
                }
            }
        }
    }

    report.print("pulled");
    Ok(report)
}

async fn pull_one_platform(
    ctx: &SyncContext,
    query: &[(&str, String)],
    platform_dir: &Path,
    platform_name: &str,
    validate_after: bool,
) -> bool {
    match store_platform_data(ctx, query, platform_dir, platform_name, validate_after).await {
        Ok(()) => true,
        Err(error) => {
            eprintln!("{}", format!("{:#}", error).red());
            tracing::error!(platform = platform_name, %error, "pull failed");
            false
        }
    }
}

async fn store_platform_data(
    ctx: &SyncContext,
    query: &[(&str, String)],
    platform_dir: &Path,
    platform_name: &str,
    validate_after: bool,
) -> Result<()> {
    let response = ctx
        .api
        .get("v1/public/connection-definitions", query)
        .await?;
    if !response.is_success() {
        bail!("{}: pull failed: {}", platform_name, response.error_message());
    }
    let Some(connection_definition) = response.first_row().cloned() else {
        bail!("{} does not exist!", platform_name);
    };

    let definition_id = connection_definition
        .get("_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let connection_platform = connection_definition
        .get("platform")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let configs_dir = platform_dir.join("configs");
    write_entity_files(
        &configs_dir,
        &connection_definition,
        &ctx.settings.extract_keys.platform_connection_definition,
    )
    .await?;

    let platform_response = ctx
        .api
        .get("v1/platforms", &[("connectionDefinitionId", definition_id.clone())])
        .await?;
    if let Some(record) = platform_response.first_row() {
        write_entity_files(&configs_dir, record, &ctx.settings.extract_keys.platform).await?;
    }

    let public_response = ctx
        .api
        .get("v1/public/connection-data", &[("platform", connection_platform.clone())])
        .await?;
    let public_details = public_response.first_row().cloned().unwrap_or_else(|| json!({}));
    write_entity_files(
        &configs_dir,
        &public_details,
        &ctx.settings.extract_keys.platform_detail,
    )
    .await?;

    let oauth_response = ctx
        .api
        .get(
            "v1/connection-oauth-definitions",
            &[("connectionPlatform", connection_platform.clone())],
        )
        .await?;
    let oauth_details = oauth_response.first_row().cloned().unwrap_or_else(|| json!({}));
    write_entity_files(
        &configs_dir,
        &oauth_details,
        &ctx.settings.extract_keys.oauth_connection_definition,
    )
    .await?;

    let pages = ctx
        .api
        .get_all_rows(
            "v1/platform-pages",
            &[("connectionDefinitionId", definition_id.clone())],
        )
        .await?;
    println!("Pages: {}", pages.len());

    let models = ctx
        .api
        .get_all_rows(
            "v1/connection-model-schemas",
            &[("connectionDefinitionId", definition_id.clone())],
        )
        .await?;
    println!("Models: {}", models.len());

    for model in &models {
        let model_name = model
            .get("modelName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let model_dir = platform_dir
            .join("models")
            .join(sanitize_path_component(model_name));
        write_entity_files(&model_dir, model, &ctx.settings.extract_keys.platform_model_schema)
            .await?;

        if let Some(page) = find_page(&pages, "connectionModelSchemaId", &model["_id"], &["schema", "schemaUngenerated"]) {
            write_entity_files(&model_dir, page, &ctx.settings.extract_keys.platform_schema_page)
                .await?;
        }
    }

    let actions = ctx
        .api
        .get_all_rows(
            "v1/connection-model-definitions",
            &[("connectionDefinitionId", definition_id.clone())],
        )
        .await?;
    println!("Actions: {}", actions.len());

    for action in &actions {
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
        write_entity_files(&action_dir, action, &ctx.settings.extract_keys.platform_model_action)
            .await?;

        if let Some(page) = find_page(&pages, "connectionModelDefinitionId", &action["_id"], &["action", "actionUngenerated"]) {
            write_entity_files(&action_dir, page, &ctx.settings.extract_keys.platform_action_page)
                .await?;
        }
    }

    if validate_after {
        if validate::validate_platform_pull(ctx, platform_dir, &models, &actions).await {
            println!("{}", "Pull Validated!".green());
        } else {
            eprintln!("{}", "Pull Validation Failed!".red());
        }
    }

    Ok(())
}

fn find_page<'a>(
    pages: &'a [Value],
    id_key: &str,
    id: &Value,
    page_types: &[&str],
) -> Option<&'a Value> {
    pages.iter().find(|page| {
        page.get(id_key) == Some(id)
            && page
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| page_types.contains(&t))
    })
}
