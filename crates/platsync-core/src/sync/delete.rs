//! Delete flows: remove entities remotely, then locally
//!
//! The remote deletion goes first; the local folder is removed regardless
//! of the remote outcome so the workspace never keeps a folder the user
//! asked to delete.

use super::{SyncContext, SyncReport};
use crate::fsio;
use crate::naming::{format_common_name, to_pascal_case};
use crate::sync::entity;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Delete common models by name
pub async fn delete_common_models(ctx: &SyncContext, names: &[String]) -> Result<SyncReport> {
    delete_named_entities(ctx, names, "v1/common-models", &ctx.common_models_dir()).await
}

/// Delete common enums by name
pub async fn delete_common_enums(ctx: &SyncContext, names: &[String]) -> Result<SyncReport> {
    delete_named_entities(ctx, names, "v1/common-enums", &ctx.common_enums_dir()).await
}

async fn delete_named_entities(
    ctx: &SyncContext,
    names: &[String],
    collection: &str,
    base_dir: &Path,
) -> Result<SyncReport> {
    let mut report = SyncReport {
        total: names.len(),
        succeeded: 0,
    };
    println!("Total: {}", report.total);
    println!();

    for name in names {
        let folder_name = format_common_name(name);
        let entity_dir = base_dir.join(&folder_name);

        if !fsio::exists(&entity_dir).await {
            eprintln!("{} does not exist!", name);
            continue;
        }

        if let Some(id) = entity::read_config_id(&entity_dir).await? {
            let response = ctx.api.delete(&format!("{}/{}", collection, id)).await?;
            if let Some(error) = response.body.get("error").and_then(Value::as_str) {
                eprintln!("API Error: {}.", error);
                tracing::error!(name = %folder_name, error, "remote delete failed");
            }
        }

        fsio::remove(&entity_dir).await?;
        println!("{} deleted!", name);
        tracing::info!(name = %folder_name, "deleted");
        report.succeeded += 1;
    }

    report.print("deleted");
    Ok(report)
}

/// Delete platforms: every action and schema first, then the connection
/// definition, then the local folder
pub async fn delete_platforms(ctx: &SyncContext, names: &[String]) -> Result<SyncReport> {
    let mut report = SyncReport {
        total: names.len(),
        succeeded: 0,
    };
    println!("Total: {}", report.total);
    println!();

    for name in names {
        let platform_name = to_pascal_case(name);
        let platform_dir = ctx.platform_dir(&platform_name);

        println!("Platform to be deleted: {}", name);

        if !fsio::exists(&platform_dir).await {
            eprintln!("{} does not exist!", name);
            continue;
        }

        let response = ctx
            .api
            .get("v1/public/connection-definitions", &[("name", name.clone())])
            .await?;
        if let Some(error) = response.body.get("error").and_then(Value::as_str) {
            eprintln!("API Error: {}.", error);
            tracing::error!(platform = %platform_name, error, "lookup failed");
        }

        if let Some(definition_id) = response
            .first_row()
            .and_then(|row| row.get("_id"))
            .and_then(Value::as_str)
            .map(str::to_string)
        {
            delete_definition_children(
                ctx,
                "v1/connection-model-definitions",
                "actions",
                &definition_id,
            )
            .await?;
            delete_definition_children(
                ctx,
                "v1/connection-model-schemas",
                "schemas",
                &definition_id,
            )
            .await?;

            let delete_response = ctx
                .api
                .delete(&format!("v1/connection-definitions/{}", definition_id))
                .await?;
            if let Some(error) = delete_response.body.get("error").and_then(Value::as_str) {
                eprintln!("API Error: {}.", error);
                tracing::error!(platform = %platform_name, error, "definition delete failed");
            } else {
                println!("Connection deleted successfully!");
            }
        }

        fsio::remove(&platform_dir).await?;
        println!("{} deleted successfully!", name);
        tracing::info!(platform = %platform_name, "deleted");
        report.succeeded += 1;
    }

    report.print("deleted");
    Ok(report)
}

/// Delete every row of a child collection belonging to a connection
/// definition, reporting how many went through
async fn delete_definition_children(
    ctx: &SyncContext,
    collection: &str,
    label: &str,
    definition_id: &str,
) -> Result<()> {
    let rows = ctx
        .api
        .get_all_rows(
            collection,
            &[("connectionDefinitionId", definition_id.to_string())],
        )
        .await?;
    println!("Total {} to be deleted: {}", label, rows.len());

    let mut deleted = 0usize;
    for row in &rows {
        let Some(id) = row.get("_id").and_then(Value::as_str) else {
            continue;
        };
        let response = ctx.api.delete(&format!("{}/{}", collection, id)).await?;
        if let Some(error) = response.body.get("error").and_then(Value::as_str) {
            eprintln!("API Error: {}.", error);
            tracing::error!(collection, id, error, "delete failed");
            continue;
        }
        if response.body.get("_id").is_some() {
            deleted += 1;
        }
    }

    println!("{}/{} {} deleted successfully!", deleted, rows.len(), label);
    Ok(())
}
