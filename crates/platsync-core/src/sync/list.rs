//! List flows: print remote inventories sorted by name

use super::SyncContext;
use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

pub async fn list_common_models(ctx: &SyncContext) -> Result<()> {
    list_rows(ctx, "v1/common-models", "Common Models").await
}

pub async fn list_common_enums(ctx: &SyncContext) -> Result<()> {
    list_rows(ctx, "v1/public/sdk/common-enums", "Common Enums").await
}

pub async fn list_platforms(ctx: &SyncContext) -> Result<()> {
    list_rows(ctx, "v1/public/connection-definitions", "Platforms").await
}

async fn list_rows(ctx: &SyncContext, collection: &str, heading: &str) -> Result<()> {
    let mut rows = ctx.api.get_all_rows(collection, &[]).await?;
    rows.sort_by(|a, b| {
        let left = a.get("name").and_then(Value::as_str).unwrap_or_default();
        let right = b.get("name").and_then(Value::as_str).unwrap_or_default();
        left.cmp(right)
    });

    println!("{}", heading.cyan().bold());
    for row in &rows {
        let name = row.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
        let id = row.get("_id").and_then(Value::as_str).unwrap_or("-");
        println!("  {}  {}", name, id.dimmed());
    }
    println!();
    println!("Total: {}", rows.len());

    Ok(())
}
