//! Push flows: compose local entity folders and upsert them remotely
//!
//! Every resource follows the same remote sequence: PATCH when a local
//! `_id` exists, fall back to POST when the PATCH answers 404 (the local
//! id is stale), POST outright when there is no id yet, and backfill the
//! assigned id into the local config file after a create. That sequence
//! lives in [`upsert_resource`]; the per-resource functions only differ in
//! which files they compose and which defaults they fill in.

use super::entity::{self, config_path};
use super::{corrected_dir, Selection, SyncContext, SyncReport};
use crate::fsio;
use crate::naming::{action_folder_name, to_pascal_case};
use crate::projection::compose_document;
use crate::settings::PushStructure;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Result of one create-or-update round trip
struct Upsert {
    id: String,
    created: bool,
    body: Value,
}

async fn upsert_resource(ctx: &SyncContext, collection: &str, data: &Value) -> Result<Upsert> {
    let local_id = data
        .get("_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    if let Some(id) = local_id {
        let response = ctx.api.patch(&format!("{}/{}", collection, id), data).await?;
        if response.is_success() {
            return Ok(Upsert {
                id,
                created: false,
                body: response.body,
            });
        }
        if !response.is_not_found() {
            bail!("API Error: {}", response.error_message());
        }
        // stale local id; fall through and create a fresh resource
    }

    let response = ctx.api.post(collection, data).await?;
    if !response.is_success() {
        bail!("API Error: {}", response.error_message());
    }
    let id = response
        .body
        .get("_id")
        .and_then(Value::as_str)
        .context("create response did not include an _id")?
        .to_string();

    Ok(Upsert {
        id,
        created: true,
        body: response.body,
    })
}

fn get_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn set_key(data: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = data {
        map.insert(key.to_string(), value);
    }
}

fn is_missing(data: &Value, key: &str) -> bool {
    match data.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Push common models to the remote API
pub async fn push_common_models(ctx: &SyncContext, selection: &Selection) -> Result<SyncReport> {
    push_named_entities(
        ctx,
        "v1/common-models",
        &ctx.settings.push_structures.common_models,
        &ctx.common_models_dir(),
        selection,
        "model",
    )
    .await
}

/// Push common enums to the remote API
pub async fn push_common_enums(ctx: &SyncContext, selection: &Selection) -> Result<SyncReport> {
    push_named_entities(
        ctx,
        "v1/common-enums",
        &ctx.settings.push_structures.common_enums,
        &ctx.common_enums_dir(),
        selection,
        "enum",
    )
    .await
}

async fn push_named_entities(
    ctx: &SyncContext,
    collection: &str,
    structure: &PushStructure,
    base_dir: &Path,
    selection: &Selection,
    kind: &str,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    tracing::info!(collection, "starting push");

    let names = match selection {
        Selection::All => {
            let local = fsio::list_subdirectories(base_dir).await.unwrap_or_default();
            if local.is_empty() {
                eprintln!("No {}s available to push!", kind);
            }
            local
        }
        Selection::Names(names) => names.clone(),
    };

    report.total = names.len();
    println!("Total: {}", report.total);
    println!();

    for name in &names {
        tracing::info!(%name, "pushing");
        let entity_dir = base_dir.join(name);
        if !fsio::exists(&entity_dir).await {
            eprintln!("{} does not exist!", name);
            continue;
        }

        match push_one_entity(ctx, collection, structure, &entity_dir, name).await {
            Ok(()) => report.succeeded += 1,
            Err(error) if super::is_parse_failure(&error) => return Err(error),
            Err(error) => {
                eprintln!("{}", format!("{}: {:#}", name, error).red());
                tracing::error!(%name, %error, "push failed");
            }
        }
    }

    report.print("pushed");
    Ok(report)
}

async fn push_one_entity(
    ctx: &SyncContext,
    collection: &str,
    structure: &PushStructure,
    entity_dir: &Path,
    name: &str,
) -> Result<()> {
    let data = compose_document(entity_dir, structure).await?;
    let outcome = upsert_resource(ctx, collection, &data).await?;

    if outcome.created {
        entity::update_json_file(&config_path(entity_dir), &[("_id", json!(outcome.id))]).await?;
        println!("{} added! Config file has been updated with the id.", name);
    } else {
        println!("{} updated!", name);
    }

    Ok(())
}

/// Push whole platforms: connection definition, platform record, OAuth
/// definition, then every model schema and action
pub async fn push_platforms(
    ctx: &SyncContext,
    selection: &Selection,
    set_active: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    tracing::info!("starting platform push");

    let platforms_dir = ctx.platforms_dir();
    let names = match selection {
        Selection::All => {
            let local = fsio::list_subdirectories(&platforms_dir)
                .await
                .unwrap_or_default();
            if local.is_empty() {
                eprintln!("No platforms available to push!");
            }
            local
        }
        Selection::Names(names) => names.clone(),
    };

    report.total = names.len();
    println!("Total: {}", report.total);
    println!();

    for name in &names {
        tracing::info!(platform = %name, "pushing");
        let platform_dir = platforms_dir.join(name);
        if !fsio::exists(&platform_dir).await {
            eprintln!("{} does not exist!", name);
            tracing::error!(platform = %name, "platform folder missing");
            continue;
        }

        println!("{}", name.green());
        match sync_platform(ctx, &platform_dir, name, set_active).await {
            Ok(()) => report.succeeded += 1,
            Err(error) => {
                eprintln!("{}", format!("{:#}", error).red());
                tracing::error!(platform = %name, %error, "push failed");
            }
        }
        println!();
    }

    report.print("pushed");
    tracing::info!("finished platform push");
    Ok(report)
}

async fn sync_platform(
    ctx: &SyncContext,
    platform_dir: &Path,
    platform_name: &str,
    set_active: bool,
) -> Result<()> {
    let connection_definition = sync_connection_definition(ctx, platform_dir)
        .await
        .context("Connection Definition")?;
    println!("Connection Definition: Pushed");
    let definition_id = get_str(&connection_definition, "_id")
        .context("connection definition id unavailable after push")?;

    let platform_id = sync_connection_platform(ctx, platform_dir, &definition_id)
        .await
        .context("Connection Platform")?;
    println!("Connection Platform: Pushed");

    match sync_oauth_definition(ctx, platform_dir).await {
        Ok(true) => println!("OAuth Connection Definition: Pushed"),
        Ok(false) => {}
        Err(error) => {
            eprintln!(
                "{}",
                format!("OAuth Connection Definition: {:#}", error).red()
            );
            tracing::error!(%error, "oauth definition push failed");
        }
    }

    let models_dir = platform_dir.join("models");
    if !fsio::exists(&models_dir).await {
        eprintln!("{} does not have any model data!", platform_name);
        tracing::error!(platform = platform_name, "no model data");
        return Ok(());
    }

    let model_folders = fsio::list_subdirectories(&models_dir).await?;
    println!("Total Models: {}", model_folders.len());

    let mut schemas_pushed = 0usize;
    let mut actions_pushed = 0usize;

    for model_folder in &model_folders {
        println!("{}:", model_folder);
        let model_dir = models_dir.join(model_folder);

        let schema_id = match sync_platform_schema(
            ctx,
            platform_name,
            &model_dir,
            &definition_id,
            &platform_id,
            model_folder,
        )
        .await
        {
            Ok(id) => id,
            Err(error) if super::is_parse_failure(&error) => return Err(error),
            Err(error) => {
                let skipped = count_actions(&model_dir.join("actions")).await;
                eprintln!("\tSchema: {}", format!("{:#}", error).red());
                eprintln!("\tActions: {}", format!("{} actions skipped", skipped).red());
                tracing::error!(model = %model_folder, %error, "schema skipped");
                tracing::warn!(model = %model_folder, skipped, "actions skipped");
                continue;
            }
        };

        schemas_pushed += 1;
        println!("\tSchema: Pushed");

        let actions_dir = model_dir.join("actions");
        if fsio::exists(&actions_dir).await {
            let action_folders = fsio::list_subdirectories(&actions_dir).await?;
            let mut current_pushed = 0usize;

            for action_folder in &action_folders {
                let action_dir = actions_dir.join(action_folder);
                match sync_platform_action(
                    ctx,
                    platform_name,
                    action_folder,
                    &action_dir,
                    &connection_definition,
                    set_active,
                    &platform_id,
                    &schema_id,
                )
                .await
                {
                    Ok(()) => {
                        actions_pushed += 1;
                        current_pushed += 1;
                    }
                    Err(error) if super::is_parse_failure(&error) => return Err(error),
                    Err(error) => {
                        eprintln!(
                            "\tAction {}: {}",
                            action_folder,
                            format!("{:#}", error).red()
                        );
                        tracing::error!(action = %action_folder, %error, "action push failed");
                    }
                }
            }

            println!("\tActions: {}/{} Pushed", current_pushed, action_folders.len());
        }
    }

    println!(
        "Pushed {} schemas and {} actions.",
        schemas_pushed, actions_pushed
    );

    Ok(())
}

async fn count_actions(actions_dir: &Path) -> usize {
    if fsio::exists(actions_dir).await {
        fsio::list_subdirectories(actions_dir)
            .await
            .map(|dirs| dirs.len())
            .unwrap_or(0)
    } else {
        0
    }
}

/// Push the connection definition and return the composed document with
/// its final remote id merged in
async fn sync_connection_definition(ctx: &SyncContext, platform_dir: &Path) -> Result<Value> {
    let mut data = compose_document(
        platform_dir,
        &ctx.settings.push_structures.platform.connection_definition,
    )
    .await?;

    let outcome = upsert_resource(ctx, "v1/connection-definitions", &data).await?;
    if outcome.created {
        let config_file = platform_dir.join("configs").join("connection-definition.json");
        entity::update_json_file(&config_file, &[("_id", json!(outcome.id.clone()))]).await?;
    }
    set_key(&mut data, "_id", json!(outcome.id));

    Ok(data)
}

/// Push the platform record and return its remote id
async fn sync_connection_platform(
    ctx: &SyncContext,
    platform_dir: &Path,
    definition_id: &str,
) -> Result<String> {
    let mut data = compose_document(platform_dir, &ctx.settings.push_structures.platform.platform)
        .await?;
    let config_file = platform_dir.join("configs").join("connection-platform.json");

    if is_missing(&data, "connectionDefinitionId") {
        set_key(&mut data, "connectionDefinitionId", json!(definition_id));
        if fsio::exists(&config_file).await {
            entity::update_json_file(
                &config_file,
                &[("connectionDefinitionId", json!(definition_id))],
            )
            .await?;
        }
    }

    let outcome = upsert_resource(ctx, "v1/platforms", &data).await?;
    if outcome.created {
        entity::update_json_file(&config_file, &[("_id", json!(outcome.id.clone()))]).await?;
    }

    Ok(outcome.id)
}

/// Push the OAuth definition when the platform has one. Returns false
/// when there is no local OAuth config to push.
async fn sync_oauth_definition(ctx: &SyncContext, platform_dir: &Path) -> Result<bool> {
    let oauth_file = platform_dir.join("configs").join("oauth.json");
    if !fsio::exists(&oauth_file).await {
        return Ok(false);
    }

    let data = compose_document(
        platform_dir,
        &ctx.settings.push_structures.platform.oauth_connection_definition,
    )
    .await?;

    let outcome = upsert_resource(ctx, "v1/connection-oauth-definitions", &data).await?;
    if outcome.created {
        entity::update_json_file(&oauth_file, &[("_id", json!(outcome.id))]).await?;
    }

    Ok(true)
}

/// Push one model schema (and its platform page) and return the schema's
/// remote id
async fn sync_platform_schema(
    ctx: &SyncContext,
    platform_name: &str,
    model_dir: &Path,
    definition_id: &str,
    platform_id: &str,
    model_name: &str,
) -> Result<String> {
    let mut data = compose_document(model_dir, &ctx.settings.push_structures.platform.schemas)
        .await?;
    let config_file = config_path(model_dir);

    if is_missing(&data, "connectionDefinitionId") {
        set_key(&mut data, "connectionDefinitionId", json!(definition_id));
    }
    if is_missing(&data, "platformId") {
        set_key(&mut data, "platformId", json!(platform_id));
    }
    normalize_mapping(&mut data);

    let page_file = model_dir.join("page.json");
    let page_id = if fsio::exists(&page_file).await {
        let page_data =
            compose_document(model_dir, &ctx.settings.push_structures.platform.schema_page)
                .await?;
        let outcome = upsert_resource(ctx, "v1/platform-pages", &page_data).await?;
        if outcome.created {
            entity::update_json_file(&page_file, &[("_id", json!(outcome.id.clone()))]).await?;
        }
        outcome.id
    } else {
        let seed = [
            ("platformName", json!(platform_name)),
            ("platformId", json!(platform_id)),
            ("connectionDefinitionId", json!(definition_id)),
            (
                "modelName",
                data.get("modelName").cloned().unwrap_or_else(|| json!("")),
            ),
        ];
        let page_data = page_from_statics(&ctx.settings.statics.schema_page_content, &seed);

        let response = ctx.api.post("v1/platform-pages", &page_data).await?;
        if !response.is_success() {
            bail!("API Error: {}", response.error_message());
        }
        let id = get_str(&response.body, "_id")
            .context("page create response did not include an _id")?;

        let mut stored = page_data;
        set_key(&mut stored, "_id", json!(id.clone()));
        fsio::write_json(&page_file, &stored).await?;

        if !fsio::exists(&config_file).await {
            bail!("Config file does not exist!");
        }
        entity::update_json_file(
            &config_file,
            &[
                ("platformPageId", json!(id.clone())),
                ("platformId", json!(platform_id)),
                ("connectionDefinitionId", json!(definition_id)),
            ],
        )
        .await?;

        id
    };
    set_key(&mut data, "platformPageId", json!(page_id.clone()));

    let outcome = upsert_resource(ctx, "v1/connection-model-schemas", &data).await?;
    if outcome.created {
        if !fsio::exists(&config_file).await {
            bail!("Config file does not exist!");
        }
        let version = outcome.body.get("version").cloned().unwrap_or(Value::Null);
        entity::update_json_file(
            &config_file,
            &[("_id", json!(outcome.id.clone())), ("version", version)],
        )
        .await?;
    }

    update_page(
        ctx,
        &page_file,
        &[
            ("type", json!("schema")),
            ("connectionModelSchemaId", json!(outcome.id.clone())),
        ],
    )
    .await?;

    tracing::info!(model = model_name, schema = %outcome.id, "schema pushed");
    Ok(outcome.id)
}

/// Push one action definition (and its platform page), renaming the local
/// folder when the canonical name changed
#[allow(clippy::too_many_arguments)]
async fn sync_platform_action(
    ctx: &SyncContext,
    platform_name: &str,
    current_folder: &str,
    action_dir: &Path,
    connection_definition: &Value,
    set_active: bool,
    platform_id: &str,
    schema_id: &str,
) -> Result<()> {
    let mut data = compose_document(action_dir, &ctx.settings.push_structures.platform.actions)
        .await?;
    let config_file = action_dir.join("definition").join("config.json");

    if is_missing(&data, "connectionDefinitionId") {
        let definition_id = connection_definition.get("_id").cloned().unwrap_or(Value::Null);
        set_key(&mut data, "connectionDefinitionId", definition_id.clone());
        if fsio::exists(&config_file).await {
            entity::update_json_file(&config_file, &[("connectionDefinitionId", definition_id)])
                .await?;
        }
    }

    if is_missing(&data, "authMethod") {
        let auth_method = connection_definition
            .get("authMethod")
            .cloned()
            .unwrap_or(Value::Null);
        set_key(&mut data, "authMethod", auth_method.clone());
        if fsio::exists(&config_file).await {
            entity::update_json_file(&config_file, &[("authMethod", auth_method)]).await?;
        }
    }

    if normalize_mapping(&mut data) && fsio::exists(&config_file).await {
        entity::update_json_file(&config_file, &[("mapping", Value::Null)]).await?;
    }

    if set_active {
        set_key(&mut data, "active", json!(true));
    }

    let page_file = action_dir.join("definition").join("page.json");
    let page_id = if fsio::exists(&page_file).await {
        let page_data =
            compose_document(action_dir, &ctx.settings.push_structures.platform.action_page)
                .await?;
        let outcome = upsert_resource(ctx, "v1/platform-pages", &page_data).await?;
        if outcome.created {
            entity::update_json_file(&page_file, &[("_id", json!(outcome.id.clone()))]).await?;
        }
        outcome.id
    } else {
        let seed = [
            ("platformName", json!(platform_name)),
            ("platformId", json!(platform_id)),
            (
                "connectionDefinitionId",
                connection_definition.get("_id").cloned().unwrap_or(Value::Null),
            ),
            ("connectionModelSchemaId", json!(schema_id)),
            (
                "modelName",
                data.get("modelName").cloned().unwrap_or_else(|| json!("")),
            ),
        ];
        let page_data = page_from_statics(&ctx.settings.statics.action_page_content, &seed);

        let response = ctx.api.post("v1/platform-pages", &page_data).await?;
        if !response.is_success() {
            bail!("API Error: {}", response.error_message());
        }
        let id = get_str(&response.body, "_id")
            .context("page create response did not include an _id")?;

        let mut stored = page_data;
        set_key(&mut stored, "_id", json!(id.clone()));
        fsio::write_json(&page_file, &stored).await?;

        id
    };
    set_key(&mut data, "platformPageId", json!(page_id));

    let outcome = upsert_resource(ctx, "v1/connection-model-definitions", &data).await?;
    if outcome.created {
        if fsio::exists(&config_file).await {
            entity::update_json_file(&config_file, &[("_id", json!(outcome.id.clone()))]).await?;
        }
        // the remote may have normalized the display name
        if let Some(name) = get_str(&outcome.body, "name") {
            set_key(&mut data, "name", json!(name));
        }
    }

    update_page(
        ctx,
        &page_file,
        &[
            ("type", json!("action")),
            ("connectionModelSchemaId", json!(schema_id)),
            ("connectionModelDefinitionId", json!(outcome.id.clone())),
        ],
    )
    .await?;

    // keep the local folder name canonical: kebab-cased name + id suffix
    let display_name = get_str(&data, "name").unwrap_or_default();
    let canonical = action_folder_name(&display_name, &outcome.id);
    if canonical != current_folder {
        let parent = action_dir
            .parent()
            .context("action folder has no parent")?;
        fsio::rename(action_dir, &parent.join(&canonical)).await?;
    }

    Ok(())
}

/// A mapping without a commonModelName is meaningless remotely; null it
/// out. Returns true when the document was changed.
fn normalize_mapping(data: &mut Value) -> bool {
    let has_common_model = data
        .get("mapping")
        .and_then(|mapping| mapping.get("commonModelName"))
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    if !has_common_model && !matches!(data.get("mapping"), None | Some(Value::Null)) {
        set_key(data, "mapping", Value::Null);
        return true;
    }
    false
}

fn page_from_statics(statics: &Map<String, Value>, seed: &[(&str, Value)]) -> Value {
    let mut page = Value::Object(statics.clone());
    for (key, value) in seed {
        set_key(&mut page, key, value.clone());
    }
    page
}

/// PATCH the page with the final linkage keys and persist the updated
/// document locally
async fn update_page(ctx: &SyncContext, page_file: &Path, updates: &[(&str, Value)]) -> Result<()> {
    let mut page_data = fsio::read_json(page_file).await?;
    if let Value::Object(map) = &mut page_data {
        for (key, value) in updates {
            map.insert(key.to_string(), value.clone());
        }
    }

    let page_id = get_str(&page_data, "_id").context("page document is missing its _id")?;
    let response = ctx
        .api
        .patch(&format!("v1/platform-pages/{}", page_id), &page_data)
        .await?;
    if !response.is_success() {
        bail!("API Error: {}", response.error_message());
    }

    fsio::write_json(page_file, &page_data).await
}

/// Push only the selected models (schemas and their actions) of one
/// platform that has itself been pushed before
pub async fn push_platform_models(
    ctx: &SyncContext,
    platform: &str,
    selection: &Selection,
    set_active: bool,
) -> Result<SyncReport> {
    let (platform_dir, connection_definition, definition_id, platform_id) =
        load_pushed_platform(ctx, platform).await?;

    let models_dir = platform_dir.join("models");
    let names = match selection {
        Selection::All => fsio::list_subdirectories(&models_dir).await.unwrap_or_default(),
        Selection::Names(names) => names.clone(),
    };

    let mut report = SyncReport {
        total: names.len(),
        succeeded: 0,
    };
    println!("Total: {}", report.total);
    println!();

    for model_folder in &names {
        println!("{}:", model_folder);
        let model_dir = models_dir.join(model_folder);
        if !fsio::exists(&model_dir).await {
            eprintln!("{} does not exist!", model_folder);
            continue;
        }

        let schema_id = match sync_platform_schema(
            ctx,
            platform,
            &model_dir,
            &definition_id,
            &platform_id,
            model_folder,
        )
        .await
        {
            Ok(id) => id,
            Err(error) if super::is_parse_failure(&error) => return Err(error),
            Err(error) => {
                eprintln!("\tSchema: {}", format!("{:#}", error).red());
                tracing::error!(model = %model_folder, %error, "schema push failed");
                continue;
            }
        };
        println!("\tSchema: Pushed");

        let actions_dir = model_dir.join("actions");
        if fsio::exists(&actions_dir).await {
            let action_folders = fsio::list_subdirectories(&actions_dir).await?;
            let mut pushed = 0usize;
            for action_folder in &action_folders {
                match sync_platform_action(
                    ctx,
                    platform,
                    action_folder,
                    &actions_dir.join(action_folder),
                    &connection_definition,
                    set_active,
                    &platform_id,
                    &schema_id,
                )
                .await
                {
                    Ok(()) => pushed += 1,
                    Err(error) if super::is_parse_failure(&error) => return Err(error),
                    Err(error) => {
                        eprintln!(
                            "\tAction {}: {}",
                            action_folder,
                            format!("{:#}", error).red()
                        );
                        tracing::error!(action = %action_folder, %error, "action push failed");
                    }
                }
            }
            println!("\tActions: {}/{} Pushed", pushed, action_folders.len());
        }

        report.succeeded += 1;
    }

    report.print("pushed");
    Ok(report)
}

/// Push only the selected actions of one model of a pushed platform
pub async fn push_platform_actions(
    ctx: &SyncContext,
    platform: &str,
    model: &str,
    selection: &Selection,
    set_active: bool,
) -> Result<SyncReport> {
    let (platform_dir, connection_definition, _definition_id, platform_id) =
        load_pushed_platform(ctx, platform).await?;

    let model_dir = platform_dir.join("models").join(model);
    if !fsio::exists(&model_dir).await {
        bail!("{} does not exist in {}!", model, platform);
    }
    let schema_id = entity::read_config_id(&model_dir)
        .await?
        .with_context(|| format!("{}: push the model schema first", model))?;

    let actions_dir = model_dir.join("actions");
    let names = match selection {
        Selection::All => fsio::list_subdirectories(&actions_dir).await.unwrap_or_default(),
        Selection::Names(names) => names.clone(),
    };

    let mut report = SyncReport {
        total: names.len(),
        succeeded: 0,
    };
    println!("Total: {}", report.total);
    println!();

    for action_folder in &names {
        let action_dir = actions_dir.join(action_folder);
        if !fsio::exists(&action_dir).await {
            eprintln!("{} does not exist!", action_folder);
            continue;
        }
        match sync_platform_action(
            ctx,
            platform,
            action_folder,
            &action_dir,
            &connection_definition,
            set_active,
            &platform_id,
            &schema_id,
        )
        .await
        {
            Ok(()) => {
                println!("{}: Pushed", action_folder);
                report.succeeded += 1;
            }
            Err(error) if super::is_parse_failure(&error) => return Err(error),
            Err(error) => {
                eprintln!("{}: {}", action_folder, format!("{:#}", error).red());
                tracing::error!(action = %action_folder, %error, "action push failed");
            }
        }
    }

    report.print("pushed");
    Ok(report)
}

/// Locate a platform folder (tolerating miscased names) and load the
/// identifiers a partial push needs from its configs
async fn load_pushed_platform(
    ctx: &SyncContext,
    platform: &str,
) -> Result<(PathBuf, Value, String, String)> {
    let platforms_dir = ctx.platforms_dir();
    let mut platform_dir = platforms_dir.join(platform);
    if !fsio::exists(&platform_dir).await {
        platform_dir = corrected_dir(&platforms_dir.join(to_pascal_case(platform)));
    }
    if !fsio::exists(&platform_dir).await {
        bail!("{} does not exist!", platform);
    }

    let connection_definition = compose_document(
        &platform_dir,
        &ctx.settings.push_structures.platform.connection_definition,
    )
    .await?;
    let definition_id = get_str(&connection_definition, "_id")
        .with_context(|| format!("{}: push the platform first", platform))?;

    let platform_config = platform_dir.join("configs").join("connection-platform.json");
    let platform_id = entity::read_id_from(&platform_config)
        .await?
        .with_context(|| format!("{}: push the platform first", platform))?;

    Ok((platform_dir, connection_definition, definition_id, platform_id))
}
