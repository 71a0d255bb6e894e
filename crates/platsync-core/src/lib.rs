//! Platsync Core - Shared library for platform-configuration sync CLIs
//!
//! This library moves integration configuration (platforms, common
//! models, common enums, OAuth folders) between a local file-tree
//! workspace and a remote REST API. Everything is driven by one
//! declarative settings document; the binary crate only wires arguments
//! to the flows exposed here.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Mechanisms** - the structure materializer (`structure`),
//!   the document projector (`projection`), naming helpers (`naming`),
//!   and the file-system adapter (`fsio`)
//! - **Layer 2: Collaborators** - the typed settings document
//!   (`settings`) and the remote API client (`api`)
//! - **Layer 3: Flows** - pull/push/add/delete/list orchestration
//!   (`sync`), strictly sequential, containing failures per entity
//!
//! # Example Usage
//!
//! ```ignore
//! use platsync_core::{api, settings::Settings, sync};
//!
//! let settings = Settings::load(&workspace_root)?;
//! let credentials = api::Credentials::resolve(&workspace_root, &settings)?;
//! let client = api::ApiClient::new(&credentials)?;
//! let ctx = sync::SyncContext::new(settings, client, workspace_root);
//!
//! sync::pull::pull_common_models(&ctx, &sync::Selection::All, false).await?;
//! ```

pub mod api;
pub mod fsio;
pub mod naming;
pub mod projection;
pub mod settings;
pub mod structure;
pub mod sync;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, Credentials, UserConfig};
pub use settings::{Settings, SettingsError};
pub use sync::{Selection, SyncContext, SyncReport};
