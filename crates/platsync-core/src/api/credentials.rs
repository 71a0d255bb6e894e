//! Credential resolution for the remote configuration API
//!
//! Precedence per value: process environment, then the workspace's user
//! configuration file, then the defaults shipped in the settings
//! document. The user configuration file is what `init` writes.

use crate::fsio;
use crate::settings::{ApiDefaults, Settings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "PLATSYNC_API_URL";
pub const API_SECRET_ENV: &str = "PLATSYNC_API_SECRET";
pub const BEARER_TOKEN_ENV: &str = "PLATSYNC_BEARER_TOKEN";

/// Fully resolved credentials handed to the API client
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub secret: String,
    pub bearer_token: String,
}

/// Workspace-local configuration file written by `init`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default)]
    pub env: ApiDefaults,
}

impl UserConfig {
    /// Location of the user configuration inside a workspace
    pub fn path(workspace_root: &Path, settings: &Settings) -> PathBuf {
        fsio::join_slash_path(workspace_root, &settings.paths.user_config)
    }

    /// Load the user configuration when present. A file that exists but
    /// does not parse is fatal: resolved credentials would be untrustworthy.
    pub fn load(workspace_root: &Path, settings: &Settings) -> Result<Self> {
        let path = Self::path(workspace_root, settings);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("User configuration {} is invalid", path.display()))
    }

    /// Write the configuration with the workspace's JSON conventions,
    /// replacing any existing file
    pub fn save(&self, workspace_root: &Path, settings: &Settings) -> Result<()> {
        let path = Self::path(workspace_root, settings);
        let value = serde_json::to_value(self).context("Failed to serialize configuration")?;
        std::fs::write(&path, fsio::to_pretty_json(&value))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

impl Credentials {
    /// Resolve credentials for a workspace. The API URL is required from
    /// one of the three sources; secret and bearer token may stay empty
    /// for endpoints that do not need them.
    pub fn resolve(workspace_root: &Path, settings: &Settings) -> Result<Self> {
        let user_config = UserConfig::load(workspace_root, settings)?;

        let url = pick(API_URL_ENV, &user_config.env.api_url, &settings.env.api_url)
            .context("No API URL configured; run `platsync init` or set PLATSYNC_API_URL")?;
        let secret =
            pick(API_SECRET_ENV, &user_config.env.api_secret, &settings.env.api_secret)
                .unwrap_or_default();
        let bearer_token = pick(
            BEARER_TOKEN_ENV,
            &user_config.env.bearer_token,
            &settings.env.bearer_token,
        )
        .unwrap_or_default();

        Ok(Self {
            url,
            secret,
            bearer_token,
        })
    }
}

fn pick(env_var: &str, user_value: &Option<String>, default_value: &Option<String>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| user_value.clone())
        .or_else(|| default_value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn user_config_round_trips_and_takes_precedence_over_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::builtin().unwrap();

        let config = UserConfig {
            env: ApiDefaults {
                api_url: Some("http://api.test:9000".into()),
                api_secret: Some("s3cret".into()),
                bearer_token: None,
            },
        };
        config.save(dir.path(), &settings).unwrap();

        let loaded = UserConfig::load(dir.path(), &settings).unwrap();
        assert_eq!(loaded.env.api_url.as_deref(), Some("http://api.test:9000"));

        let credentials = Credentials::resolve(dir.path(), &settings).unwrap();
        assert_eq!(credentials.url, "http://api.test:9000");
        assert_eq!(credentials.secret, "s3cret");
        // settings default fills the gap
        assert_eq!(credentials.bearer_token, "");
    }

    #[test]
    fn invalid_user_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::builtin().unwrap();
        let path = UserConfig::path(dir.path(), &settings);
        std::fs::write(&path, "{ broken").unwrap();

        assert!(UserConfig::load(dir.path(), &settings).is_err());
    }
}
