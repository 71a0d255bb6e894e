//! Synchronization flows between the workspace and the remote API
//!
//! Every flow runs strictly sequentially: one remote call, one file write
//! at a time. Failures are contained at the entity boundary: the item is
//! reported and counted, its siblings continue. Only configuration and
//! local-JSON parse failures abort a whole command.

pub mod delete;
pub mod entity;
pub mod list;
pub mod pull;
pub mod push;
pub mod scaffold;
pub mod validate;

use crate::api::ApiClient;
use crate::fsio;
use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Everything a flow needs, constructed once per command invocation and
/// passed by reference
pub struct SyncContext {
    pub settings: Settings,
    pub api: ApiClient,
    pub root: PathBuf,
}

impl SyncContext {
    pub fn new(settings: Settings, api: ApiClient, root: PathBuf) -> Self {
        Self {
            settings,
            api,
            root,
        }
    }

    pub fn common_models_dir(&self) -> PathBuf {
        fsio::join_slash_path(&self.root, &self.settings.paths.common_models)
    }

    pub fn common_enums_dir(&self) -> PathBuf {
        fsio::join_slash_path(&self.root, &self.settings.paths.common_enums)
    }

    pub fn platforms_dir(&self) -> PathBuf {
        fsio::join_slash_path(&self.root, &self.settings.paths.platforms)
    }

    pub fn server_oauth_dir(&self) -> PathBuf {
        fsio::join_slash_path(&self.root, &self.settings.paths.server_o_auth)
    }

    pub fn templates_dir(&self) -> PathBuf {
        fsio::join_slash_path(&self.root, &self.settings.paths.templates)
    }

    pub fn platform_dir(&self, folder_name: &str) -> PathBuf {
        self.platforms_dir().join(folder_name)
    }
}

/// Which entities a command operates on
#[derive(Debug, Clone)]
pub enum Selection {
    All,
    Names(Vec<String>),
}

/// Counts reported at the end of every bulk flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub total: usize,
    pub succeeded: usize,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.succeeded)
    }

    /// Print the closing summary, e.g. `Successfully pulled: 3`
    pub fn print(&self, past_tense_verb: &str) {
        println!();
        println!("Successfully {}: {}", past_tense_verb, self.succeeded);
        println!("Failed: {}", self.failed());
    }
}

/// Resolve a path that may have been typed with the wrong casing
pub(crate) fn corrected_dir(path: &Path) -> PathBuf {
    crate::naming::case_corrected_path(path)
}

/// Malformed local JSON makes the whole document model untrustworthy, so
/// it aborts the command instead of being contained like a per-entity
/// remote failure
pub fn is_parse_failure(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<serde_json::Error>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failures_are_distinguished_from_remote_ones() {
        let parse: anyhow::Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(is_parse_failure(&parse.context("Malformed JSON in config.json")));

        assert!(!is_parse_failure(&anyhow::anyhow!("API Error: boom")));
    }

    #[test]
    fn report_counts_failures_from_the_total() {
        let report = SyncReport {
            total: 5,
            succeeded: 3,
        };
        assert_eq!(report.failed(), 2);
    }
}
