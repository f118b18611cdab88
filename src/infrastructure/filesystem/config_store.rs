use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::application::services::credential_resolver::DEFAULT_MAX_AUTH_ATTEMPTS;
use crate::application::services::credential_store::CredentialScope;
use crate::application::use_cases::sync_repositories::MissingRemotePolicy;
use crate::common::error::RepoSyncError;

/// File names looked up in the root directory when no path is given
pub const DEFAULT_CONFIG_FILE_NAMES: [&str; 2] = ["reposync.yml", "reposync.yaml"];

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file not found at path: {0}")]
    ConfigFileNotFound(String),

    #[error("Configuration file read failed: {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing failed in {path}: {source}")]
    YamlParsingFailed {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(#[from] validator::ValidationErrors),
}

impl From<ConfigStoreError> for RepoSyncError {
    fn from(error: ConfigStoreError) -> Self {
        match error {
            ConfigStoreError::ConfigFileNotFound(path) => RepoSyncError::config_error(
                format!("configuration file not found: {}", path),
                Some(PathBuf::from(path)),
            ),
            ConfigStoreError::ValidationFailed(errors) => errors.into(),
            other => {
                let message = other.to_string();
                RepoSyncError::config_error_with_source(message, None, other)
            }
        }
    }
}

/// Settings read from `reposync.yml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// Remote name to sync with
    #[validate(length(min = 1, max = 255))]
    pub remote: String,

    /// Username used when the remote URL carries none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Directory names to skip
    pub exclude: Vec<String>,

    pub stop_on_first_error: bool,

    pub on_missing_remote: MissingRemotePolicy,

    pub credential_scope: CredentialScope,

    /// Credential requests allowed per operation
    #[validate(range(min = 1, max = 10))]
    pub max_auth_attempts: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            username: None,
            exclude: Vec::new(),
            stop_on_first_error: false,
            on_missing_remote: MissingRemotePolicy::default(),
            credential_scope: CredentialScope::default(),
            max_auth_attempts: DEFAULT_MAX_AUTH_ATTEMPTS,
        }
    }
}

/// Loads YAML settings files
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Find the settings file for `root`, if any
    pub fn discover<P: AsRef<Path>>(&self, root: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Read and validate a settings file
    pub fn read_settings<P: AsRef<Path>>(
        &self,
        config_path: P,
    ) -> Result<SyncSettings, ConfigStoreError> {
        let config_path = config_path.as_ref();
        let shown_path = config_path.display().to_string();

        if !config_path.exists() {
            return Err(ConfigStoreError::ConfigFileNotFound(shown_path));
        }

        let content = fs::read_to_string(config_path).map_err(|source| {
            ConfigStoreError::ReadFailed {
                path: shown_path.clone(),
                source,
            }
        })?;

        // An empty file means "all defaults"
        let settings: SyncSettings = if content.trim().is_empty() {
            SyncSettings::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| {
                ConfigStoreError::YamlParsingFailed {
                    path: shown_path.clone(),
                    source,
                }
            })?
        };

        settings.validate()?;
        debug!(path = %shown_path, "loaded settings");
        Ok(settings)
    }

    /// Load settings from an explicit path, else from the root, else defaults.
    ///
    /// An explicit path that does not exist is an error; a missing file in
    /// the root is not.
    pub fn load<P: AsRef<Path>>(
        &self,
        explicit: Option<&Path>,
        root: P,
    ) -> Result<SyncSettings, ConfigStoreError> {
        match explicit {
            Some(path) => self.read_settings(path),
            None => match self.discover(root) {
                Some(path) => self.read_settings(path),
                None => Ok(SyncSettings::default()),
            },
        }
    }
}
