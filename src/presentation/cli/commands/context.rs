use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::application::services::credential_resolver::CredentialResolver;
use crate::application::services::credential_store::CredentialStore;
use crate::application::use_cases::sync_repositories::{
    SyncOperation, SyncRepositoriesConfig, SyncRepositoriesUseCase,
};
use crate::common::result::RepoSyncResult;
use crate::domain::entities::outcome::SyncReport;
use crate::infrastructure::filesystem::config_store::{ConfigStore, SyncSettings};
use crate::infrastructure::filesystem::repository_catalog::RepositoryCatalog;
use crate::infrastructure::git::repository::GitRepository;
use crate::infrastructure::terminal::TerminalPrompter;
use crate::presentation::cli::{
    CatalogArgs, TransferArgs, EXIT_REPOSITORY_FAILURE, EXIT_SUCCESS,
};

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub remote: Option<String>,
    pub username: Option<String>,
    /// Merged with the file's exclude list
    pub exclude: Vec<String>,
    pub fail_fast: bool,
}

impl SettingsOverrides {
    pub fn from_args(catalog: &CatalogArgs, transfer: Option<&TransferArgs>) -> Self {
        Self {
            remote: catalog.remote.clone(),
            username: transfer.and_then(|t| t.username.clone()),
            exclude: catalog.exclude.clone(),
            fail_fast: transfer.map(|t| t.fail_fast).unwrap_or(false),
        }
    }

    pub fn apply(&self, settings: &mut SyncSettings) {
        if let Some(remote) = &self.remote {
            settings.remote = remote.clone();
        }
        if let Some(username) = &self.username {
            settings.username = Some(username.clone());
        }
        for name in &self.exclude {
            if !settings.exclude.contains(name) {
                settings.exclude.push(name.clone());
            }
        }
        settings.stop_on_first_error |= self.fail_fast;
    }
}

/// Settings and catalog shared by every subcommand
#[derive(Debug)]
pub struct CommandContext {
    settings: SyncSettings,
    catalog: RepositoryCatalog<GitRepository>,
}

impl CommandContext {
    /// Load settings, apply overrides and build the sorted catalog.
    ///
    /// Every error returned here is a configuration error.
    pub fn prepare(
        root: &Path,
        config: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> RepoSyncResult<Self> {
        let mut settings = ConfigStore::new().load(config, root)?;
        overrides.apply(&mut settings);
        settings.validate()?;

        let mut catalog = RepositoryCatalog::open_git(root, &settings.exclude)?;
        catalog.sort_by_name();
        info!(
            root = %root.display(),
            repositories = catalog.len(),
            open_failures = catalog.open_failures().len(),
            remote = %settings.remote,
            "catalog ready"
        );

        Ok(Self { settings, catalog })
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &RepositoryCatalog<GitRepository> {
        &self.catalog
    }

    /// Run the operation over the catalog, prompting on the terminal
    pub fn sync(&self, operation: &SyncOperation, dry_run: bool) -> SyncReport {
        let config = SyncRepositoriesConfig::default()
            .with_remote(self.settings.remote.clone())
            .with_stop_on_first_error(self.settings.stop_on_first_error)
            .with_on_missing_remote(self.settings.on_missing_remote)
            .with_dry_run(dry_run);

        let store = CredentialStore::new(self.settings.credential_scope)
            .with_default_username(self.settings.username.clone());
        let mut resolver = CredentialResolver::new(store, TerminalPrompter::new())
            .with_max_attempts(self.settings.max_auth_attempts);

        SyncRepositoriesUseCase::new(config)
            .execute(self.catalog.repositories(), operation, &mut resolver)
            .with_open_failures(self.catalog.open_failures().to_vec())
    }
}

/// Exit code for a finished report
pub fn report_exit_code(report: &SyncReport) -> i32 {
    if report.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_REPOSITORY_FAILURE
    }
}
