use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::entities::outcome::OpenFailure;
use crate::infrastructure::git::vcs_interface::VcsRepository;

/// One repository as shown by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryListing {
    pub name: String,
    pub path: PathBuf,
    /// Redacted URL of the selected remote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub branches: Vec<String>,
    /// Why the remote or branches could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// Catalog contents without contacting any remote
#[derive(Debug, Clone, Serialize)]
pub struct CatalogListing {
    pub root: PathBuf,
    pub remote: String,
    pub repositories: Vec<RepositoryListing>,
    pub open_failures: Vec<OpenFailure>,
}

impl CatalogListing {
    pub fn build<R: VcsRepository>(
        root: &Path,
        remote: &str,
        repositories: &[R],
        open_failures: &[OpenFailure],
    ) -> Self {
        let repositories = repositories
            .iter()
            .map(|repository| {
                let mut problems = Vec::new();

                let remote_url = match repository.remote(remote) {
                    Ok(handle) => Some(handle.url().redacted().to_string()),
                    Err(e) => {
                        problems.push(e.to_string());
                        None
                    }
                };

                let branches = repository.local_branch_names().unwrap_or_else(|e| {
                    problems.push(e.to_string());
                    Vec::new()
                });

                RepositoryListing {
                    name: repository.name().to_string(),
                    path: repository.path().to_path_buf(),
                    remote_url,
                    branches,
                    problem: (!problems.is_empty()).then(|| problems.join("; ")),
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            remote: remote.to_string(),
            repositories,
            open_failures: open_failures.to_vec(),
        }
    }
}
