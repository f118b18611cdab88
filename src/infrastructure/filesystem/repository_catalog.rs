use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::common::error::RepoSyncError;
use crate::common::result::RepoSyncResult;
use crate::domain::entities::outcome::OpenFailure;
use crate::infrastructure::git::repository::GitRepository;
use crate::infrastructure::git::vcs_interface::{OpenError, VcsRepository};

/// Repositories found directly under a root directory.
///
/// Directories that fail to open are kept aside in `open_failures` and never
/// appear in `repositories`.
#[derive(Debug)]
pub struct RepositoryCatalog<R> {
    root: PathBuf,
    repositories: Vec<R>,
    open_failures: Vec<OpenFailure>,
}

impl RepositoryCatalog<GitRepository> {
    /// Build a catalog of git repositories under `root`
    pub fn open_git<P: AsRef<Path>>(root: P, exclude: &[String]) -> RepoSyncResult<Self> {
        Self::build(root, exclude, |path| GitRepository::open(path))
    }
}

impl<R: VcsRepository> RepositoryCatalog<R> {
    /// Enumerate the immediate subdirectories of `root` and open each one.
    ///
    /// Names starting with `.`, excluded names and non-directories are
    /// skipped. Entries are kept in filesystem order.
    pub fn build<P, F>(root: P, exclude: &[String], mut open: F) -> RepoSyncResult<Self>
    where
        P: AsRef<Path>,
        F: FnMut(&Path) -> Result<R, OpenError>,
    {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(RepoSyncError::config_error(
                format!("root is not a directory: {}", root.display()),
                Some(root),
            ));
        }

        let mut repositories = Vec::new();
        let mut open_failures = Vec::new();

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    if path == root {
                        return Err(unreadable_root(root, err));
                    }
                    let name = dir_name(&path);
                    if is_skipped_name(&name, exclude) {
                        debug!(repository = %name, "skipping excluded directory");
                        continue;
                    }
                    if is_dangling_link(&path, &err) {
                        debug!(repository = %name, "skipping dangling symlink");
                        continue;
                    }
                    warn!(repository = %name, error = %err, "cannot read directory entry");
                    open_failures.push(OpenFailure {
                        name,
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_skipped_name(&name, exclude) {
                debug!(repository = %name, "skipping excluded directory");
                continue;
            }
            if !entry.file_type().is_dir() {
                continue;
            }

            match open(entry.path()) {
                Ok(repository) => repositories.push(repository),
                Err(err) => {
                    warn!(repository = %name, error = %err, "cannot open repository");
                    open_failures.push(OpenFailure {
                        name,
                        path: entry.path().to_path_buf(),
                        message: err.to_string(),
                    });
                }
            }
        }

        debug!(
            root = %root.display(),
            repositories = repositories.len(),
            open_failures = open_failures.len(),
            "catalog built"
        );

        Ok(Self {
            root,
            repositories,
            open_failures,
        })
    }

    /// Order repositories and open failures by name
    pub fn sort_by_name(&mut self) {
        self.repositories.sort_by(|a, b| a.name().cmp(b.name()));
        self.open_failures.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repositories(&self) -> &[R] {
        &self.repositories
    }

    pub fn open_failures(&self) -> &[OpenFailure] {
        &self.open_failures
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn into_parts(self) -> (Vec<R>, Vec<OpenFailure>) {
        (self.repositories, self.open_failures)
    }
}

/// Hidden names and names listed in `exclude`
fn is_skipped_name(name: &str, exclude: &[String]) -> bool {
    name.starts_with('.') || exclude.iter().any(|e| e == name)
}

/// A symlink whose target does not exist is not a directory
fn is_dangling_link(path: &Path, err: &walkdir::Error) -> bool {
    let target_missing = err
        .io_error()
        .map_or(false, |e| e.kind() == io::ErrorKind::NotFound);
    let is_link = path
        .symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    target_missing && is_link
}

/// An existing root that cannot be listed is reported like a missing one
fn unreadable_root(
    root: PathBuf,
    source: impl std::error::Error + Send + Sync + 'static,
) -> RepoSyncError {
    let message = format!("cannot read root directory {}", root.display());
    RepoSyncError::config_error_with_source(message, Some(root), source)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
