use git2::{BranchType, ErrorCode, Repository as Git2Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::infrastructure::git::remote::GitRemote;
use crate::infrastructure::git::vcs_interface::{
    OpenError, RemoteLookupError, VcsRemote, VcsRepository,
};

/// Name of the metadata directory inside a working tree
pub const METADATA_DIR: &str = ".git";

/// Local repository backed by libgit2
pub struct GitRepository {
    /// Directory name under the catalog root
    name: String,

    /// Working directory
    path: PathBuf,

    /// The underlying git2 repository
    repo: Git2Repository,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl GitRepository {
    /// Open the repository whose metadata lives at `<dir>/.git`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, OpenError> {
        let path = dir.as_ref().to_path_buf();
        let metadata_path = path.join(METADATA_DIR);

        if !metadata_path.exists() {
            return Err(OpenError::NotARepository {
                path: metadata_path,
            });
        }

        let repo = Git2Repository::open(&metadata_path).map_err(|e| OpenError::Unreadable {
            path: metadata_path.clone(),
            message: e.message().to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(repository = %name, path = %path.display(), "opened repository");

        Ok(Self { name, path, repo })
    }

    /// Access the underlying git2 repository
    pub fn inner(&self) -> &Git2Repository {
        &self.repo
    }
}

impl VcsRepository for GitRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn remote(&self, name: &str) -> Result<Box<dyn VcsRemote + '_>, RemoteLookupError> {
        let remote = self.repo.find_remote(name).map_err(|e| match e.code() {
            ErrorCode::NotFound => RemoteLookupError::NotFound(name.to_string()),
            _ => RemoteLookupError::Invalid {
                name: name.to_string(),
                message: e.message().to_string(),
            },
        })?;

        Ok(Box::new(GitRemote::new(name, remote)?))
    }

    fn local_branch_names(&self) -> Result<Vec<String>, OpenError> {
        let unreadable = |e: git2::Error| OpenError::Unreadable {
            path: self.path.clone(),
            message: e.message().to_string(),
        };

        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local)).map_err(unreadable)? {
            let (branch, _) = entry.map_err(unreadable)?;
            if let Some(name) = branch.name().map_err(unreadable)? {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}
