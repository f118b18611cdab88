//! On-disk git fixtures
//!
//! A fixture owns a temporary directory with two children: `root/`, the
//! directory handed to the catalog, and `remotes/`, which holds bare
//! repositories used as `origin` through the local transport.

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct RootFixture {
    _temp: TempDir,
    pub root: PathBuf,
    pub remotes: PathBuf,
}

impl RootFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        let remotes = temp.path().join("remotes");
        fs::create_dir_all(&root).expect("Failed to create root");
        fs::create_dir_all(&remotes).expect("Failed to create remotes dir");
        Self {
            _temp: temp,
            root,
            remotes,
        }
    }

    /// Repository under the root with one commit on `main` plus `branches`
    pub fn init_repository(&self, name: &str, branches: &[&str]) -> Repository {
        let repo = self.init_empty_repository(name);
        commit_file(&repo, "README.md", &format!("# {}\n", name), "initial commit");
        {
            let head = repo.head().unwrap().peel_to_commit().unwrap();
            for branch in branches {
                repo.branch(branch, &head, false).unwrap();
            }
        }
        repo
    }

    /// Repository under the root without any commit
    pub fn init_empty_repository(&self, name: &str) -> Repository {
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        Repository::init_opts(self.root.join(name), &options)
            .expect("Failed to init repository")
    }

    /// Bare repository under `remotes/`
    pub fn create_bare_remote(&self, name: &str) -> PathBuf {
        let path = self.remotes.join(format!("{}.git", name));
        let mut options = RepositoryInitOptions::new();
        options.bare(true).initial_head("main");
        Repository::init_opts(&path, &options).expect("Failed to init bare repository");
        path
    }

    /// Directory under the root that is not a repository
    pub fn add_plain_directory(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("notes.txt"), "not a repository\n").unwrap();
        path
    }

    pub fn repository_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

pub fn add_origin(repo: &Repository, url: &Path) {
    repo.remote("origin", url.to_str().unwrap())
        .expect("Failed to add origin");
}

pub fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Write `file`, stage it and commit on HEAD
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("bare repository").to_path_buf();
    fs::write(workdir.join(file), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parents: Vec<Commit<'_>> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Push branches straight through git2, bypassing reposync
pub fn push_branches(repo: &Repository, branches: &[&str]) {
    let mut remote = repo.find_remote("origin").unwrap();
    let refspecs: Vec<String> = branches
        .iter()
        .map(|b| format!("refs/heads/{}", b))
        .collect();
    remote.push(&refspecs, None).expect("Failed to push fixture");
}

/// Commit id a branch points to in a bare repository
pub fn bare_branch(bare: &Path, branch: &str) -> Option<Oid> {
    let repo = Repository::open_bare(bare).unwrap();
    let reference = repo.find_reference(&format!("refs/heads/{}", branch)).ok()?;
    reference.target()
}

/// Commit id of a remote-tracking branch in a working repository
pub fn tracking_branch(repo_path: &Path, branch: &str) -> Option<Oid> {
    let repo = Repository::open(repo_path).unwrap();
    let reference = repo
        .find_reference(&format!("refs/remotes/origin/{}", branch))
        .ok()?;
    reference.target()
}

/// Root with `A` (origin on a bare remote holding `main`), `B` (no origin)
/// and `C` (not a repository)
pub fn abc_fixture() -> RootFixture {
    let fixture = RootFixture::new();

    let a = fixture.init_repository("A", &[]);
    let bare = fixture.create_bare_remote("A");
    add_origin(&a, &bare);
    push_branches(&a, &["main"]);

    fixture.init_repository("B", &[]);
    fixture.add_plain_directory("C");
    fixture
}
