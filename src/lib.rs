//! # reposync - batch fetch and push for a directory of git repositories
//!
//! `reposync` treats every immediate subdirectory of a root directory as a git
//! repository and fetches or pushes all of them against one named remote,
//! asking for a password at most once per authentication scheme.
//!
//! ## Features
//!
//! - **Catalog**: Enumerate the repositories under a root, recording the ones that cannot be opened
//! - **Batch fetch / push**: Sequential processing with one outcome per repository
//! - **Credential cache**: Prompt once (no echo) and reuse the password for the whole run
//! - **Reports**: Colored text, JSON or YAML summaries with a meaningful exit code
//!
//! ## Quick Start
//!
//! ```bash
//! reposync list  --root ~/src
//! reposync fetch --root ~/src --exclude scratch
//! reposync push  --root ~/src --branches main,release
//! ```
//!
//! An optional `reposync.yml` in the root sets defaults:
//!
//! ```yaml
//! remote: origin
//! username: alice
//! exclude: [scratch]
//! credential_scope: run
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Credentials, outcomes, branch selection and remote URLs
//! - [`application`]: Credential store/resolver and the sync use case
//! - [`infrastructure`]: libgit2 access, the repository catalog, settings and terminal prompts
//! - [`presentation`]: CLI interface and report rendering
//! - [`common`]: Shared error handling
//!
//! ## Error Handling
//!
//! - [`common::error::RepoSyncError`]: Fatal errors raised before any repository is processed
//! - [`common::result::RepoSyncResult`]: Type alias for `Result<T, RepoSyncError>`
//!
//! Per-repository problems never abort a run; they become entries of the
//! [`domain::entities::outcome::SyncReport`].
//!
//! ## Examples
//!
//! ```rust,no_run
//! use reposync::application::services::{CredentialResolver, CredentialScope};
//! use reposync::application::use_cases::{
//!     SyncOperation, SyncRepositoriesConfig, SyncRepositoriesUseCase,
//! };
//! use reposync::infrastructure::{RepositoryCatalog, TerminalPrompter};
//!
//! # fn example() -> reposync::Result<()> {
//! let mut catalog = RepositoryCatalog::open_git("/home/me/src", &[])?;
//! catalog.sort_by_name();
//!
//! let mut resolver = CredentialResolver::with_scope(CredentialScope::Run, TerminalPrompter::new());
//! let use_case = SyncRepositoriesUseCase::new(SyncRepositoriesConfig::default());
//! let report = use_case.execute(catalog.repositories(), &SyncOperation::Fetch, &mut resolver);
//!
//! println!("{} of {} fetched", report.success_count(), report.outcomes.len());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::RepoSyncError;
pub use crate::common::result::RepoSyncResult as Result;
