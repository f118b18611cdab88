/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Git access through libgit2 (open, remotes, fetch, push)
/// - File system operations (repository catalog, settings file)
/// - Terminal prompts for credentials
pub mod filesystem;
pub mod git;
pub mod terminal;

// Re-export commonly used types
pub use filesystem::{ConfigStore, RepositoryCatalog};
pub use git::{GitRepository, VcsRemote, VcsRepository};
pub use terminal::{Prompter, TerminalPrompter};
