pub mod remote;
pub mod repository;
pub mod vcs_interface;

// Re-export main types for convenience
pub use remote::GitRemote;
pub use repository::GitRepository;
pub use vcs_interface::{
    CredentialProvider, OpenError, RemoteLookupError, TransportError, VcsRemote, VcsRepository,
};
