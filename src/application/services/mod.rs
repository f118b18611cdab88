pub mod credential_resolver;
pub mod credential_store;

pub use credential_resolver::{CredentialResolver, OperationCredentials, ResolutionError};
pub use credential_store::{CredentialScope, CredentialStore};
