use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::application::services::credential_resolver::ResolutionError;
use crate::domain::entities::credential::{AuthScheme, Credential};
use crate::domain::entities::outcome::TransferStats;
use crate::domain::value_objects::branch_selection::Refspec;
use crate::domain::value_objects::remote_url::RemoteUrl;

/// Callback used by a transport to obtain credentials.
///
/// Arguments are the URL being contacted, the username embedded in that URL
/// (if any) and the authentication schemes the endpoint accepts. The
/// transport may call it several times during one operation.
pub type CredentialProvider<'a> =
    dyn FnMut(&str, Option<&str>, &[AuthScheme]) -> Result<Credential, ResolutionError> + 'a;

/// A directory could not be opened as a repository
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("no repository metadata at {}", .path.display())]
    NotARepository { path: PathBuf },

    #[error("failed to read repository at {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
}

/// Remote lookup errors
#[derive(Debug, Error)]
pub enum RemoteLookupError {
    #[error("remote not found: {0}")]
    NotFound(String),

    #[error("remote '{name}' is unusable: {message}")]
    Invalid { name: String, message: String },
}

/// Errors raised while talking to a remote
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Credential(#[from] ResolutionError),

    #[error("authentication rejected by {url}: {message}")]
    AuthenticationRejected { url: String, message: String },

    #[error("push of {reference} rejected: {message}")]
    PushRejected { reference: String, message: String },

    #[error("{operation} from {url} failed: {message}")]
    Failed {
        operation: &'static str,
        url: String,
        message: String,
    },
}

/// Read-only view of one local repository
pub trait VcsRepository {
    /// Directory name under the catalog root
    fn name(&self) -> &str;

    /// Working directory of the repository
    fn path(&self) -> &Path;

    /// Look up a remote by name
    fn remote(&self, name: &str) -> Result<Box<dyn VcsRemote + '_>, RemoteLookupError>;

    /// Local branch names in enumeration order
    fn local_branch_names(&self) -> Result<Vec<String>, OpenError>;
}

/// One named remote of a repository
pub trait VcsRemote {
    fn name(&self) -> &str;

    fn url(&self) -> &RemoteUrl;

    /// Download objects and update remote-tracking refs
    fn fetch(&mut self, credentials: &mut CredentialProvider<'_>)
        -> Result<TransferStats, TransportError>;

    /// Push all refspecs in a single exchange
    fn push(
        &mut self,
        refspecs: &[Refspec],
        credentials: &mut CredentialProvider<'_>,
    ) -> Result<(), TransportError>;
}
