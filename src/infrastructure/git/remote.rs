use git2::{Cred, CredentialType, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks};
use std::cell::RefCell;
use tracing::{debug, instrument};

use crate::application::services::credential_resolver::ResolutionError;
use crate::domain::entities::credential::{AuthScheme, Credential};
use crate::domain::entities::outcome::TransferStats;
use crate::domain::value_objects::branch_selection::Refspec;
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::infrastructure::git::vcs_interface::{
    CredentialProvider, RemoteLookupError, TransportError, VcsRemote,
};

/// Remote of a [`GitRepository`](super::GitRepository)
pub struct GitRemote<'repo> {
    name: String,
    url: RemoteUrl,
    remote: git2::Remote<'repo>,
}

impl std::fmt::Debug for GitRemote<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRemote")
            .field("name", &self.name)
            .field("url", &self.url.redacted())
            .finish()
    }
}

impl<'repo> GitRemote<'repo> {
    pub(crate) fn new(name: &str, remote: git2::Remote<'repo>) -> Result<Self, RemoteLookupError> {
        let url = remote
            .url()
            .map(RemoteUrl::new)
            .ok_or_else(|| RemoteLookupError::Invalid {
                name: name.to_string(),
                message: "remote URL is missing or not valid UTF-8".to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            url,
            remote,
        })
    }

    /// Turn a failed libgit2 call into a transport error.
    ///
    /// An error raised by our own credential callback wins over the generic
    /// libgit2 message that wraps it.
    fn classify(
        &self,
        operation: &'static str,
        error: git2::Error,
        credential_failure: Option<ResolutionError>,
    ) -> TransportError {
        if let Some(failure) = credential_failure {
            return TransportError::Credential(failure);
        }

        let url = self.url.redacted().to_string();
        let message = error.message().to_string();
        match error.code() {
            ErrorCode::Auth => TransportError::AuthenticationRejected { url, message },
            _ => TransportError::Failed {
                operation,
                url,
                message,
            },
        }
    }
}

/// Translate the libgit2 credential type bit set into domain schemes
pub fn schemes_from(allowed: CredentialType) -> Vec<AuthScheme> {
    let mut schemes = Vec::new();
    if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
        schemes.push(AuthScheme::UsernamePasswordPlaintext);
    }
    if allowed.contains(CredentialType::USERNAME) {
        schemes.push(AuthScheme::UsernameOnly);
    }
    if allowed.intersects(
        CredentialType::SSH_KEY
            | CredentialType::SSH_CUSTOM
            | CredentialType::SSH_INTERACTIVE
            | CredentialType::SSH_MEMORY,
    ) {
        schemes.push(AuthScheme::SshKey);
    }
    if allowed.contains(CredentialType::DEFAULT) {
        schemes.push(AuthScheme::Unsupported);
    }
    schemes
}

/// Answer one libgit2 credential request through the provider.
///
/// A provider error is stashed so the caller can report it instead of the
/// opaque error libgit2 returns.
fn answer_credentials(
    provider: &mut CredentialProvider<'_>,
    failure: &RefCell<Option<ResolutionError>>,
    url: &str,
    username_from_url: Option<&str>,
    allowed: CredentialType,
) -> Result<Cred, git2::Error> {
    let schemes = schemes_from(allowed);
    debug!(
        url = %RemoteUrl::new(url).redacted(),
        allowed = ?schemes,
        "credentials requested by transport"
    );

    match provider(url, username_from_url, schemes.as_slice()) {
        Ok(Credential::UsernamePassword { username, password }) => {
            Cred::userpass_plaintext(&username, &password)
        }
        Ok(Credential::UsernameOnly { username }) => Cred::username(&username),
        Err(err) => {
            let message = err.to_string();
            *failure.borrow_mut() = Some(err);
            Err(git2::Error::from_str(&message))
        }
    }
}

impl VcsRemote for GitRemote<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &RemoteUrl {
        &self.url
    }

    #[instrument(skip_all, fields(remote = %self.name, url = %self.url))]
    fn fetch(
        &mut self,
        credentials: &mut CredentialProvider<'_>,
    ) -> Result<TransferStats, TransportError> {
        let failure = RefCell::new(None);

        let result = {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.credentials(|url, username_from_url, allowed| {
                answer_credentials(credentials, &failure, url, username_from_url, allowed)
            });

            let mut options = FetchOptions::new();
            options.remote_callbacks(callbacks);

            // An empty refspec list uses the remote's configured fetch refspecs
            self.remote.fetch::<&str>(&[], Some(&mut options), None)
        };

        if let Err(error) = result {
            return Err(self.classify("fetch", error, failure.into_inner()));
        }

        let progress = self.remote.stats();
        let stats = TransferStats {
            total_objects: progress.total_objects(),
            indexed_objects: progress.indexed_objects(),
            received_objects: progress.received_objects(),
            local_objects: progress.local_objects(),
            received_bytes: progress.received_bytes(),
        };
        debug!(?stats, "fetch complete");
        Ok(stats)
    }

    #[instrument(skip_all, fields(remote = %self.name, url = %self.url))]
    fn push(
        &mut self,
        refspecs: &[Refspec],
        credentials: &mut CredentialProvider<'_>,
    ) -> Result<(), TransportError> {
        let failure = RefCell::new(None);
        let rejections: RefCell<Vec<(String, String)>> = RefCell::new(Vec::new());
        let specs: Vec<&str> = refspecs.iter().map(Refspec::as_str).collect();
        debug!(refspecs = ?specs, "pushing");

        let result = {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.credentials(|url, username_from_url, allowed| {
                answer_credentials(credentials, &failure, url, username_from_url, allowed)
            });
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    rejections
                        .borrow_mut()
                        .push((reference.to_string(), message.to_string()));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            self.remote.push(&specs, Some(&mut options))
        };

        if let Err(error) = result {
            return Err(self.classify("push", error, failure.into_inner()));
        }

        if let Some((reference, message)) = rejections.into_inner().into_iter().next() {
            return Err(TransportError::PushRejected { reference, message });
        }

        Ok(())
    }
}
