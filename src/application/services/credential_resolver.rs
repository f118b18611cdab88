use thiserror::Error;
use tracing::{debug, warn};

use crate::application::services::credential_store::{CredentialScope, CredentialStore};
use crate::domain::entities::credential::{AuthScheme, Credential};
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::infrastructure::terminal::Prompter;

/// 1回の操作で資格情報を要求できる回数の既定値
pub const DEFAULT_MAX_AUTH_ATTEMPTS: u32 = 3;

/// 資格情報の解決エラー
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("none of the offered authentication schemes are supported for {url} (offered: {})", display_schemes(.offered))]
    UnsupportedScheme {
        url: String,
        offered: Vec<AuthScheme>,
    },

    #[error("failed to read credentials for {url}: {source}")]
    Prompt {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("authentication for {url} still failing after {attempts} attempt(s)")]
    AttemptsExhausted { url: String, attempts: u32 },
}

fn display_schemes(schemes: &[AuthScheme]) -> String {
    if schemes.is_empty() {
        return "none".to_string();
    }
    schemes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// トランスポートからの資格情報要求をCredentialStoreに仲介するサービス
///
/// サポートする認証方式はユーザー名/パスワード（平文）のみ。
pub struct CredentialResolver<P: Prompter> {
    store: CredentialStore,
    prompter: P,
    max_attempts: u32,
}

impl<P: Prompter> CredentialResolver<P> {
    /// 新しいCredentialResolverインスタンスを作成
    pub fn new(store: CredentialStore, prompter: P) -> Self {
        Self {
            store,
            prompter,
            max_attempts: DEFAULT_MAX_AUTH_ATTEMPTS,
        }
    }

    /// 既定の設定でResolverを作成
    pub fn with_scope(scope: CredentialScope, prompter: P) -> Self {
        Self::new(CredentialStore::new(scope), prompter)
    }

    /// 1回の操作あたりの最大試行回数を設定
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 資格情報を解決する
    ///
    /// `allowed`にユーザー名/パスワード（平文）が含まれていればストアから取得し、
    /// 含まれていなければ`UnsupportedScheme`を返す。
    pub fn resolve(
        &mut self,
        url: &str,
        username_hint: Option<&str>,
        allowed: &[AuthScheme],
    ) -> Result<Credential, ResolutionError> {
        let scheme = Self::select_scheme(url, allowed)?;
        self.store
            .get_or_create(scheme, url, username_hint, &mut self.prompter)
    }

    fn select_scheme(url: &str, allowed: &[AuthScheme]) -> Result<AuthScheme, ResolutionError> {
        allowed
            .iter()
            .copied()
            .find(|scheme| scheme.is_supported())
            .ok_or_else(|| ResolutionError::UnsupportedScheme {
                url: RemoteUrl::new(url).redacted().to_string(),
                offered: allowed.to_vec(),
            })
    }

    /// 1回のfetch/push操作に紐づく資格情報プロバイダを作成
    pub fn provider_for(&mut self, url: &str) -> OperationCredentials<'_, P> {
        OperationCredentials {
            url: url.to_string(),
            resolver: self,
            attempts: 0,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// 1回の操作の間だけ有効な資格情報プロバイダ
///
/// 最初の要求はキャッシュを使う。トランスポートが同じ操作の中で再度要求した場合は
/// 直前の資格情報が拒否されたとみなし、キャッシュを破棄して再入力を求める。
pub struct OperationCredentials<'a, P: Prompter> {
    url: String,
    resolver: &'a mut CredentialResolver<P>,
    attempts: u32,
}

impl<'a, P: Prompter> OperationCredentials<'a, P> {
    /// トランスポートからの資格情報要求に応える
    pub fn provide(
        &mut self,
        transport_url: &str,
        username_hint: Option<&str>,
        allowed: &[AuthScheme],
    ) -> Result<Credential, ResolutionError> {
        let display_url = RemoteUrl::new(&self.url).redacted().to_string();
        debug!(
            url = %display_url,
            transport_url = %RemoteUrl::new(transport_url).redacted(),
            offered = %display_schemes(allowed),
            "credential requested"
        );

        let scheme = CredentialResolver::<P>::select_scheme(&self.url, allowed)?;

        if self.attempts >= self.resolver.max_attempts {
            return Err(ResolutionError::AttemptsExhausted {
                url: display_url,
                attempts: self.attempts,
            });
        }
        if self.attempts > 0 {
            warn!(url = %display_url, attempt = self.attempts + 1, "credentials rejected, asking again");
            self.resolver.store.invalidate(scheme, &self.url);
        }
        self.attempts += 1;

        self.resolver.resolve(&self.url, username_hint, allowed)
    }

    /// この操作で資格情報を要求された回数
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
