use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::application::services::credential_resolver::ResolutionError;
use crate::domain::entities::credential::{AuthScheme, Credential};
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::infrastructure::terminal::Prompter;

/// キャッシュした資格情報を共有する範囲
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    /// 実行中の全リポジトリで認証方式ごとに1つ（全リモートで同じパスワードを使う簡略化）
    #[default]
    Run,
    /// 認証方式とリモートホストの組ごとに1つ
    Host,
}

/// キャッシュのキー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scheme: AuthScheme,
    host: Option<String>,
}

/// プロセス存続期間中の資格情報キャッシュ
///
/// 認証方式ごと（`CredentialScope::Host`の場合は方式とホストの組ごと）に
/// 最大1つの資格情報を保持する。ディスクには書き出さない。
/// 単一スレッドからのみ使用する前提のため同期処理は行わない。
#[derive(Debug, Default)]
pub struct CredentialStore {
    /// キャッシュ範囲
    scope: CredentialScope,

    /// URLにユーザー名が含まれない場合に使うユーザー名
    default_username: Option<String>,

    /// キャッシュ本体
    entries: HashMap<CacheKey, Credential>,

    /// プロンプトを表示した回数
    prompt_count: usize,
}

impl CredentialStore {
    /// 新しいCredentialStoreインスタンスを作成
    pub fn new(scope: CredentialScope) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }

    /// デフォルトのユーザー名を設定
    pub fn with_default_username(mut self, username: Option<String>) -> Self {
        self.default_username = username.filter(|u| !u.is_empty());
        self
    }

    fn key(&self, scheme: AuthScheme, url: &str) -> CacheKey {
        let host = match self.scope {
            CredentialScope::Run => None,
            CredentialScope::Host => RemoteUrl::new(url).host().map(|h| h.to_string()),
        };
        CacheKey { scheme, host }
    }

    /// キャッシュ済みの資格情報を返す。無ければプロンプトで作成して保存する
    ///
    /// キャッシュヒット時は`url`と`hinted_username`を無視してそのまま返す。
    /// ユーザー名/パスワード（平文）以外の方式には`UnsupportedScheme`を返す。
    pub fn get_or_create<P: Prompter + ?Sized>(
        &mut self,
        scheme: AuthScheme,
        url: &str,
        hinted_username: Option<&str>,
        prompter: &mut P,
    ) -> Result<Credential, ResolutionError> {
        let key = self.key(scheme, url);
        let display_url = RemoteUrl::new(url).redacted().to_string();

        if let Some(credential) = self.entries.get(&key) {
            debug!(scheme = %scheme, url = %display_url, "credential cache hit");
            return Ok(credential.clone());
        }

        let credential = match scheme {
            AuthScheme::UsernamePasswordPlaintext => {
                let username = self.username_for(&display_url, hinted_username, prompter)?;
                info!(scheme = %scheme, url = %display_url, username = %username, "prompting for password");
                self.prompt_count += 1;
                let password = prompter
                    .read_password(&display_url, &username)
                    .map_err(|source| ResolutionError::Prompt {
                        url: display_url.clone(),
                        source,
                    })?;
                Credential::username_password(username, password)
            }
            AuthScheme::UsernameOnly | AuthScheme::SshKey | AuthScheme::Unsupported => {
                return Err(ResolutionError::UnsupportedScheme {
                    url: display_url,
                    offered: vec![scheme],
                });
            }
        };

        self.entries.insert(key, credential.clone());
        Ok(credential)
    }

    /// ユーザー名を決定する（URLのヒント → デフォルト → プロンプト）
    fn username_for<P: Prompter + ?Sized>(
        &mut self,
        display_url: &str,
        hinted_username: Option<&str>,
        prompter: &mut P,
    ) -> Result<String, ResolutionError> {
        if let Some(hint) = hinted_username.filter(|h| !h.is_empty()) {
            return Ok(hint.to_string());
        }
        if let Some(username) = &self.default_username {
            return Ok(username.clone());
        }

        self.prompt_count += 1;
        prompter
            .read_username(display_url)
            .map(|u| u.trim().to_string())
            .map_err(|source| ResolutionError::Prompt {
                url: display_url.to_string(),
                source,
            })
    }

    /// キャッシュ済みの資格情報を破棄する（認証が拒否された場合に使用）
    pub fn invalidate(&mut self, scheme: AuthScheme, url: &str) -> bool {
        let key = self.key(scheme, url);
        self.entries.remove(&key).is_some()
    }

    /// キャッシュ済みの資格情報を参照する
    pub fn get(&self, scheme: AuthScheme, url: &str) -> Option<&Credential> {
        self.entries.get(&self.key(scheme, url))
    }

    /// キャッシュされている資格情報の数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// これまでにプロンプトを表示した回数
    pub fn prompt_count(&self) -> usize {
        self.prompt_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::terminal::MockPrompter;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_miss_prompts_and_stores() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_read_password()
            .with(eq("https://example.com/a.git"), eq("alice"))
            .times(1)
            .returning(|_, _| Ok("p1".to_string()));

        let mut store = CredentialStore::new(CredentialScope::Run);
        let cred = store
            .get_or_create(
                AuthScheme::UsernamePasswordPlaintext,
                "https://example.com/a.git",
                Some("alice"),
                &mut prompter,
            )
            .unwrap();

        assert_eq!(cred, Credential::username_password("alice", "p1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.prompt_count(), 1);
    }

    #[test]
    fn test_cache_hit_ignores_url_and_hint() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_read_password()
            .times(1)
            .returning(|_, _| Ok("p1".to_string()));

        let mut store = CredentialStore::new(CredentialScope::Run);
        let first = store
            .get_or_create(
                AuthScheme::UsernamePasswordPlaintext,
                "https://example.com/a.git",
                Some("alice"),
                &mut prompter,
            )
            .unwrap();
        let second = store
            .get_or_create(
                AuthScheme::UsernamePasswordPlaintext,
                "https://other.example.org/d.git",
                Some("bob"),
                &mut prompter,
            )
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.username(), "alice");
        assert_eq!(store.prompt_count(), 1);
    }

    #[test]
    fn test_host_scope_prompts_per_host() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_read_password()
            .times(2)
            .returning(|url, _| Ok(format!("secret-for-{}", url)));

        let mut store = CredentialStore::new(CredentialScope::Host);
        for url in [
            "https://a.example.com/x.git",
            "https://a.example.com/y.git",
            "https://b.example.com/z.git",
        ] {
            store
                .get_or_create(
                    AuthScheme::UsernamePasswordPlaintext,
                    url,
                    Some("alice"),
                    &mut prompter,
                )
                .unwrap();
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.prompt_count(), 2);
    }

    #[test]
    fn test_username_falls_back_to_default_then_prompt() {
        let mut prompter = MockPrompter::new();
        prompter.expect_read_username().times(0);
        prompter
            .expect_read_password()
            .returning(|_, _| Ok("pw".to_string()));

        let mut store =
            CredentialStore::new(CredentialScope::Run).with_default_username(Some("carol".into()));
        let cred = store
            .get_or_create(
                AuthScheme::UsernamePasswordPlaintext,
                "https://example.com/a.git",
                None,
                &mut prompter,
            )
            .unwrap();
        assert_eq!(cred.username(), "carol");

        let mut prompter = MockPrompter::new();
        prompter
            .expect_read_username()
            .times(1)
            .returning(|_| Ok(" dave \n".to_string()));
        prompter
            .expect_read_password()
            .returning(|_, _| Ok("pw".to_string()));

        let mut store = CredentialStore::new(CredentialScope::Run);
        let cred = store
            .get_or_create(
                AuthScheme::UsernamePasswordPlaintext,
                "https://example.com/a.git",
                Some(""),
                &mut prompter,
            )
            .unwrap();
        assert_eq!(cred.username(), "dave");
        assert_eq!(store.prompt_count(), 2);
    }

    #[test]
    fn test_invalidate_forces_new_prompt() {
        let mut prompter = MockPrompter::new();
        let mut answers = vec!["second".to_string(), "first".to_string()];
        prompter
            .expect_read_password()
            .times(2)
            .returning(move |_, _| Ok(answers.pop().unwrap()));

        let mut store = CredentialStore::new(CredentialScope::Run);
        let url = "https://example.com/a.git";
        let scheme = AuthScheme::UsernamePasswordPlaintext;

        let first = store.get_or_create(scheme, url, Some("alice"), &mut prompter).unwrap();
        assert!(store.invalidate(scheme, url));
        assert!(store.get(scheme, url).is_none());
        let second = store.get_or_create(scheme, url, Some("alice"), &mut prompter).unwrap();

        assert_eq!(first, Credential::username_password("alice", "first"));
        assert_eq!(second, Credential::username_password("alice", "second"));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_prompt_failure_is_reported() {
        let mut prompter = MockPrompter::new();
        prompter.expect_read_password().returning(|_, _| {
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed",
            ))
        });

        let mut store = CredentialStore::new(CredentialScope::Run);
        let result = store.get_or_create(
            AuthScheme::UsernamePasswordPlaintext,
            "https://example.com/a.git",
            Some("alice"),
            &mut prompter,
        );

        assert!(matches!(result, Err(ResolutionError::Prompt { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_username_only_scheme_is_refused_without_prompting() {
        let mut prompter = MockPrompter::new();
        prompter.expect_read_username().times(0);
        prompter.expect_read_password().times(0);

        let mut store = CredentialStore::new(CredentialScope::Run);
        let result = store.get_or_create(
            AuthScheme::UsernameOnly,
            "ssh://example.com/a.git",
            Some("git"),
            &mut prompter,
        );

        match result {
            Err(ResolutionError::UnsupportedScheme { offered, .. }) => {
                assert_eq!(offered, vec![AuthScheme::UsernameOnly]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(store.is_empty());
        assert_eq!(store.prompt_count(), 0);
    }
}
