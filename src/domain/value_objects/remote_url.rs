use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

/// リモートURLの値オブジェクト
///
/// 元の文字列をそのまま保持し、ログや表示にはユーザー情報を除いた
/// 形式（`redacted`）を使う。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteUrl {
    /// 設定に書かれたURL文字列
    raw: String,

    /// ホスト名（ローカルパスの場合はNone）
    host: Option<String>,

    /// URLに埋め込まれたユーザー名
    username: Option<String>,

    /// ユーザー情報を除いた表示用URL
    redacted: String,
}

impl RemoteUrl {
    /// URL文字列を解析する
    ///
    /// 解析できない文字列（ローカルパス等）もそのまま受け入れる。
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();

        if let Ok(mut url) = Url::parse(&raw) {
            // Windowsのドライブレター（C:\...）はスキームとして解釈されるため除外
            if url.scheme().len() > 1 {
                let host = url.host_str().map(|h| h.to_ascii_lowercase());
                let username = Some(url.username())
                    .filter(|u| !u.is_empty())
                    .map(|u| u.to_string());
                let _ = url.set_password(None);
                let _ = url.set_username("");
                return Self {
                    redacted: url.to_string(),
                    raw,
                    host,
                    username,
                };
            }
        }

        // scp形式（user@host:org/repo.git）
        if let Some((authority, _path)) = Self::split_scp_like(&raw) {
            let (username, host) = match authority.split_once('@') {
                Some((user, host)) => (Some(user.to_string()), host),
                None => (None, authority),
            };
            return Self {
                redacted: raw.clone(),
                host: Some(host.to_ascii_lowercase()),
                username,
                raw,
            };
        }

        Self {
            redacted: raw.clone(),
            raw,
            host: None,
            username: None,
        }
    }

    fn split_scp_like(raw: &str) -> Option<(&str, &str)> {
        let (authority, path) = raw.split_once(':')?;
        if authority.len() < 2
            || path.is_empty()
            || authority.contains('/')
            || authority.contains('\\')
            || path.starts_with("//")
        {
            return None;
        }
        Some((authority, path))
    }

    /// 元のURL文字列
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// ホスト名
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// URLに含まれるユーザー名
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// ユーザー情報を除いた表示用URL
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl Serialize for RemoteUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.redacted)
    }
}
