use serde::{Deserialize, Serialize};
use std::fmt;

/// リモートが1回の認証交換で受け付ける認証方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// ユーザー名 + パスワード（平文）
    UsernamePasswordPlaintext,
    /// ユーザー名のみ
    UsernameOnly,
    /// SSH鍵
    SshKey,
    /// 上記以外（未対応）
    Unsupported,
}

impl AuthScheme {
    /// この方式に対して資格情報を生成できるか
    pub fn is_supported(&self) -> bool {
        matches!(self, AuthScheme::UsernamePasswordPlaintext)
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthScheme::UsernamePasswordPlaintext => "username/password",
            AuthScheme::UsernameOnly => "username",
            AuthScheme::SshKey => "ssh-key",
            AuthScheme::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// リモートに渡す資格情報
///
/// 一度生成したら変更しない。パスワードはプロセスのメモリ上にのみ保持し、
/// ディスクへの保存やログ出力は行わない（`Debug`出力ではマスクされる）。
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// ユーザー名のみ
    UsernameOnly { username: String },
    /// ユーザー名とパスワード
    UsernamePassword { username: String, password: String },
}

impl Credential {
    /// ユーザー名のみの資格情報を作成
    pub fn username_only(username: impl Into<String>) -> Self {
        Self::UsernameOnly {
            username: username.into(),
        }
    }

    /// ユーザー名とパスワードの資格情報を作成
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    /// ユーザー名を取得
    pub fn username(&self) -> &str {
        match self {
            Self::UsernameOnly { username } | Self::UsernamePassword { username, .. } => username,
        }
    }

    /// この資格情報が対応する認証方式
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::UsernameOnly { .. } => AuthScheme::UsernameOnly,
            Self::UsernamePassword { .. } => AuthScheme::UsernamePasswordPlaintext,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameOnly { username } => f
                .debug_struct("UsernameOnly")
                .field("username", username)
                .finish(),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
