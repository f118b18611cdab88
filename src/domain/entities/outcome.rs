use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 実行する操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// リモートからの取得
    Fetch,
    /// リモートへの送信
    Push,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Fetch => f.write_str("fetch"),
            OperationKind::Push => f.write_str("push"),
        }
    }
}

/// fetch後に返される転送統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    /// リモートが提示したオブジェクト総数
    pub total_objects: usize,
    /// インデックス済みオブジェクト数
    pub indexed_objects: usize,
    /// 受信したオブジェクト数
    pub received_objects: usize,
    /// ローカルに既に存在したオブジェクト数
    pub local_objects: usize,
    /// 受信バイト数
    pub received_bytes: usize,
}

impl TransferStats {
    /// 何も受信しなかったか（既に最新）
    pub fn is_up_to_date(&self) -> bool {
        self.received_objects == 0
    }
}

/// 成功時の詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessDetail {
    /// fetch成功
    Fetched(TransferStats),
    /// push成功（送信したrefspec）
    Pushed { refspecs: Vec<String> },
}

/// スキップ理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 指定された名前のリモートが存在しない
    NoSuchRemote { remote: String },
    /// push対象のローカルブランチが無い
    NoBranchesToPush,
    /// ドライラン（送信予定のrefspecのみ記録）
    DryRun { refspecs: Vec<String> },
}

impl SkipReason {
    /// 終了コードを非ゼロにするスキップか
    pub fn counts_as_problem(&self) -> bool {
        matches!(self, SkipReason::NoSuchRemote { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSuchRemote { remote } => write!(f, "no remote named '{}'", remote),
            SkipReason::NoBranchesToPush => f.write_str("no local branches to push"),
            SkipReason::DryRun { refspecs } => write!(f, "dry run: {}", refspecs.join(" ")),
        }
    }
}

/// 失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// リモートが未対応の認証方式を要求した
    UnsupportedScheme,
    /// 資格情報の取得に失敗した（プロンプトの失敗、試行回数超過）
    Credential,
    /// 認証が拒否された
    AuthenticationRejected,
    /// pushがリモートに拒否された
    PushRejected,
    /// 設定されたリモートが存在しない（on_missing_remote = fail の場合）
    NoSuchRemote,
    /// ローカルリポジトリの読み取りに失敗した
    Repository,
    /// その他のネットワーク・プロトコルエラー
    Transport,
}

/// 失敗内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// 分類
    pub kind: FailureKind,
    /// エラーメッセージ
    pub message: String,
}

impl Failure {
    /// 新しいFailureを作成
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// 単一リポジトリの処理状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// 成功
    Success(SuccessDetail),
    /// スキップ
    Skipped(SkipReason),
    /// 失敗
    Failed(Failure),
}

/// 単一リポジトリでの操作結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// リポジトリ名（ルート直下のディレクトリ名）
    pub repository: String,

    /// リポジトリのパス
    pub path: PathBuf,

    /// 操作の種類
    pub operation: OperationKind,

    /// 結果
    pub status: OperationStatus,

    /// 実行時間（ミリ秒）
    pub duration_ms: u64,
}

impl OperationOutcome {
    /// 新しいOperationOutcomeを作成
    pub fn new(
        repository: impl Into<String>,
        path: impl Into<PathBuf>,
        operation: OperationKind,
        status: OperationStatus,
    ) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            operation,
            status,
            duration_ms: 0,
        }
    }

    /// 実行時間を設定
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OperationStatus::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OperationStatus::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OperationStatus::Skipped(_))
    }
}

/// リポジトリとして開けなかったディレクトリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFailure {
    /// ディレクトリ名
    pub name: String,
    /// ディレクトリのパス
    pub path: PathBuf,
    /// エラーメッセージ
    pub message: String,
}

/// 一括同期の結果
///
/// `outcomes`の順序は処理順と一致する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// 実行した操作
    pub operation: OperationKind,

    /// 開始時刻
    pub started_at: DateTime<Utc>,

    /// 終了時刻
    pub finished_at: Option<DateTime<Utc>>,

    /// リポジトリごとの結果（処理順）
    pub outcomes: Vec<OperationOutcome>,

    /// カタログ構築時に開けなかったディレクトリ
    pub open_failures: Vec<OpenFailure>,

    /// stop_on_first_errorにより途中で終了したか
    pub stopped_early: bool,
}

impl SyncReport {
    /// 新しいSyncReportを作成
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            open_failures: Vec::new(),
            stopped_early: false,
        }
    }

    /// カタログのオープン失敗を設定
    pub fn with_open_failures(mut self, open_failures: Vec<OpenFailure>) -> Self {
        self.open_failures = open_failures;
        self
    }

    /// 結果を追加
    pub fn record(&mut self, outcome: OperationOutcome) {
        self.outcomes.push(outcome);
    }

    /// 終了時刻を記録
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// 名前で結果を取得
    pub fn outcome(&self, repository: &str) -> Option<&OperationOutcome> {
        self.outcomes.iter().find(|o| o.repository == repository)
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// 全リポジトリが成功したか
    ///
    /// 失敗、リモート欠如によるスキップ、オープン失敗のいずれかがあればfalse。
    pub fn is_success(&self) -> bool {
        self.open_failures.is_empty()
            && self.outcomes.iter().all(|o| match &o.status {
                OperationStatus::Success(_) => true,
                OperationStatus::Skipped(reason) => !reason.counts_as_problem(),
                OperationStatus::Failed(_) => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fetched(name: &str) -> OperationOutcome {
        OperationOutcome::new(
            name,
            format!("/root/{}", name),
            OperationKind::Fetch,
            OperationStatus::Success(SuccessDetail::Fetched(TransferStats::default())),
        )
    }

    #[test]
    fn test_report_preserves_insertion_order() {
        let mut report = SyncReport::new(OperationKind::Fetch);
        report.record(fetched("b"));
        report.record(fetched("a"));
        report.record(fetched("c"));

        let names: Vec<&str> = report.outcomes.iter().map(|o| o.repository.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(report.is_success());
    }

    #[test]
    fn test_missing_remote_skip_is_not_success() {
        let mut report = SyncReport::new(OperationKind::Fetch);
        report.record(fetched("a"));
        report.record(OperationOutcome::new(
            "b",
            "/root/b",
            OperationKind::Fetch,
            OperationStatus::Skipped(SkipReason::NoSuchRemote {
                remote: "origin".to_string(),
            }),
        ));

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_dry_run_skip_keeps_success() {
        let mut report = SyncReport::new(OperationKind::Push);
        report.record(OperationOutcome::new(
            "a",
            "/root/a",
            OperationKind::Push,
            OperationStatus::Skipped(SkipReason::DryRun {
                refspecs: vec!["refs/heads/main".to_string()],
            }),
        ));
        assert!(report.is_success());
    }

    #[test]
    fn test_open_failure_is_not_success() {
        let report = SyncReport::new(OperationKind::Fetch).with_open_failures(vec![OpenFailure {
            name: "c".to_string(),
            path: PathBuf::from("/root/c"),
            message: "corrupt".to_string(),
        }]);
        assert!(report.outcomes.is_empty());
        assert!(!report.is_success());
    }

    #[test]
    fn test_failed_outcome_counts() {
        let mut report = SyncReport::new(OperationKind::Push);
        report.record(OperationOutcome::new(
            "a",
            "/root/a",
            OperationKind::Push,
            OperationStatus::Failed(Failure::new(FailureKind::PushRejected, "non-fast-forward")),
        ));
        report.finish();

        assert_eq!(report.failed_count(), 1);
        assert!(report.finished_at.is_some());
        assert!(report.outcome("a").unwrap().is_failed());
        assert!(report.outcome("missing").is_none());
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::NoSuchRemote {
            remote: "origin".to_string(),
        };
        assert_eq!(reason.to_string(), "no remote named 'origin'");
        assert_eq!(
            SkipReason::NoBranchesToPush.to_string(),
            "no local branches to push"
        );
    }
}
