use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::services::credential_resolver::{CredentialResolver, ResolutionError};
use crate::domain::entities::credential::AuthScheme;
use crate::domain::entities::outcome::{
    Failure, FailureKind, OperationKind, OperationOutcome, OperationStatus, SkipReason,
    SuccessDetail, SyncReport,
};
use crate::domain::value_objects::branch_selection::BranchSelection;
use crate::infrastructure::git::vcs_interface::{
    CredentialProvider, OpenError, RemoteLookupError, TransportError, VcsRemote, VcsRepository,
};
use crate::infrastructure::terminal::Prompter;

/// 同期処理中にリポジトリ単位で発生するエラー
///
/// バッチ全体を中断することはなく、`Failed`結果に変換して記録する。
#[derive(Debug, Error)]
pub enum SyncRepositoriesError {
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    #[error(transparent)]
    RemoteLookup(#[from] RemoteLookupError),

    #[error(transparent)]
    Repository(#[from] OpenError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SyncRepositoriesError {
    /// 結果レコード用の失敗内容に変換
    pub fn into_failure(self) -> Failure {
        let kind = match &self {
            SyncRepositoriesError::RemoteNotFound(_) => FailureKind::NoSuchRemote,
            SyncRepositoriesError::RemoteLookup(_) | SyncRepositoriesError::Repository(_) => {
                FailureKind::Repository
            }
            SyncRepositoriesError::Transport(TransportError::Credential(
                ResolutionError::UnsupportedScheme { .. },
            )) => FailureKind::UnsupportedScheme,
            SyncRepositoriesError::Transport(TransportError::Credential(_)) => {
                FailureKind::Credential
            }
            SyncRepositoriesError::Transport(TransportError::AuthenticationRejected { .. }) => {
                FailureKind::AuthenticationRejected
            }
            SyncRepositoriesError::Transport(TransportError::PushRejected { .. }) => {
                FailureKind::PushRejected
            }
            SyncRepositoriesError::Transport(TransportError::Failed { .. }) => {
                FailureKind::Transport
            }
        };
        Failure::new(kind, self.to_string())
    }
}

/// 設定されたリモートが存在しない場合の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRemotePolicy {
    /// スキップとして記録する
    #[default]
    Skip,
    /// 失敗として記録する
    Fail,
}

/// 実行する同期操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOperation {
    /// 全リポジトリでfetch
    Fetch,
    /// 選択したローカルブランチを全リポジトリでpush
    Push(BranchSelection),
}

impl SyncOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            SyncOperation::Fetch => OperationKind::Fetch,
            SyncOperation::Push(_) => OperationKind::Push,
        }
    }
}

/// リポジトリ同期の設定
#[derive(Debug, Clone)]
pub struct SyncRepositoriesConfig {
    /// 同期対象のリモート名
    pub remote: String,

    /// 最初の失敗で処理を打ち切るか
    pub stop_on_first_error: bool,

    /// リモートが存在しない場合の扱い
    pub on_missing_remote: MissingRemotePolicy,

    /// pushせずにrefspecの記録のみ行うか
    pub dry_run: bool,
}

impl Default for SyncRepositoriesConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            stop_on_first_error: false,
            on_missing_remote: MissingRemotePolicy::Skip,
            dry_run: false,
        }
    }
}

impl SyncRepositoriesConfig {
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_stop_on_first_error(mut self, stop_on_first_error: bool) -> Self {
        self.stop_on_first_error = stop_on_first_error;
        self
    }

    pub fn with_on_missing_remote(mut self, policy: MissingRemotePolicy) -> Self {
        self.on_missing_remote = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// リポジトリ一括同期のユースケース
///
/// カタログ順に1件ずつ処理し、リポジトリごとの結果を`SyncReport`に記録する。
/// リトライはこの層では行わない（資格情報の再入力は`CredentialResolver`側）。
pub struct SyncRepositoriesUseCase {
    /// 同期設定
    config: SyncRepositoriesConfig,
}

impl SyncRepositoriesUseCase {
    /// 新しいSyncRepositoriesUseCaseインスタンスを作成
    pub fn new(config: SyncRepositoriesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncRepositoriesConfig {
        &self.config
    }

    /// リポジトリ同期を実行
    pub fn execute<R, P>(
        &self,
        repositories: &[R],
        operation: &SyncOperation,
        resolver: &mut CredentialResolver<P>,
    ) -> SyncReport
    where
        R: VcsRepository,
        P: Prompter,
    {
        let kind = operation.kind();
        let mut report = SyncReport::new(kind);

        for (index, repository) in repositories.iter().enumerate() {
            info!(repository = %repository.name(), operation = %kind, "syncing");
            let started = Instant::now();

            let status = match self.sync_repository(repository, operation, resolver) {
                Ok(status) => status,
                Err(error) => OperationStatus::Failed(error.into_failure()),
            };
            Self::log_status(repository.name(), &status);

            let failed = matches!(status, OperationStatus::Failed(_));
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            report.record(
                OperationOutcome::new(repository.name(), repository.path(), kind, status)
                    .with_duration_ms(duration_ms),
            );

            if failed && self.config.stop_on_first_error {
                if index + 1 < repositories.len() {
                    warn!(
                        remaining = repositories.len() - index - 1,
                        "stopping after first failure"
                    );
                    report.stopped_early = true;
                }
                break;
            }
        }

        report.finish();
        report
    }

    /// 単一リポジトリの同期
    fn sync_repository<R, P>(
        &self,
        repository: &R,
        operation: &SyncOperation,
        resolver: &mut CredentialResolver<P>,
    ) -> Result<OperationStatus, SyncRepositoriesError>
    where
        R: VcsRepository,
        P: Prompter,
    {
        // 1. リモートの検索
        let mut remote = match repository.remote(&self.config.remote) {
            Ok(remote) => remote,
            Err(RemoteLookupError::NotFound(name)) => {
                return match self.config.on_missing_remote {
                    MissingRemotePolicy::Skip => Ok(OperationStatus::Skipped(
                        SkipReason::NoSuchRemote { remote: name },
                    )),
                    MissingRemotePolicy::Fail => Err(SyncRepositoriesError::RemoteNotFound(name)),
                };
            }
            Err(error) => return Err(error.into()),
        };

        // 2. fetch / push
        match operation {
            SyncOperation::Fetch => {
                let stats = Self::with_credentials(remote.as_mut(), resolver, |remote, provider| {
                    remote.fetch(provider)
                })?;
                Ok(OperationStatus::Success(SuccessDetail::Fetched(stats)))
            }
            SyncOperation::Push(selection) => {
                let local_branches = repository.local_branch_names()?;
                let resolved = selection.resolve(&local_branches);
                for missing in &resolved.missing {
                    warn!(repository = %repository.name(), branch = %missing, "branch not found locally, ignoring");
                }

                if resolved.refspecs.is_empty() {
                    return Ok(OperationStatus::Skipped(SkipReason::NoBranchesToPush));
                }

                let refspecs: Vec<String> =
                    resolved.refspecs.iter().map(|r| r.to_string()).collect();
                debug!(repository = %repository.name(), refspecs = ?refspecs, "computed push refspecs");

                if self.config.dry_run {
                    return Ok(OperationStatus::Skipped(SkipReason::DryRun { refspecs }));
                }

                Self::with_credentials(remote.as_mut(), resolver, |remote, provider| {
                    remote.push(&resolved.refspecs, provider)
                })?;
                Ok(OperationStatus::Success(SuccessDetail::Pushed { refspecs }))
            }
        }
    }

    /// このリモートのURLに紐づく資格情報プロバイダを用意して転送処理を実行
    fn with_credentials<P, T, F>(
        remote: &mut dyn VcsRemote,
        resolver: &mut CredentialResolver<P>,
        transfer: F,
    ) -> Result<T, TransportError>
    where
        P: Prompter,
        F: FnOnce(&mut dyn VcsRemote, &mut CredentialProvider<'_>) -> Result<T, TransportError>,
    {
        let url = remote.url().as_str().to_string();
        let mut credentials = resolver.provider_for(&url);
        let mut provider = |request_url: &str, username: Option<&str>, allowed: &[AuthScheme]| {
            credentials.provide(request_url, username, allowed)
        };
        transfer(remote, &mut provider)
    }

    fn log_status(repository: &str, status: &OperationStatus) {
        match status {
            OperationStatus::Success(_) => info!(repository = %repository, "done"),
            OperationStatus::Skipped(reason) => {
                if reason.counts_as_problem() {
                    warn!(repository = %repository, reason = %reason, "skipped");
                } else {
                    info!(repository = %repository, reason = %reason, "skipped");
                }
            }
            OperationStatus::Failed(failure) => {
                warn!(repository = %repository, error = %failure, "failed")
            }
        }
    }
}
