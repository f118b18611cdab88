use crate::common::error::RepoSyncError;

/// reposyncプロジェクト全体で使用するResult型のエイリアス
///
/// このエイリアスにより、プロジェクト全体で一貫したエラーハンドリングが可能になる。
///
/// # Examples
///
/// ```
/// use reposync::common::result::RepoSyncResult;
/// use reposync::common::error::RepoSyncError;
///
/// fn example_function() -> RepoSyncResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> RepoSyncResult<()> {
///     Err(RepoSyncError::config_error("Something went wrong", None))
/// }
/// ```
pub type RepoSyncResult<T> = Result<T, RepoSyncError>;
