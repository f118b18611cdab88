pub mod sync_repositories;

pub use sync_repositories::{
    MissingRemotePolicy, SyncOperation, SyncRepositoriesConfig, SyncRepositoriesError,
    SyncRepositoriesUseCase,
};
