pub mod config_store;
pub mod repository_catalog;

pub use config_store::{ConfigStore, ConfigStoreError, SyncSettings};
pub use repository_catalog::RepositoryCatalog;
