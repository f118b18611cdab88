pub mod context;
pub mod fetch;
pub mod list;
pub mod push;

pub use context::{CommandContext, SettingsOverrides};
pub use fetch::FetchCommand;
pub use list::ListCommand;
pub use push::PushCommand;
