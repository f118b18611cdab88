pub mod branch_selection;
pub mod remote_url;

pub use branch_selection::{BranchSelection, BranchSelectionError, Refspec, ResolvedBranches};
pub use remote_url::RemoteUrl;
