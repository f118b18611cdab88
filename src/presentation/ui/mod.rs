pub mod listing;
pub mod report;

pub use listing::{CatalogListing, RepositoryListing};
pub use report::ReportPrinter;
