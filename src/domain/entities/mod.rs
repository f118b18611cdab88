pub mod credential;
pub mod outcome;

pub use credential::{AuthScheme, Credential};
pub use outcome::{
    Failure, FailureKind, OpenFailure, OperationKind, OperationOutcome, OperationStatus,
    SkipReason, SuccessDetail, SyncReport, TransferStats,
};
