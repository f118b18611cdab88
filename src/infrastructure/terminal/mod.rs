//! Interactive terminal input for credentials

pub mod prompter;

pub use prompter::{Prompter, TerminalPrompter};

#[cfg(test)]
pub use prompter::MockPrompter;
