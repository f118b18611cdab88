//! Command line interface and terminal rendering

pub mod cli;
pub mod ui;
