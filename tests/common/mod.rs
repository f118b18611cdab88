//! Common test utilities and helpers
//!
//! Every integration test file compiles this module separately, so not every
//! helper is used by every file.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;
