//! Application layer: credential services and the sync use case

pub mod services;
pub mod use_cases;
