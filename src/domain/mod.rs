//! Domain layer: credentials, outcomes and the value objects they are built from

pub mod entities;
pub mod value_objects;
