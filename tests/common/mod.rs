//! Common test utilities for flood-warnings integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod repository;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use repository::*;
