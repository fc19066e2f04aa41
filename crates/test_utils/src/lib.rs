//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! credit engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built loans, dates and amounts with known schedules
//! - `builders`: Builder patterns for partial terms and legacy records
//! - `assertions`: Custom assertion helpers for money and schedules
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
