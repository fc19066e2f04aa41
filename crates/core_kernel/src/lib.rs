//! Core Kernel - Foundational types for the credit schedule engine
//!
//! This crate provides the building blocks used by the credit domain:
//! - Money and Rate types with fixed-point decimal arithmetic
//! - Month-indexed calendar arithmetic and an injectable clock
//! - Strongly-typed identifiers

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, SystemClock, FixedClock, DateRange, TemporalError};
pub use identifiers::{CreditId, ScheduleId, LineItemId};
pub use error::CoreError;
