//! Credit Domain - Loan Amortization and Payment Schedules
//!
//! This crate turns partial loan parameters into a month-by-month payment
//! schedule and keeps that schedule consistent as real payments are
//! recorded or reversed.
//!
//! # Components
//!
//! - **Solver**: given three of {principal, term, monthly payment} plus the
//!   annual rate, computes the missing one
//! - **Schedule generator**: annuity (level payment) or differentiated
//!   (level principal) schedules, with the final month absorbing rounding
//! - **Ledger**: records and reverses payments on individual line items and
//!   answers overdue/upcoming queries across a portfolio
//! - **Migration**: re-derives schedules for records that predate them
//!
//! All money is fixed-point (`rust_decimal`) at the currency's minor unit.
//! The crate performs no I/O; callers persist the returned records.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_credit::{solve, build, KnownParameters, PartialLoanTerms, ScheduleType};
//!
//! let partial = PartialLoanTerms::new(
//!     KnownParameters::PrincipalRateTerm {
//!         principal: Money::new(dec!(120000), Currency::USD),
//!         annual_rate_percent: dec!(12),
//!         term_months: 12,
//!     },
//!     ScheduleType::Annuity,
//!     start_date,
//! );
//!
//! let terms = solve(partial)?;
//! let schedule = build(&terms);
//! ```

pub mod error;
pub mod config;
pub mod terms;
pub mod solver;
pub mod schedule;
pub mod ledger;
pub mod credit;
pub mod migration;
pub mod engine;

pub use error::{LoanField, SolverError, LedgerError, MigrationError, ScheduleDefect, CreditError};
pub use config::EngineConfig;
pub use terms::{LoanTerms, PartialLoanTerms, KnownParameters, CompleteParameters, ScheduleType};
pub use solver::{solve, solve_with, resolve_complete, resolve_implied_rate, implied_annual_rate, SolverLimits};
pub use schedule::{build, Schedule, ScheduleLineItem, RecordedPayment, ScheduleTotals, LineItemStatus};
pub use ledger::{apply_payment, reverse_payment, due_within, DuePayment, DueKind};
pub use credit::{Credit, CreditStatus};
pub use migration::{
    migrate, migrate_all, needs_migration, LegacyCredit, Migrated, MigrationFailure,
    MigrationReport, MigrationWarning,
};
pub use engine::CreditEngine;
