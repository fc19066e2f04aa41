//! Credit domain errors
//!
//! Every error names the loan parameter it concerns so callers can render
//! a precise message without parsing strings.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{CoreError, CreditId, LineItemId};

/// A loan parameter referenced by validation and solver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanField {
    Principal,
    AnnualRate,
    TermMonths,
    MonthlyPayment,
    PaymentDay,
    StartDate,
}

impl LoanField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanField::Principal => "principal",
            LoanField::AnnualRate => "annual_rate",
            LoanField::TermMonths => "term_months",
            LoanField::MonthlyPayment => "monthly_payment",
            LoanField::PaymentDay => "payment_day",
            LoanField::StartDate => "start_date",
        }
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving loan parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A value is out of its allowed range
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        field: LoanField,
        reason: String,
    },

    /// The payment can never pay the loan down
    #[error("Payment {payment} never amortizes the loan; it must exceed {minimum}")]
    InfeasiblePayment {
        payment: Decimal,
        minimum: Decimal,
    },

    /// All four parameters were supplied but they disagree
    #[error("Monthly payment implies a term of {implied_term_months} months, not {term_months}")]
    InconsistentTerms {
        term_months: u32,
        implied_term_months: u32,
    },

    /// A formula left its domain or an iteration did not settle
    #[error("Calculation did not converge: {0}")]
    Nonconvergent(String),
}

impl SolverError {
    pub fn invalid(field: LoanField, reason: impl Into<String>) -> Self {
        SolverError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// The parameter the error is about, when there is a single one
    pub fn field(&self) -> Option<LoanField> {
        match self {
            SolverError::InvalidInput { field, .. } => Some(*field),
            SolverError::InfeasiblePayment { .. } => Some(LoanField::MonthlyPayment),
            SolverError::InconsistentTerms { .. } => Some(LoanField::MonthlyPayment),
            SolverError::Nonconvergent(_) => None,
        }
    }
}

/// Errors raised by payment recording
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The id is stale (from a rebuilt schedule) or belongs to another credit
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),
}

/// Per-record failure during legacy migration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// More than one of the four loan parameters is absent
    #[error("Insufficient data: missing {}", format_fields(.missing))]
    InsufficientData {
        missing: Vec<LoanField>,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

fn format_fields(fields: &[LoanField]) -> String {
    fields
        .iter()
        .map(LoanField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A violated schedule invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleDefect {
    #[error("Schedule has no line items")]
    Empty,

    #[error("Expected month {expected}, found month {found}")]
    MonthSequence {
        expected: u32,
        found: u32,
    },

    #[error("Month {month} is not in the schedule currency")]
    CurrencyMismatch {
        month: u32,
    },

    #[error("Month {month}: principal and interest do not add up to the planned payment")]
    SplitMismatch {
        month: u32,
    },

    #[error("Month {month}: remaining balance does not follow from the previous balance")]
    BalanceMismatch {
        month: u32,
    },

    #[error("Month {month}: remaining balance is negative")]
    NegativeBalance {
        month: u32,
    },

    #[error("Final remaining balance is {0}, expected zero")]
    NonZeroTerminalBalance(Decimal),
}

/// Umbrella error for operations spanning several components
#[derive(Debug, Error)]
pub enum CreditError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Schedule defect: {0}")]
    Defect(#[from] ScheduleDefect),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: String,
        to: String,
    },

    /// Archived credits accept no payments until reactivated
    #[error("Credit {0} is archived")]
    Archived(CreditId),

    #[error(transparent)]
    Core(#[from] CoreError),
}
