//! Credit aggregate
//!
//! A `Credit` owns its terms and at most one schedule. The schedule is
//! generated from the terms and replaced as a whole whenever they change;
//! line items are never patched individually except to record payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use core_kernel::{CreditId, LineItemId, Money};

use crate::error::{CreditError, LedgerError, SolverError};
use crate::schedule::{build, Schedule};
use crate::solver::{solve_with, SolverLimits};
use crate::terms::{LoanTerms, PartialLoanTerms};

/// Lifecycle of a credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    #[default]
    Active,
    Archived,
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditStatus::Active => write!(f, "active"),
            CreditStatus::Archived => write!(f, "archived"),
        }
    }
}

/// A loan with its payment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub id: CreditId,
    /// Display name
    pub name: String,
    terms: LoanTerms,
    schedule: Option<Schedule>,
    status: CreditStatus,
    /// Incremented on every change, for optimistic concurrency in storage
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Credit {
    /// Solves the partial terms and opens a credit with a fresh schedule
    pub fn open(name: impl Into<String>, partial: PartialLoanTerms) -> Result<Self, SolverError> {
        Self::open_with(name, partial, &SolverLimits::default())
    }

    pub fn open_with(
        name: impl Into<String>,
        partial: PartialLoanTerms,
        limits: &SolverLimits,
    ) -> Result<Self, SolverError> {
        let terms = solve_with(partial, limits)?;
        Ok(Self::with_terms(name, terms))
    }

    /// Opens a credit from already resolved terms
    pub fn with_terms(name: impl Into<String>, terms: LoanTerms) -> Self {
        let schedule = build(&terms);
        let mut credit = Self::unscheduled(name, terms);
        credit.schedule = Some(schedule);

        info!(
            credit_id = %credit.id,
            name = %credit.name,
            principal = %credit.terms.principal(),
            term_months = credit.terms.term_months(),
            "Opened credit"
        );

        credit
    }

    /// A credit whose schedule has not been generated yet
    pub fn unscheduled(name: impl Into<String>, terms: LoanTerms) -> Self {
        let now = Utc::now();
        Self {
            id: CreditId::new_v7(),
            name: name.into(),
            terms,
            schedule: None,
            status: CreditStatus::Active,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reassembles a credit carried over from an earlier record
    pub(crate) fn restore(
        id: CreditId,
        name: String,
        terms: LoanTerms,
        schedule: Schedule,
        status: CreditStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            terms,
            schedule: Some(schedule),
            status,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn status(&self) -> CreditStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CreditStatus::Active
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Outstanding principal before the first unpaid line item.
    ///
    /// Zero when every item is paid or no schedule exists.
    pub fn current_balance(&self) -> Money {
        match &self.schedule {
            Some(schedule) => schedule.outstanding_balance(),
            None => Money::zero(self.terms.currency()),
        }
    }

    /// Re-solves the terms and replaces the schedule wholesale.
    ///
    /// Recorded payments do not carry over and previously issued line-item
    /// ids stop resolving. On error the credit is left unchanged.
    pub fn replace_terms(&mut self, partial: PartialLoanTerms) -> Result<(), SolverError> {
        self.replace_terms_with(partial, &SolverLimits::default())
    }

    pub fn replace_terms_with(
        &mut self,
        partial: PartialLoanTerms,
        limits: &SolverLimits,
    ) -> Result<(), SolverError> {
        let terms = solve_with(partial, limits)?;
        let discarded = self
            .schedule
            .as_ref()
            .map_or(0, |schedule| schedule.totals().paid_count);

        self.schedule = Some(build(&terms));
        self.terms = terms;
        self.touch();

        info!(
            credit_id = %self.id,
            discarded_payments = discarded,
            term_months = self.terms.term_months(),
            "Rebuilt credit schedule"
        );

        Ok(())
    }

    pub fn archive(&mut self) -> Result<(), CreditError> {
        self.transition(CreditStatus::Active, CreditStatus::Archived)
    }

    pub fn reactivate(&mut self) -> Result<(), CreditError> {
        self.transition(CreditStatus::Archived, CreditStatus::Active)
    }

    /// Records a payment on one line item; see `Schedule::record_payment`
    pub fn apply_payment(
        &mut self,
        line_item_id: &LineItemId,
        amount: Option<Money>,
        paid_at: NaiveDate,
    ) -> Result<(), CreditError> {
        let schedule = self.editable_schedule(line_item_id)?;
        schedule.record_payment(line_item_id, amount, paid_at)?;
        self.touch();
        Ok(())
    }

    /// Clears the payment on one line item
    pub fn reverse_payment(&mut self, line_item_id: &LineItemId) -> Result<(), CreditError> {
        let schedule = self.editable_schedule(line_item_id)?;
        schedule.clear_payment(line_item_id)?;
        self.touch();
        Ok(())
    }

    fn editable_schedule(&mut self, line_item_id: &LineItemId) -> Result<&mut Schedule, CreditError> {
        if self.status == CreditStatus::Archived {
            return Err(CreditError::Archived(self.id));
        }
        self.schedule
            .as_mut()
            .ok_or_else(|| LedgerError::LineItemNotFound(*line_item_id).into())
    }

    fn transition(&mut self, from: CreditStatus, to: CreditStatus) -> Result<(), CreditError> {
        if self.status != from {
            return Err(CreditError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.touch();

        info!(credit_id = %self.id, status = %to, "Credit status changed");
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
