//! Engine facade
//!
//! `CreditEngine` binds the configuration and a clock to the free functions
//! of this crate, so callers need not thread limits and "today" through
//! every call.

use rust_decimal::Decimal;
use tracing::instrument;

use core_kernel::{Clock, CoreError, CreditId, LineItemId, Money, SystemClock};

use crate::config::EngineConfig;
use crate::credit::Credit;
use crate::error::{CreditError, LedgerError, MigrationError, SolverError};
use crate::ledger::{self, DuePayment};
use crate::migration::{self, LegacyCredit, Migrated, MigrationReport};
use crate::schedule::{self, Schedule};
use crate::solver::{self, SolverLimits};
use crate::terms::{LoanTerms, PartialLoanTerms};

/// Entry point for solving, scheduling, recording and migrating credits
#[derive(Debug, Clone)]
pub struct CreditEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    limits: SolverLimits,
    clock: C,
}

impl CreditEngine<SystemClock> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for CreditEngine<SystemClock> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Clock> CreditEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let limits = config.limits();
        Self { config, limits, clock }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn limits(&self) -> &SolverLimits {
        &self.limits
    }

    /// An amount in the configured default currency
    pub fn money(&self, amount: Decimal) -> Money {
        Money::new(amount, self.config.default_currency)
    }

    #[instrument(skip_all, fields(solve_for = %partial.known.missing()))]
    pub fn solve(&self, partial: PartialLoanTerms) -> Result<LoanTerms, SolverError> {
        solver::solve_with(partial, &self.limits)
    }

    #[instrument(skip_all, fields(term_months = terms.term_months()))]
    pub fn build(&self, terms: &LoanTerms) -> Schedule {
        schedule::build(terms)
    }

    /// Solves, schedules and wraps the result in a new credit
    #[instrument(skip(self, partial))]
    pub fn open_credit(&self, name: &str, partial: PartialLoanTerms) -> Result<Credit, SolverError> {
        Credit::open_with(name, partial, &self.limits)
    }

    /// Re-solves a credit's terms and rebuilds its schedule
    #[instrument(skip_all, fields(credit_id = %credit.id))]
    pub fn rebuild(&self, credit: &mut Credit, partial: PartialLoanTerms) -> Result<(), SolverError> {
        credit.replace_terms_with(partial, &self.limits)
    }

    /// Marks a line item paid today
    #[instrument(skip_all, fields(line_item_id = %line_item_id))]
    pub fn apply_payment(
        &self,
        schedule: Schedule,
        line_item_id: &LineItemId,
        amount: Option<Money>,
    ) -> Result<Schedule, LedgerError> {
        ledger::apply_payment(schedule, line_item_id, amount, self.clock.today())
    }

    #[instrument(skip_all, fields(line_item_id = %line_item_id))]
    pub fn reverse_payment(&self, schedule: Schedule, line_item_id: &LineItemId) -> Result<Schedule, LedgerError> {
        ledger::reverse_payment(schedule, line_item_id)
    }

    /// Records a payment made today on one credit in a portfolio
    #[instrument(skip_all, fields(credit_id = %credit_id, line_item_id = %line_item_id))]
    pub fn record_payment_for(
        &self,
        credits: &mut [Credit],
        credit_id: &CreditId,
        line_item_id: &LineItemId,
        amount: Option<Money>,
    ) -> Result<(), CreditError> {
        let credit = credits
            .iter_mut()
            .find(|credit| &credit.id == credit_id)
            .ok_or_else(|| CoreError::not_found(format!("credit {}", credit_id)))?;
        credit.apply_payment(line_item_id, amount, self.clock.today())
    }

    /// Overdue and upcoming payments; the window defaults to the configured days
    #[instrument(skip(self, credits), fields(credits = credits.len()))]
    pub fn due_within(&self, credits: &[Credit], days_ahead: Option<u32>) -> Vec<DuePayment> {
        let days = days_ahead.unwrap_or(self.config.due_window_days);
        ledger::due_within(credits, days, self.clock.today())
    }

    #[instrument(skip_all, fields(credit_id = %legacy.id))]
    pub fn migrate(&self, legacy: &LegacyCredit) -> Result<Migrated, MigrationError> {
        migration::migrate(legacy, self.clock.today(), &self.limits)
    }

    #[instrument(skip_all, fields(records = legacy.len()))]
    pub fn migrate_all(&self, legacy: Vec<LegacyCredit>) -> MigrationReport {
        migration::migrate_all(legacy, self.clock.today(), &self.limits)
    }
}
