//! Legacy record migration
//!
//! Older credit records may predate schedules or carry only some of the
//! loan parameters. Migration fills in the one missing parameter, builds a
//! schedule the same way a new credit gets one, and reports per-record
//! failures without stopping the batch.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{CreditId, Money};

use crate::credit::{Credit, CreditStatus};
use crate::error::{LoanField, MigrationError};
use crate::schedule::{build, Schedule};
use crate::solver::{resolve_complete, resolve_implied_rate, solve_with, SolverLimits};
use crate::terms::{CompleteParameters, KnownParameters, LoanTerms, PartialLoanTerms, ScheduleType};

/// A credit record as stored before schedules were derived
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyCredit {
    pub id: CreditId,
    pub name: String,
    pub principal: Option<Money>,
    pub annual_rate_percent: Option<Decimal>,
    pub term_months: Option<u32>,
    pub monthly_payment: Option<Money>,
    /// Annuity when absent
    pub schedule_type: Option<ScheduleType>,
    pub start_date: Option<NaiveDate>,
    /// The start date's day when absent
    pub payment_day: Option<u32>,
    /// A previously stored schedule, possibly stale
    pub schedule: Option<Schedule>,
    pub status: CreditStatus,
}

impl LegacyCredit {
    /// Loan parameters this record lacks, in a fixed order
    pub fn missing_fields(&self) -> Vec<LoanField> {
        let mut missing = Vec::new();
        if self.principal.is_none() {
            missing.push(LoanField::Principal);
        }
        if self.annual_rate_percent.is_none() {
            missing.push(LoanField::AnnualRate);
        }
        if self.term_months.is_none() {
            missing.push(LoanField::TermMonths);
        }
        if self.monthly_payment.is_none() {
            missing.push(LoanField::MonthlyPayment);
        }
        missing
    }

    fn schedule_type(&self) -> ScheduleType {
        self.schedule_type.unwrap_or_default()
    }
}

/// Something a caller should reconcile after migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationWarning {
    /// No start date was stored; the schedule starts today and every
    /// earlier month reads as unpaid
    StartDateDefaulted { credit_id: CreditId, start_date: NaiveDate },
    /// The stored schedule was replaced and its recorded payments dropped
    PaidStateDiscarded { credit_id: CreditId, count: u32 },
}

/// A migrated credit and the warnings raised for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migrated {
    pub credit: Credit,
    pub warnings: Vec<MigrationWarning>,
}

/// A record that could not be migrated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFailure {
    pub credit: LegacyCredit,
    pub error: MigrationError,
}

/// Outcome of a batch migration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub succeeded: Vec<Credit>,
    pub failed: Vec<MigrationFailure>,
    pub warnings: Vec<MigrationWarning>,
}

impl MigrationReport {
    /// Number of records processed
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.warnings.is_empty()
    }
}

/// Whether a record needs its schedule derived.
///
/// False only when the stored schedule passes its invariants and plans
/// exactly what building the record's resolved terms would plan. A record
/// without a start date always needs migration, since its dates are only
/// fixed when it migrates.
pub fn needs_migration(legacy: &LegacyCredit) -> bool {
    let (Some(schedule), Some(start_date)) = (&legacy.schedule, legacy.start_date) else {
        return true;
    };
    if !schedule_fits(schedule, legacy) {
        return true;
    }
    let payment_day = legacy.payment_day.unwrap_or_else(|| start_date.day());
    match resolve_terms(legacy, start_date, payment_day, &SolverLimits::default()) {
        Ok(terms) => !same_plan(schedule, &build(&terms)),
        Err(_) => true,
    }
}

fn schedule_fits(schedule: &Schedule, legacy: &LegacyCredit) -> bool {
    if schedule.check_integrity().is_err() {
        return false;
    }
    if schedule.schedule_type() != legacy.schedule_type() {
        return false;
    }
    let term_fits = legacy
        .term_months
        .map_or(true, |term| schedule.len() == term as usize);
    let principal_fits = legacy
        .principal
        .map_or(true, |principal| schedule.principal() == principal);
    term_fits && principal_fits
}

/// Whether two schedules plan the same installments, ignoring ids and paid state
fn same_plan(stored: &Schedule, fresh: &Schedule) -> bool {
    stored.principal() == fresh.principal()
        && stored.len() == fresh.len()
        && stored.items().iter().zip(fresh.items()).all(|(old, new)| {
            old.month_number == new.month_number
                && old.payment_date == new.payment_date
                && old.planned_payment == new.planned_payment
                && old.interest_part == new.interest_part
                && old.principal_part == new.principal_part
                && old.remaining_balance == new.remaining_balance
        })
}

/// Migrates one legacy record.
///
/// Exactly one of principal, rate, term and payment may be missing; with
/// all four present they must agree with each other. A stored schedule is
/// kept along with its payments only when it plans every month exactly as
/// the resolved terms do; otherwise it is rebuilt.
pub fn migrate(
    legacy: &LegacyCredit,
    today: NaiveDate,
    limits: &SolverLimits,
) -> Result<Migrated, MigrationError> {
    let mut warnings = Vec::new();

    let start_date = match legacy.start_date {
        Some(date) => date,
        None => {
            warnings.push(MigrationWarning::StartDateDefaulted {
                credit_id: legacy.id,
                start_date: today,
            });
            today
        }
    };
    let payment_day = legacy.payment_day.unwrap_or_else(|| start_date.day());

    let terms = resolve_terms(legacy, start_date, payment_day, limits)?;

    let fresh = build(&terms);

    let schedule = match &legacy.schedule {
        Some(existing) if schedule_fits(existing, legacy) && same_plan(existing, &fresh) => existing.clone(),
        existing => {
            let discarded = existing.as_ref().map_or(0, |schedule| schedule.totals().paid_count);
            if discarded > 0 {
                warnings.push(MigrationWarning::PaidStateDiscarded {
                    credit_id: legacy.id,
                    count: discarded,
                });
            }
            fresh
        }
    };

    for warning in &warnings {
        warn!(credit_id = %legacy.id, ?warning, "Migration warning");
    }

    let credit = Credit::restore(legacy.id, legacy.name.clone(), terms, schedule, legacy.status);
    Ok(Migrated { credit, warnings })
}

fn resolve_terms(
    legacy: &LegacyCredit,
    start_date: NaiveDate,
    payment_day: u32,
    limits: &SolverLimits,
) -> Result<LoanTerms, MigrationError> {
    let schedule_type = legacy.schedule_type();
    let solve = |known: KnownParameters| {
        let partial = PartialLoanTerms::new(known, schedule_type, start_date).with_payment_day(payment_day);
        solve_with(partial, limits)
    };

    let terms = match (
        legacy.principal,
        legacy.annual_rate_percent,
        legacy.term_months,
        legacy.monthly_payment,
    ) {
        (Some(principal), Some(annual_rate_percent), Some(term_months), Some(monthly_payment)) => resolve_complete(
            CompleteParameters {
                principal,
                annual_rate_percent,
                term_months,
                monthly_payment,
            },
            schedule_type,
            start_date,
            payment_day,
            limits,
        )?,
        (Some(principal), None, Some(term_months), Some(monthly_payment)) => resolve_implied_rate(
            principal,
            term_months,
            monthly_payment,
            schedule_type,
            start_date,
            payment_day,
            limits,
        )?,
        (Some(principal), Some(annual_rate_percent), Some(term_months), None) => solve(KnownParameters::PrincipalRateTerm {
            principal,
            annual_rate_percent,
            term_months,
        })?,
        (Some(principal), Some(annual_rate_percent), None, Some(monthly_payment)) => {
            solve(KnownParameters::PrincipalRatePayment {
                principal,
                annual_rate_percent,
                monthly_payment,
            })?
        }
        (None, Some(annual_rate_percent), Some(term_months), Some(monthly_payment)) => {
            solve(KnownParameters::RateTermPayment {
                annual_rate_percent,
                term_months,
                monthly_payment,
            })?
        }
        _ => {
            return Err(MigrationError::InsufficientData {
                missing: legacy.missing_fields(),
            })
        }
    };

    Ok(terms)
}

/// Migrates every record independently.
///
/// A failing record lands in `failed` with its error; the rest still
/// migrate. Every input record appears in exactly one of `succeeded` and
/// `failed`.
pub fn migrate_all(
    legacy: Vec<LegacyCredit>,
    today: NaiveDate,
    limits: &SolverLimits,
) -> MigrationReport {
    let mut report = MigrationReport::default();

    for record in legacy {
        if !needs_migration(&record) {
            info!(credit_id = %record.id, "Stored schedule is current");
        }
        match migrate(&record, today, limits) {
            Ok(Migrated { credit, warnings }) => {
                report.succeeded.push(credit);
                report.warnings.extend(warnings);
            }
            Err(error) => {
                warn!(credit_id = %record.id, %error, "Credit migration failed");
                report.failed.push(MigrationFailure { credit: record, error });
            }
        }
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        warnings = report.warnings.len(),
        "Migration batch finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Option<Money> {
        Some(Money::new(amount, Currency::USD))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_missing_fields_in_order() {
        let legacy = LegacyCredit {
            principal: usd(dec!(1000)),
            annual_rate_percent: Some(dec!(5)),
            ..LegacyCredit::default()
        };

        assert_eq!(legacy.missing_fields(), vec![LoanField::TermMonths, LoanField::MonthlyPayment]);
    }

    #[test]
    fn test_two_missing_fields_fail() {
        let legacy = LegacyCredit {
            principal: usd(dec!(1000)),
            monthly_payment: usd(dec!(100)),
            start_date: Some(today()),
            ..LegacyCredit::default()
        };

        let error = migrate(&legacy, today(), &SolverLimits::default()).unwrap_err();

        assert_eq!(
            error,
            MigrationError::InsufficientData {
                missing: vec![LoanField::AnnualRate, LoanField::TermMonths]
            }
        );
    }

    #[test]
    fn test_defaulted_start_date_warns() {
        let legacy = LegacyCredit {
            principal: usd(dec!(12000)),
            annual_rate_percent: Some(dec!(0)),
            term_months: Some(12),
            ..LegacyCredit::default()
        };

        let migrated = migrate(&legacy, today(), &SolverLimits::default()).unwrap();

        assert_eq!(migrated.credit.terms().start_date(), today());
        assert_eq!(
            migrated.warnings,
            vec![MigrationWarning::StartDateDefaulted {
                credit_id: legacy.id,
                start_date: today()
            }]
        );
    }

    #[test]
    fn test_record_without_schedule_needs_migration() {
        assert!(needs_migration(&LegacyCredit::default()));
    }
}
