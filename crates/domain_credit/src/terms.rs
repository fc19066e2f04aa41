//! Loan parameters
//!
//! `PartialLoanTerms` is what a caller knows; `LoanTerms` is the fully
//! resolved, validated set a schedule is built from. A `LoanTerms` value is
//! only produced by the solver, so the generator never has to re-check it.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::temporal::monthly_due_date;
use core_kernel::{Currency, Money, Rate};

use crate::error::LoanField;

/// Amortization policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    /// Level total payment; the interest share shrinks over time
    #[default]
    Annuity,
    /// Level principal payment; the total payment shrinks over time
    Differentiated,
}

/// The three solvable combinations of loan parameters.
///
/// The annual rate is always known; exactly one of principal, term and
/// monthly payment is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "solve_for", rename_all = "snake_case")]
pub enum KnownParameters {
    /// Solve for the monthly payment
    PrincipalRateTerm {
        principal: Money,
        annual_rate_percent: Decimal,
        term_months: u32,
    },
    /// Solve for the term
    PrincipalRatePayment {
        principal: Money,
        annual_rate_percent: Decimal,
        monthly_payment: Money,
    },
    /// Solve for the principal
    RateTermPayment {
        annual_rate_percent: Decimal,
        term_months: u32,
        monthly_payment: Money,
    },
}

impl KnownParameters {
    /// The parameter the solver will compute
    pub fn missing(&self) -> LoanField {
        match self {
            KnownParameters::PrincipalRateTerm { .. } => LoanField::MonthlyPayment,
            KnownParameters::PrincipalRatePayment { .. } => LoanField::TermMonths,
            KnownParameters::RateTermPayment { .. } => LoanField::Principal,
        }
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        match self {
            KnownParameters::PrincipalRateTerm { annual_rate_percent, .. }
            | KnownParameters::PrincipalRatePayment { annual_rate_percent, .. }
            | KnownParameters::RateTermPayment { annual_rate_percent, .. } => *annual_rate_percent,
        }
    }
}

/// All four loan parameters, as held by a record that already fixed them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteParameters {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    pub monthly_payment: Money,
}

/// Known parameters plus the schedule layout options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialLoanTerms {
    pub known: KnownParameters,
    pub schedule_type: ScheduleType,
    pub start_date: NaiveDate,
    /// Day of month payments fall on (1..=31), clamped to short months
    pub payment_day: u32,
}

impl PartialLoanTerms {
    /// Creates partial terms paying on the start date's day of month
    pub fn new(known: KnownParameters, schedule_type: ScheduleType, start_date: NaiveDate) -> Self {
        Self {
            known,
            schedule_type,
            start_date,
            payment_day: start_date.day(),
        }
    }

    pub fn with_payment_day(mut self, payment_day: u32) -> Self {
        self.payment_day = payment_day;
        self
    }
}

/// Fully resolved loan parameters
///
/// # Invariants
///
/// - principal and monthly payment are positive and share a currency
/// - the annual rate is non-negative, the term is at least one month
/// - `payment_day` is in 1..=31 and every payment date is representable
/// - for annuity schedules, the payment amortizes the principal in exactly
///   `term_months` months (the final month absorbing rounding)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    principal: Money,
    annual_rate_percent: Decimal,
    term_months: u32,
    monthly_payment: Money,
    schedule_type: ScheduleType,
    start_date: NaiveDate,
    payment_day: u32,
}

impl LoanTerms {
    /// Assembles terms the solver has already validated
    pub(crate) fn resolved(
        principal: Money,
        annual_rate_percent: Decimal,
        term_months: u32,
        monthly_payment: Money,
        schedule_type: ScheduleType,
        start_date: NaiveDate,
        payment_day: u32,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent: annual_rate_percent.normalize(),
            term_months,
            monthly_payment,
            schedule_type,
            start_date,
            payment_day,
        }
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// The level payment for annuity schedules.
    ///
    /// For differentiated schedules this is the annuity-equivalent reference
    /// figure; actual planned payments come from the schedule.
    pub fn monthly_payment(&self) -> Money {
        self.monthly_payment
    }

    pub fn schedule_type(&self) -> ScheduleType {
        self.schedule_type
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn payment_day(&self) -> u32 {
        self.payment_day
    }

    pub fn currency(&self) -> Currency {
        self.principal.currency()
    }

    /// Monthly nominal rate (`annual / 12 / 100`)
    pub fn monthly_rate(&self) -> Rate {
        Rate::monthly_from_annual_percent(self.annual_rate_percent)
    }

    pub fn is_interest_free(&self) -> bool {
        self.annual_rate_percent.is_zero()
    }

    /// Payment date of the given 1-based month
    pub fn payment_date(&self, month_number: u32) -> Option<NaiveDate> {
        let offset = month_number.checked_sub(1)?;
        monthly_due_date(self.start_date, offset, self.payment_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_field_per_variant() {
        let principal = Money::new(dec!(1000), Currency::USD);
        let payment = Money::new(dec!(100), Currency::USD);

        let for_payment = KnownParameters::PrincipalRateTerm {
            principal,
            annual_rate_percent: dec!(5),
            term_months: 12,
        };
        let for_term = KnownParameters::PrincipalRatePayment {
            principal,
            annual_rate_percent: dec!(5),
            monthly_payment: payment,
        };
        let for_principal = KnownParameters::RateTermPayment {
            annual_rate_percent: dec!(5),
            term_months: 12,
            monthly_payment: payment,
        };

        assert_eq!(for_payment.missing(), LoanField::MonthlyPayment);
        assert_eq!(for_term.missing(), LoanField::TermMonths);
        assert_eq!(for_principal.missing(), LoanField::Principal);
    }

    #[test]
    fn test_partial_terms_default_payment_day() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let partial = PartialLoanTerms::new(
            KnownParameters::PrincipalRateTerm {
                principal: Money::new(dec!(1000), Currency::USD),
                annual_rate_percent: dec!(5),
                term_months: 12,
            },
            ScheduleType::Annuity,
            start,
        );

        assert_eq!(partial.payment_day, 17);
        assert_eq!(partial.with_payment_day(31).payment_day, 31);
    }
}
