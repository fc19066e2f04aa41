//! Property-Based Test Generators
//!
//! Provides proptest strategies for loan parameters.
//!
//! `principal_rate_term_strategy` stays where every loan has a level
//! payment in whole cents, so solving always succeeds. The full-range
//! strategies cover every input the solver accepts, up to the longest
//! term: at high rates over decades one cent of payment moves the final
//! balance by more than an installment, and those loans are rejected.

use chrono::NaiveDate;
use core_kernel::{Currency, Money};
use domain_credit::{KnownParameters, PartialLoanTerms, ScheduleType};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::RUB),
        Just(Currency::KZT),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for principals between 10,000.00 and 10,000,000.00 USD
pub fn principal_strategy() -> impl Strategy<Value = Money> {
    (1_000_000i64..1_000_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for annual rates from 0% to 18% in hundredths of a percent
pub fn annual_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=1800u32).prop_map(|n| Decimal::new(i64::from(n), 2))
}

/// Strategy for terms from one month to 20 years
pub fn term_strategy() -> impl Strategy<Value = u32> {
    1u32..=240u32
}

pub fn schedule_type_strategy() -> impl Strategy<Value = ScheduleType> {
    prop_oneof![Just(ScheduleType::Annuity), Just(ScheduleType::Differentiated)]
}

/// Strategy for start dates in 2000..2040
pub fn start_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040i32, 1u32..=12u32, 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn payment_day_strategy() -> impl Strategy<Value = u32> {
    1u32..=31u32
}

/// Strategy for partial terms solving for the payment
pub fn principal_rate_term_strategy() -> impl Strategy<Value = PartialLoanTerms> {
    (
        principal_strategy(),
        annual_rate_strategy(),
        term_strategy(),
        schedule_type_strategy(),
        start_date_strategy(),
        payment_day_strategy(),
    )
        .prop_map(|(principal, rate, term, schedule_type, start, day)| {
            PartialLoanTerms::new(
                KnownParameters::PrincipalRateTerm {
                    principal,
                    annual_rate_percent: rate,
                    term_months: term,
                },
                schedule_type,
                start,
            )
            .with_payment_day(day)
        })
}

/// Strategy for principals between 1.00 and 1,000,000,000.00 USD
pub fn full_range_principal_strategy() -> impl Strategy<Value = Money> {
    (100i64..100_000_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for annual rates from 0% to 60% in hundredths of a percent
pub fn full_range_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=6000u32).prop_map(|n| Decimal::new(i64::from(n), 2))
}

/// Strategy for terms from one month to the solver's 100 year limit
pub fn full_range_term_strategy() -> impl Strategy<Value = u32> {
    1u32..=domain_credit::solver::DEFAULT_MAX_TERM_MONTHS
}

/// Strategy for annuity terms solving for the payment over the full range
pub fn full_range_annuity_strategy() -> impl Strategy<Value = PartialLoanTerms> {
    (
        full_range_principal_strategy(),
        full_range_rate_strategy(),
        full_range_term_strategy(),
        start_date_strategy(),
    )
        .prop_map(|(principal, rate, term, start)| {
            PartialLoanTerms::new(
                KnownParameters::PrincipalRateTerm {
                    principal,
                    annual_rate_percent: rate,
                    term_months: term,
                },
                ScheduleType::Annuity,
                start,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn principal_is_always_positive(principal in principal_strategy()) {
            prop_assert!(principal.is_positive());
        }

        #[test]
        fn rate_is_never_negative(rate in annual_rate_strategy()) {
            prop_assert!(rate >= Decimal::ZERO);
        }

        #[test]
        fn full_range_terms_stay_within_limit(term in full_range_term_strategy()) {
            prop_assert!((1..=1200).contains(&term));
        }

        #[test]
        fn generated_terms_solve_for_payment(partial in principal_rate_term_strategy()) {
            let is_principal_rate_term = matches!(partial.known, KnownParameters::PrincipalRateTerm { .. });
            prop_assert!(is_principal_rate_term);
        }
    }
}
