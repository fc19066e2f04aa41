//! Pre-built Test Fixtures
//!
//! Provides ready-to-use loans whose schedules have been worked out by hand,
//! so tests can assert exact figures rather than re-deriving them.

use chrono::NaiveDate;
use core_kernel::{Currency, FixedClock, Money};
use domain_credit::{
    CreditEngine, EngineConfig, KnownParameters, LoanTerms, PartialLoanTerms, ScheduleType, solve,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// A JPY amount (zero decimal places)
    pub fn jpy(amount: Decimal) -> Money {
        Money::new(amount, Currency::JPY)
    }
}

/// Fixture for calendar dates
pub struct DateFixtures;

impl DateFixtures {
    /// Standard loan start (Jan 15, 2024)
    pub fn loan_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    /// Month-end start for day clamping (Jan 31, 2024)
    pub fn month_end_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    /// "Today" used by engine fixtures (Jun 1, 2024)
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}

/// Reference loans with known schedules
pub struct LoanFixtures;

impl LoanFixtures {
    /// 120,000 at 12% over 12 months, solving for the payment
    pub fn annuity_120k() -> PartialLoanTerms {
        Self::principal_rate_term(dec!(120000), dec!(12), 12, ScheduleType::Annuity)
    }

    /// 120,000 at 12% over 12 months with level principal
    pub fn differentiated_120k() -> PartialLoanTerms {
        Self::principal_rate_term(dec!(120000), dec!(12), 12, ScheduleType::Differentiated)
    }

    /// 12,000 interest-free over 12 months
    pub fn interest_free_12k(schedule_type: ScheduleType) -> PartialLoanTerms {
        Self::principal_rate_term(dec!(12000), dec!(0), 12, schedule_type)
    }

    /// 100,000 at 10% over 3 months, where the principal does not split evenly
    pub fn uneven_100k(schedule_type: ScheduleType) -> PartialLoanTerms {
        Self::principal_rate_term(dec!(100000), dec!(10), 3, schedule_type)
    }

    /// 50,000 at 10% paying `payment` a month, solving for the term
    pub fn fixed_payment_50k(payment: Decimal) -> PartialLoanTerms {
        PartialLoanTerms::new(
            KnownParameters::PrincipalRatePayment {
                principal: MoneyFixtures::usd(dec!(50000)),
                annual_rate_percent: dec!(10),
                monthly_payment: MoneyFixtures::usd(payment),
            },
            ScheduleType::Annuity,
            DateFixtures::loan_start(),
        )
    }

    pub fn principal_rate_term(
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_months: u32,
        schedule_type: ScheduleType,
    ) -> PartialLoanTerms {
        PartialLoanTerms::new(
            KnownParameters::PrincipalRateTerm {
                principal: MoneyFixtures::usd(principal),
                annual_rate_percent,
                term_months,
            },
            schedule_type,
            DateFixtures::loan_start(),
        )
    }

    /// Solved terms for a fixture; panics if the fixture does not solve
    pub fn solved(partial: PartialLoanTerms) -> LoanTerms {
        solve(partial).expect("fixture terms should solve")
    }
}

/// Engine pinned to `DateFixtures::today()`
pub fn fixed_engine() -> CreditEngine<FixedClock> {
    engine_on(DateFixtures::today())
}

pub fn engine_on(today: NaiveDate) -> CreditEngine<FixedClock> {
    CreditEngine::with_clock(EngineConfig::default(), FixedClock(today))
}
