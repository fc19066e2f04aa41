//! Test Data Builders
//!
//! Builders let tests set only the fields that matter and take defaults
//! for the rest.

use chrono::NaiveDate;
use core_kernel::{Currency, CreditId, Money};
use domain_credit::{
    Credit, CreditStatus, KnownParameters, LegacyCredit, PartialLoanTerms, Schedule, ScheduleType,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::DateFixtures;

/// Builder for partial loan terms
///
/// Defaults to 10,000 USD at 6% over 24 months, annuity, starting
/// `DateFixtures::loan_start()`.
pub struct PartialTermsBuilder {
    currency: Currency,
    principal: Option<Decimal>,
    annual_rate_percent: Decimal,
    term_months: Option<u32>,
    monthly_payment: Option<Decimal>,
    schedule_type: ScheduleType,
    start_date: NaiveDate,
    payment_day: Option<u32>,
}

impl Default for PartialTermsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialTermsBuilder {
    pub fn new() -> Self {
        Self {
            currency: Currency::USD,
            principal: Some(dec!(10000)),
            annual_rate_percent: dec!(6),
            term_months: Some(24),
            monthly_payment: None,
            schedule_type: ScheduleType::Annuity,
            start_date: DateFixtures::loan_start(),
            payment_day: None,
        }
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn principal(mut self, principal: Decimal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn rate(mut self, annual_rate_percent: Decimal) -> Self {
        self.annual_rate_percent = annual_rate_percent;
        self
    }

    pub fn term(mut self, term_months: u32) -> Self {
        self.term_months = Some(term_months);
        self
    }

    pub fn payment(mut self, monthly_payment: Decimal) -> Self {
        self.monthly_payment = Some(monthly_payment);
        self
    }

    /// Leaves the principal for the solver
    pub fn solve_principal(mut self) -> Self {
        self.principal = None;
        self
    }

    /// Leaves the term for the solver
    pub fn solve_term(mut self) -> Self {
        self.term_months = None;
        self
    }

    pub fn differentiated(mut self) -> Self {
        self.schedule_type = ScheduleType::Differentiated;
        self
    }

    pub fn start(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn payment_day(mut self, day: u32) -> Self {
        self.payment_day = Some(day);
        self
    }

    /// Builds the partial terms
    ///
    /// # Panics
    ///
    /// Panics unless exactly one of principal, term and payment is unset.
    pub fn build(self) -> PartialLoanTerms {
        let money = |amount: Decimal| Money::new(amount, self.currency);
        let rate = self.annual_rate_percent;

        let known = match (self.principal, self.term_months, self.monthly_payment) {
            (Some(p), Some(n), None) => KnownParameters::PrincipalRateTerm {
                principal: money(p),
                annual_rate_percent: rate,
                term_months: n,
            },
            (Some(p), None, Some(a)) => KnownParameters::PrincipalRatePayment {
                principal: money(p),
                annual_rate_percent: rate,
                monthly_payment: money(a),
            },
            (None, Some(n), Some(a)) => KnownParameters::RateTermPayment {
                annual_rate_percent: rate,
                term_months: n,
                monthly_payment: money(a),
            },
            other => panic!("exactly one parameter must be left unset, got {:?}", other),
        };

        let partial = PartialLoanTerms::new(known, self.schedule_type, self.start_date);
        match self.payment_day {
            Some(day) => partial.with_payment_day(day),
            None => partial,
        }
    }

    /// Opens a credit from the built terms
    pub fn open(self, name: &str) -> Credit {
        Credit::open(name, self.build()).expect("builder terms should solve")
    }
}

/// Builder for legacy credit records
pub struct LegacyCreditBuilder {
    record: LegacyCredit,
}

impl Default for LegacyCreditBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyCreditBuilder {
    /// An empty record named "Legacy loan" starting `DateFixtures::loan_start()`
    pub fn new() -> Self {
        Self {
            record: LegacyCredit {
                id: CreditId::new(),
                name: "Legacy loan".to_string(),
                start_date: Some(DateFixtures::loan_start()),
                ..LegacyCredit::default()
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = name.into();
        self
    }

    pub fn principal(mut self, amount: Decimal) -> Self {
        self.record.principal = Some(Money::new(amount, Currency::USD));
        self
    }

    pub fn rate(mut self, annual_rate_percent: Decimal) -> Self {
        self.record.annual_rate_percent = Some(annual_rate_percent);
        self
    }

    pub fn term(mut self, term_months: u32) -> Self {
        self.record.term_months = Some(term_months);
        self
    }

    pub fn payment(mut self, amount: Decimal) -> Self {
        self.record.monthly_payment = Some(Money::new(amount, Currency::USD));
        self
    }

    pub fn differentiated(mut self) -> Self {
        self.record.schedule_type = Some(ScheduleType::Differentiated);
        self
    }

    pub fn without_start_date(mut self) -> Self {
        self.record.start_date = None;
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.record.schedule = Some(schedule);
        self
    }

    pub fn archived(mut self) -> Self {
        self.record.status = CreditStatus::Archived;
        self
    }

    pub fn build(self) -> LegacyCredit {
        self.record
    }
}
