//! Loan parameter solver
//!
//! Given the annual rate and two of {principal, term, monthly payment},
//! computes the third using the closed-form annuity formulas:
//!
//! - payment:   `A = P × i / (1 − (1+i)^−n)`
//! - principal: `P = A × (1 − (1+i)^−n) / i`
//!
//! where `i` is the monthly nominal rate. A zero rate is handled by plain
//! division. The term is not taken from a formula: `closing_month` replays
//! the level payments with the schedule's own interest rounding and reports
//! the month that closes the loan. Solved payments and principals are
//! settled against that replay one minor unit at a time, so solving for the
//! term again always recovers the requested term. When only the rate is
//! unknown, `implied_annual_rate` finds it by bisection.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::temporal::validate_payment_day;
use core_kernel::{Currency, Money, Rate};

use crate::error::{LoanField, SolverError};
use crate::terms::{CompleteParameters, KnownParameters, LoanTerms, PartialLoanTerms, ScheduleType};

/// Longest term the solver accepts, in months (100 years)
pub const DEFAULT_MAX_TERM_MONTHS: u32 = 1200;

/// Iteration budget for the rate bisection
pub const DEFAULT_MAX_RATE_ITERATIONS: u32 = 200;

const ONE: Decimal = dec!(1);
const MONTHS_PER_YEAR_PERCENT: Decimal = dec!(1200);
const RATE_TOLERANCE: Decimal = dec!(0.000000000001);
const MAX_MONTHLY_RATE: Decimal = dec!(10);
const MAX_SETTLE_STEPS: u32 = 32;

/// Bounds applied while solving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverLimits {
    pub max_term_months: u32,
    pub max_rate_iterations: u32,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_term_months: DEFAULT_MAX_TERM_MONTHS,
            max_rate_iterations: DEFAULT_MAX_RATE_ITERATIONS,
        }
    }
}

/// Resolves partial terms with the default limits
pub fn solve(partial: PartialLoanTerms) -> Result<LoanTerms, SolverError> {
    solve_with(partial, &SolverLimits::default())
}

/// Resolves partial terms by computing the one missing parameter
///
/// # Errors
///
/// - `InvalidInput` for a non-positive principal, term or payment, a
///   negative rate, a payment day outside 1..=31, or a term above the limit
/// - `InvalidInput { field: TermMonths }` when no annuity payment or
///   principal in whole minor units closes the loan in exactly the term
/// - `InfeasiblePayment` when the payment does not exceed the first
///   month's interest
/// - `Nonconvergent` when a formula leaves its domain or the arithmetic
///   leaves the decimal range
pub fn solve_with(partial: PartialLoanTerms, limits: &SolverLimits) -> Result<LoanTerms, SolverError> {
    let PartialLoanTerms {
        known,
        schedule_type,
        start_date,
        payment_day,
    } = partial;
    let missing = known.missing();
    check_payment_day(payment_day)?;

    let (principal, annual_rate_percent, term_months, monthly_payment) = match known {
        KnownParameters::PrincipalRateTerm {
            principal,
            annual_rate_percent,
            term_months,
        } => {
            check_principal(&principal)?;
            check_rate(annual_rate_percent)?;
            check_term(term_months, limits)?;
            let payment = payment_for(principal, annual_rate_percent, term_months, schedule_type)?;
            (principal, annual_rate_percent, term_months, payment)
        }
        KnownParameters::PrincipalRatePayment {
            principal,
            annual_rate_percent,
            monthly_payment,
        } => {
            check_principal(&principal)?;
            check_rate(annual_rate_percent)?;
            check_payment(&monthly_payment, principal.currency())?;
            let term = term_for(principal, annual_rate_percent, monthly_payment, limits)?;
            (principal, annual_rate_percent, term, monthly_payment)
        }
        KnownParameters::RateTermPayment {
            annual_rate_percent,
            term_months,
            monthly_payment,
        } => {
            check_payment(&monthly_payment, monthly_payment.currency())?;
            check_rate(annual_rate_percent)?;
            check_term(term_months, limits)?;
            let principal = principal_for(monthly_payment, annual_rate_percent, term_months, schedule_type)?;
            (principal, annual_rate_percent, term_months, monthly_payment)
        }
    };

    let terms = LoanTerms::resolved(
        principal,
        annual_rate_percent,
        term_months,
        monthly_payment,
        schedule_type,
        start_date,
        payment_day,
    );
    check_dates(&terms)?;

    debug!(
        solved = %missing,
        principal = %terms.principal(),
        term_months = terms.term_months(),
        monthly_payment = %terms.monthly_payment(),
        "Resolved loan terms"
    );

    Ok(terms)
}

/// Validates a record that already fixes all four parameters.
///
/// For annuity schedules the payment must imply exactly the given term.
/// Differentiated schedules do not use the payment, so only its sign and
/// currency are checked.
pub fn resolve_complete(
    parameters: CompleteParameters,
    schedule_type: ScheduleType,
    start_date: NaiveDate,
    payment_day: u32,
    limits: &SolverLimits,
) -> Result<LoanTerms, SolverError> {
    let CompleteParameters {
        principal,
        annual_rate_percent,
        term_months,
        monthly_payment,
    } = parameters;

    check_payment_day(payment_day)?;
    check_principal(&principal)?;
    check_rate(annual_rate_percent)?;
    check_term(term_months, limits)?;
    check_payment(&monthly_payment, principal.currency())?;
    first_interest(principal, annual_rate_percent)?;

    if schedule_type == ScheduleType::Annuity {
        let implied_term_months = term_for(principal, annual_rate_percent, monthly_payment, limits)?;
        if implied_term_months != term_months {
            return Err(SolverError::InconsistentTerms {
                term_months,
                implied_term_months,
            });
        }
    }

    let terms = LoanTerms::resolved(
        principal,
        annual_rate_percent,
        term_months,
        monthly_payment,
        schedule_type,
        start_date,
        payment_day,
    );
    check_dates(&terms)?;
    Ok(terms)
}

/// Resolves terms whose annual rate is unknown.
///
/// The rate comes from `implied_annual_rate`; the supplied payment is kept
/// as is rather than recomputed from the rounded rate.
pub fn resolve_implied_rate(
    principal: Money,
    term_months: u32,
    monthly_payment: Money,
    schedule_type: ScheduleType,
    start_date: NaiveDate,
    payment_day: u32,
    limits: &SolverLimits,
) -> Result<LoanTerms, SolverError> {
    check_payment_day(payment_day)?;
    let annual_rate_percent = implied_annual_rate(principal, term_months, monthly_payment, limits)?;

    let terms = LoanTerms::resolved(
        principal,
        annual_rate_percent,
        term_months,
        monthly_payment,
        schedule_type,
        start_date,
        payment_day,
    );
    check_dates(&terms)?;
    Ok(terms)
}

impl LoanTerms {
    /// Validates fully specified terms with the default limits
    pub fn from_complete(
        parameters: CompleteParameters,
        schedule_type: ScheduleType,
        start_date: NaiveDate,
        payment_day: u32,
    ) -> Result<Self, SolverError> {
        resolve_complete(parameters, schedule_type, start_date, payment_day, &SolverLimits::default())
    }
}

/// Finds the annual rate (percent, 6 decimal places) at which `payment`
/// amortizes `principal` over `term_months`.
///
/// # Errors
///
/// - `InfeasiblePayment` when `payment × term` is below the principal
/// - `Nonconvergent` when no bracketing rate exists below 12000% a year
///   or the iteration budget runs out
pub fn implied_annual_rate(
    principal: Money,
    term_months: u32,
    payment: Money,
    limits: &SolverLimits,
) -> Result<Decimal, SolverError> {
    check_principal(&principal)?;
    check_term(term_months, limits)?;
    check_payment(&payment, principal.currency())?;

    let p = principal.amount();
    let a = payment.amount();
    let n = Decimal::from(term_months);
    let total = a
        .checked_mul(n)
        .ok_or_else(|| SolverError::Nonconvergent("total of payments overflows".to_string()))?;

    if total < p {
        return Err(SolverError::InfeasiblePayment {
            payment: a,
            minimum: principal.currency().round(p / n),
        });
    }
    if total == p {
        return Ok(Decimal::ZERO);
    }

    let mut low = Decimal::ZERO;
    let mut high = dec!(0.01);
    while level_payment(p, high, term_months).is_some_and(|x| x < a) {
        high *= dec!(2);
        if high > MAX_MONTHLY_RATE {
            return Err(SolverError::Nonconvergent(format!(
                "payment {} is too large to bracket a rate",
                payment
            )));
        }
    }

    for iteration in 0..limits.max_rate_iterations {
        let mid = (low + high) / dec!(2);
        match level_payment(p, mid, term_months) {
            Some(x) if x < a => low = mid,
            Some(_) => high = mid,
            None => {
                return Err(SolverError::Nonconvergent(format!(
                    "payment formula undefined at monthly rate {}",
                    mid
                )))
            }
        }

        if high - low <= RATE_TOLERANCE {
            let annual = ((low + high) / dec!(2) * MONTHS_PER_YEAR_PERCENT).round_dp(6);
            debug!(iterations = iteration + 1, annual_rate = %annual, "Implied annual rate");
            return Ok(annual.normalize());
        }
    }

    Err(SolverError::Nonconvergent(format!(
        "rate search did not settle within {} iterations",
        limits.max_rate_iterations
    )))
}

fn payment_for(
    principal: Money,
    annual_rate_percent: Decimal,
    term_months: u32,
    schedule_type: ScheduleType,
) -> Result<Money, SolverError> {
    let rate = Rate::monthly_from_annual_percent(annual_rate_percent);

    let payment = if rate.is_zero() {
        let shares = principal
            .allocate(term_months)
            .map_err(|e| SolverError::invalid(LoanField::Principal, e.to_string()))?;
        shares.first().copied().unwrap_or(principal)
    } else {
        let raw = level_payment(principal.amount(), rate.as_decimal(), term_months).ok_or_else(|| {
            SolverError::Nonconvergent(format!(
                "payment formula undefined for {} over {} months",
                rate, term_months
            ))
        })?;
        Money::new(raw, principal.currency())
    };

    if !payment.is_positive() {
        return Err(SolverError::invalid(
            LoanField::Principal,
            format!("{} is too small to spread over {} months", principal, term_months),
        ));
    }
    if schedule_type == ScheduleType::Differentiated {
        return Ok(payment);
    }

    let minor = principal.currency().minor_unit();
    settle(payment, term_months, -minor, |candidate| {
        closing_month(principal, rate, candidate, term_months)
    })?
    .ok_or_else(|| {
        SolverError::invalid(
            LoanField::TermMonths,
            format!(
                "no level payment in whole minor units of {} repays {} in exactly {} months at {}%",
                principal.currency(),
                principal,
                term_months,
                annual_rate_percent
            ),
        )
    })
}

fn term_for(
    principal: Money,
    annual_rate_percent: Decimal,
    payment: Money,
    limits: &SolverLimits,
) -> Result<u32, SolverError> {
    let rate = Rate::monthly_from_annual_percent(annual_rate_percent);
    let interest = first_interest(principal, annual_rate_percent)?;

    if payment.amount() <= interest {
        return Err(SolverError::InfeasiblePayment {
            payment: payment.amount(),
            minimum: principal.currency().round(interest),
        });
    }

    closing_month(principal, rate, payment, limits.max_term_months)?.ok_or_else(|| {
        SolverError::invalid(
            LoanField::MonthlyPayment,
            format!(
                "{} does not repay {} within the {} month limit",
                payment, principal, limits.max_term_months
            ),
        )
    })
}

fn principal_for(
    payment: Money,
    annual_rate_percent: Decimal,
    term_months: u32,
    schedule_type: ScheduleType,
) -> Result<Money, SolverError> {
    let rate = Rate::monthly_from_annual_percent(annual_rate_percent);
    let a = payment.amount();

    let raw = if rate.is_zero() {
        a.checked_mul(Decimal::from(term_months))
    } else {
        let i = rate.as_decimal();
        let discount = match (ONE + i).checked_powi(i64::from(term_months)) {
            Some(growth) => ONE - ONE / growth,
            None => ONE,
        };
        a.checked_mul(discount).and_then(|x| x.checked_div(i))
    }
    .ok_or_else(|| overflow("principal"))?;

    let principal = Money::new(raw, payment.currency());
    if !principal.is_positive() {
        return Err(SolverError::invalid(
            LoanField::MonthlyPayment,
            format!("{} is too small to carry any principal", payment),
        ));
    }
    if schedule_type == ScheduleType::Differentiated {
        return Ok(principal);
    }

    let minor = payment.currency().minor_unit();
    settle(principal, term_months, minor, |candidate| {
        closing_month(candidate, rate, payment, term_months)
    })?
    .ok_or_else(|| {
        SolverError::invalid(
            LoanField::TermMonths,
            format!(
                "no principal in whole minor units of {} is repaid by {} in exactly {} months at {}%",
                payment.currency(),
                payment,
                term_months,
                annual_rate_percent
            ),
        )
    })
}

/// Replays level payments of `payment` against `principal`, charging
/// interest exactly as `schedule::build` does, and returns the month whose
/// installment closes the loan.
///
/// Month `k` closes once the balance left after paying `payment` is within
/// the drift `minor × ((1+i)^k − 1) / i` that rounding the payment to the
/// minor unit can accumulate. The drift is capped one minor unit below the
/// payment, which keeps the closing installment under twice the level
/// payment. `None` when the balance stops falling or outlasts `max_months`.
fn closing_month(
    principal: Money,
    rate: Rate,
    payment: Money,
    max_months: u32,
) -> Result<Option<u32>, SolverError> {
    let minor = principal.currency().minor_unit();
    let growth = ONE + rate.as_decimal();
    let cap = payment.amount() - minor;

    let mut balance = principal;
    let mut factor = Decimal::ZERO;
    let mut drift = Decimal::ZERO;
    let mut capped = false;

    for month in 1..=max_months {
        let interest = rate.interest_on(&balance).map_err(|_| overflow("interest"))?;
        let left = balance
            .checked_add(&interest)
            .and_then(|owed| owed.checked_sub(&payment))
            .map_err(|_| overflow("balance"))?;

        if !capped {
            let next = factor
                .checked_mul(growth)
                .and_then(|f| f.checked_add(ONE))
                .and_then(|f| f.checked_mul(minor).map(|d| (f, d)));
            match next {
                Some((f, d)) if d < cap => {
                    factor = f;
                    drift = d;
                }
                _ => {
                    capped = true;
                    drift = cap;
                }
            }
        }

        if left.amount() <= drift {
            return Ok(Some(month));
        }
        if left.amount() >= balance.amount() {
            return Ok(None);
        }
        balance = left;
    }
    Ok(None)
}

/// Moves `start` one minor unit at a time until `closes_at` reports
/// `term_months`.
///
/// `early_step` is applied while the loan closes too early and reversed
/// while it runs long. `None` once the walk turns back, leaves the positive
/// range or exhausts its steps: no value in whole minor units then closes
/// the loan in exactly `term_months`.
fn settle(
    start: Money,
    term_months: u32,
    early_step: Decimal,
    closes_at: impl Fn(Money) -> Result<Option<u32>, SolverError>,
) -> Result<Option<Money>, SolverError> {
    let mut value = start;
    let mut previous_step = None;

    for _ in 0..=MAX_SETTLE_STEPS {
        if !value.is_positive() {
            return Ok(None);
        }
        let step = match closes_at(value)? {
            Some(month) if month == term_months => return Ok(Some(value)),
            Some(month) if month < term_months => early_step,
            _ => -early_step,
        };
        if previous_step.is_some_and(|previous| previous != step) {
            return Ok(None);
        }
        previous_step = Some(step);

        match value.amount().checked_add(step) {
            Some(next) => value = Money::new(next, value.currency()),
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Unrounded interest on `principal` for the first month
fn first_interest(principal: Money, annual_rate_percent: Decimal) -> Result<Decimal, SolverError> {
    let rate = Rate::monthly_from_annual_percent(annual_rate_percent);
    principal
        .amount()
        .checked_mul(rate.as_decimal())
        .ok_or_else(|| overflow("first month's interest"))
}

fn overflow(quantity: &str) -> SolverError {
    SolverError::Nonconvergent(format!("{} overflows", quantity))
}

/// Level payment amortizing `p` over `n` months at monthly rate `i > 0`
fn level_payment(p: Decimal, i: Decimal, n: u32) -> Option<Decimal> {
    let discount = match (ONE + i).checked_powi(i64::from(n)) {
        Some(growth) => ONE - ONE.checked_div(growth)?,
        // (1+i)^n beyond Decimal range: the discount term is indistinguishable from one
        None => ONE,
    };
    if discount <= Decimal::ZERO {
        return None;
    }
    p.checked_mul(i)?.checked_div(discount)
}

fn check_principal(principal: &Money) -> Result<(), SolverError> {
    if !principal.is_positive() {
        return Err(SolverError::invalid(
            LoanField::Principal,
            format!("must be positive, got {}", principal.amount()),
        ));
    }
    Ok(())
}

fn check_payment(payment: &Money, currency: Currency) -> Result<(), SolverError> {
    if payment.currency() != currency {
        return Err(SolverError::invalid(
            LoanField::MonthlyPayment,
            format!("currency {} does not match principal currency {}", payment.currency(), currency),
        ));
    }
    if !payment.is_positive() {
        return Err(SolverError::invalid(
            LoanField::MonthlyPayment,
            format!("must be positive, got {}", payment.amount()),
        ));
    }
    Ok(())
}

fn check_rate(annual_rate_percent: Decimal) -> Result<(), SolverError> {
    if annual_rate_percent.is_sign_negative() && !annual_rate_percent.is_zero() {
        return Err(SolverError::invalid(
            LoanField::AnnualRate,
            format!("must not be negative, got {}", annual_rate_percent),
        ));
    }
    Ok(())
}

fn check_term(term_months: u32, limits: &SolverLimits) -> Result<(), SolverError> {
    if term_months == 0 {
        return Err(SolverError::invalid(LoanField::TermMonths, "must be at least one month"));
    }
    if term_months > limits.max_term_months {
        return Err(SolverError::invalid(
            LoanField::TermMonths,
            format!("must not exceed {} months, got {}", limits.max_term_months, term_months),
        ));
    }
    Ok(())
}

fn check_payment_day(payment_day: u32) -> Result<(), SolverError> {
    validate_payment_day(payment_day)
        .map(|_| ())
        .map_err(|e| SolverError::invalid(LoanField::PaymentDay, e.to_string()))
}

fn check_dates(terms: &LoanTerms) -> Result<(), SolverError> {
    if terms.payment_date(terms.term_months()).is_none() {
        return Err(SolverError::invalid(
            LoanField::StartDate,
            format!("payments starting {} run past the supported calendar", terms.start_date()),
        ));
    }
    Ok(())
}
