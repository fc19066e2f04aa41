//! Custom Test Assertions
//!
//! Provides assertion helpers for money and schedules that report which
//! month broke and why, instead of a bare `left != right`.

use core_kernel::Money;
use domain_credit::{Schedule, ScheduleLineItem, ScheduleType};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value has the given amount
pub fn assert_amount(money: &Money, expected: Decimal) {
    assert_eq!(
        money.amount(),
        expected,
        "Expected {} {}, got {}",
        money.currency().symbol(),
        expected,
        money
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts every structural schedule invariant:
///
/// - contiguous months starting at 1
/// - principal + interest equals the planned payment on every item
/// - balances chain from the principal and end at exactly zero
/// - principal parts sum to the principal
/// - paid state carries both amount and date, or neither
pub fn assert_schedule_invariants(schedule: &Schedule) {
    if let Err(defect) = schedule.check_integrity() {
        panic!("Schedule integrity violated: {}", defect);
    }

    let total_principal = schedule
        .items()
        .iter()
        .fold(Money::zero(schedule.currency()), |sum, item| sum + item.principal_part);
    assert_eq!(
        total_principal,
        schedule.principal(),
        "Principal parts sum to {}, expected {}",
        total_principal,
        schedule.principal()
    );

    for item in schedule.items() {
        assert_eq!(
            item.paid_amount().is_some(),
            item.paid_at().is_some(),
            "Month {}: paid amount and paid date must be set together",
            item.month_number
        );
    }
}

/// Asserts the payment shape of the schedule's policy.
///
/// Annuity: every item but the last plans the same payment.
/// Differentiated: planned payments never increase month over month, up to
/// the last item, which carries the principal remainder.
pub fn assert_payment_shape(schedule: &Schedule) {
    let Some((_, body)) = schedule.items().split_last() else {
        return;
    };
    match schedule.schedule_type() {
        ScheduleType::Annuity => {
            if let Some(first) = body.first() {
                for item in body {
                    assert_eq!(
                        item.planned_payment, first.planned_payment,
                        "Month {}: annuity payment {} differs from {}",
                        item.month_number, item.planned_payment, first.planned_payment
                    );
                }
            }
        }
        ScheduleType::Differentiated => {
            for pair in body.windows(2) {
                assert!(
                    pair[1].planned_payment.amount() <= pair[0].planned_payment.amount(),
                    "Month {}: differentiated payment {} exceeds previous {}",
                    pair[1].month_number,
                    pair[1].planned_payment,
                    pair[0].planned_payment
                );
            }
        }
    }
}

/// Asserts that two schedules plan the same payments, ignoring ids and paid state
pub fn assert_same_plan(actual: &Schedule, expected: &Schedule) {
    assert_eq!(actual.len(), expected.len(), "Schedules differ in length");
    for (a, e) in actual.items().iter().zip(expected.items()) {
        assert_eq!(plan_of(a), plan_of(e), "Month {} differs", a.month_number);
    }
}

fn plan_of(item: &ScheduleLineItem) -> (u32, chrono::NaiveDate, Money, Money, Money, Money) {
    (
        item.month_number,
        item.payment_date,
        item.planned_payment,
        item.interest_part,
        item.principal_part,
        item.remaining_balance,
    )
}
