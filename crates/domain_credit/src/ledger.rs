//! Payment recording and due-payment queries
//!
//! Recording a payment marks one line item paid and nothing else: the
//! planned balances stay as generated even when the amount paid differs
//! from the amount planned. Reshaping the plan after an over- or
//! under-payment is an explicit rebuild through `Credit::replace_terms`.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CreditId, DateRange, LineItemId, Money};

use crate::credit::Credit;
use crate::error::LedgerError;
use crate::schedule::{RecordedPayment, Schedule};

impl Schedule {
    /// Marks a line item paid.
    ///
    /// `amount` defaults to the item's planned payment. Recording against an
    /// item that is already paid overwrites the earlier amount and date.
    pub fn record_payment(
        &mut self,
        id: &LineItemId,
        amount: Option<Money>,
        paid_at: NaiveDate,
    ) -> Result<&RecordedPayment, LedgerError> {
        let currency = self.currency();
        if let Some(amount) = amount {
            if amount.currency() != currency {
                return Err(LedgerError::InvalidAmount(format!(
                    "{} is not in the schedule currency {}",
                    amount, currency
                )));
            }
            if !amount.is_positive() {
                return Err(LedgerError::InvalidAmount(format!("{} must be positive", amount)));
            }
        }

        let item = self.item_mut(id).ok_or(LedgerError::LineItemNotFound(*id))?;
        let amount = amount.unwrap_or(item.planned_payment);
        let overwritten = item.payment.is_some();

        debug!(
            line_item_id = %id,
            month = item.month_number,
            amount = %amount,
            overwritten,
            "Recorded payment"
        );

        let recorded = item.payment.insert(RecordedPayment { amount, paid_at });
        Ok(&*recorded)
    }

    /// Clears the payment recorded on a line item, returning what was cleared
    pub fn clear_payment(&mut self, id: &LineItemId) -> Result<Option<RecordedPayment>, LedgerError> {
        let item = self.item_mut(id).ok_or(LedgerError::LineItemNotFound(*id))?;
        let cleared = item.payment.take();

        debug!(line_item_id = %id, month = item.month_number, was_paid = cleared.is_some(), "Cleared payment");

        Ok(cleared)
    }
}

/// Returns `schedule` with the line item marked paid
pub fn apply_payment(
    mut schedule: Schedule,
    id: &LineItemId,
    amount: Option<Money>,
    paid_at: NaiveDate,
) -> Result<Schedule, LedgerError> {
    schedule.record_payment(id, amount, paid_at)?;
    Ok(schedule)
}

/// Returns `schedule` with the line item's payment cleared
pub fn reverse_payment(mut schedule: Schedule, id: &LineItemId) -> Result<Schedule, LedgerError> {
    schedule.clear_payment(id)?;
    Ok(schedule)
}

/// Why a payment shows up in a due query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueKind {
    /// Payment date has passed
    Overdue,
    /// Payment date falls within the requested window
    Upcoming,
}

/// An unpaid line item surfaced by `due_within`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuePayment {
    pub credit_id: CreditId,
    pub credit_name: String,
    pub line_item_id: LineItemId,
    pub month_number: u32,
    pub payment_date: NaiveDate,
    pub planned_payment: Money,
    pub kind: DueKind,
}

/// Collects unpaid line items that are overdue or due in the next
/// `days_ahead` days, across every active credit.
///
/// Credits without a schedule are skipped. Results are ordered by payment
/// date, then credit name, then month number.
pub fn due_within(credits: &[Credit], days_ahead: u32, today: NaiveDate) -> Vec<DuePayment> {
    let horizon = DateRange::days_ahead(today, days_ahead)
        .map(|range| range.end)
        .unwrap_or(NaiveDate::MAX);

    let mut due: Vec<DuePayment> = credits
        .iter()
        .filter(|credit| credit.is_active())
        .filter_map(|credit| credit.schedule().map(|schedule| (credit, schedule)))
        .flat_map(|(credit, schedule)| {
            schedule
                .items()
                .iter()
                .filter(|item| !item.is_paid())
                .take_while(|item| item.payment_date <= horizon)
                .map(move |item| DuePayment {
                    credit_id: credit.id,
                    credit_name: credit.name.clone(),
                    line_item_id: item.id,
                    month_number: item.month_number,
                    payment_date: item.payment_date,
                    planned_payment: item.planned_payment,
                    kind: if item.payment_date < today {
                        DueKind::Overdue
                    } else {
                        DueKind::Upcoming
                    },
                })
        })
        .collect();

    due.sort_by(compare_due);

    debug!(count = due.len(), days_ahead, %today, "Collected due payments");
    due
}

fn compare_due(a: &DuePayment, b: &DuePayment) -> Ordering {
    a.payment_date
        .cmp(&b.payment_date)
        .then_with(|| a.credit_name.cmp(&b.credit_name))
        .then_with(|| a.month_number.cmp(&b.month_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use crate::schedule::build;
    use crate::terms::{KnownParameters, PartialLoanTerms, ScheduleType};
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn schedule() -> Schedule {
        let terms = solve(PartialLoanTerms::new(
            KnownParameters::PrincipalRateTerm {
                principal: Money::new(dec!(12000), Currency::USD),
                annual_rate_percent: dec!(0),
                term_months: 12,
            },
            ScheduleType::Annuity,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ))
        .unwrap();
        build(&terms)
    }

    fn paid_at() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
    }

    #[test]
    fn test_record_defaults_to_planned_amount() {
        let mut schedule = schedule();
        let id = schedule.items()[0].id;

        let recorded = *schedule.record_payment(&id, None, paid_at()).unwrap();

        assert_eq!(recorded.amount.amount(), dec!(1000));
        assert_eq!(recorded.paid_at, paid_at());
    }

    #[test]
    fn test_record_rejects_foreign_currency() {
        let mut schedule = schedule();
        let id = schedule.items()[0].id;

        let result = schedule.record_payment(&id, Some(Money::new(dec!(1000), Currency::EUR)), paid_at());

        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        assert!(!schedule.items()[0].is_paid());
    }

    #[test]
    fn test_record_rejects_zero_amount() {
        let mut schedule = schedule();
        let id = schedule.items()[0].id;

        let result = schedule.record_payment(&id, Some(Money::zero(Currency::USD)), paid_at());

        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_clear_unknown_item() {
        let mut schedule = schedule();
        let stale = LineItemId::new();

        assert_eq!(schedule.clear_payment(&stale), Err(LedgerError::LineItemNotFound(stale)));
    }

    #[test]
    fn test_clear_returns_previous_payment() {
        let mut schedule = schedule();
        let id = schedule.items()[2].id;
        schedule.record_payment(&id, None, paid_at()).unwrap();

        let cleared = schedule.clear_payment(&id).unwrap();

        assert!(cleared.is_some());
        assert!(schedule.clear_payment(&id).unwrap().is_none());
    }
}
