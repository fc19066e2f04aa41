//! Payment schedule generation
//!
//! A schedule is built once from resolved `LoanTerms` and replaced
//! wholesale when the terms change. Each line item splits its planned
//! payment into interest on the previous balance and principal; every
//! amount is rounded to the minor unit as it is produced, and the final
//! month takes whatever balance is left so the schedule closes at exactly
//! zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, LineItemId, Money, ScheduleId};

use crate::error::ScheduleDefect;
use crate::terms::{LoanTerms, ScheduleType};

/// A payment recorded against a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedPayment {
    pub amount: Money,
    pub paid_at: NaiveDate,
}

/// One scheduled monthly payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLineItem {
    pub id: LineItemId,
    /// 1-based, contiguous within the schedule
    pub month_number: u32,
    pub payment_date: NaiveDate,
    pub planned_payment: Money,
    pub interest_part: Money,
    pub principal_part: Money,
    /// Outstanding principal after this item's principal part
    pub remaining_balance: Money,
    /// Present exactly when the item is paid
    pub payment: Option<RecordedPayment>,
}

impl ScheduleLineItem {
    pub fn is_paid(&self) -> bool {
        self.payment.is_some()
    }

    pub fn paid_amount(&self) -> Option<Money> {
        self.payment.map(|p| p.amount)
    }

    pub fn paid_at(&self) -> Option<NaiveDate> {
        self.payment.map(|p| p.paid_at)
    }

    /// Classifies this item relative to `today`
    pub fn status_on(&self, today: NaiveDate, window_days: u32) -> LineItemStatus {
        if self.is_paid() {
            return LineItemStatus::Paid;
        }
        if self.payment_date < today {
            return LineItemStatus::Overdue;
        }
        let days_until = (self.payment_date - today).num_days();
        if days_until <= i64::from(window_days) {
            LineItemStatus::DueSoon
        } else {
            LineItemStatus::Scheduled
        }
    }
}

/// Where an item stands on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemStatus {
    Paid,
    /// Unpaid with a payment date in the past
    Overdue,
    /// Unpaid and due within the reminder window
    DueSoon,
    /// Unpaid and due later
    Scheduled,
}

/// Aggregates over a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub total_planned: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub paid_count: u32,
    pub unpaid_count: u32,
    /// Sum of amounts actually recorded, which may differ from planned
    pub paid_amount: Money,
}

/// An ordered month-by-month payment plan owned by one credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    schedule_type: ScheduleType,
    principal: Money,
    items: Vec<ScheduleLineItem>,
}

impl Schedule {
    pub fn id(&self) -> ScheduleId {
        self.id
    }

    pub fn schedule_type(&self) -> ScheduleType {
        self.schedule_type
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn currency(&self) -> Currency {
        self.principal.currency()
    }

    pub fn items(&self) -> &[ScheduleLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &LineItemId) -> Option<&ScheduleLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_by_month(&self, month_number: u32) -> Option<&ScheduleLineItem> {
        self.items.iter().find(|item| item.month_number == month_number)
    }

    pub(crate) fn item_mut(&mut self, id: &LineItemId) -> Option<&mut ScheduleLineItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// First item not yet paid, in month order
    pub fn next_unpaid(&self) -> Option<&ScheduleLineItem> {
        self.items.iter().find(|item| !item.is_paid())
    }

    pub fn is_fully_paid(&self) -> bool {
        self.items.iter().all(ScheduleLineItem::is_paid)
    }

    /// Outstanding principal before the first unpaid item.
    ///
    /// The principal itself when month 1 is unpaid; zero when every item is paid.
    pub fn outstanding_balance(&self) -> Money {
        let mut before = self.principal;
        for item in &self.items {
            if !item.is_paid() {
                return before;
            }
            before = item.remaining_balance;
        }
        Money::zero(self.currency())
    }

    pub fn totals(&self) -> ScheduleTotals {
        let zero = Money::zero(self.currency());
        let mut totals = ScheduleTotals {
            total_planned: zero,
            total_interest: zero,
            total_principal: zero,
            paid_count: 0,
            unpaid_count: 0,
            paid_amount: zero,
        };

        for item in &self.items {
            totals.total_planned = totals.total_planned + item.planned_payment;
            totals.total_interest = totals.total_interest + item.interest_part;
            totals.total_principal = totals.total_principal + item.principal_part;
            match item.payment {
                Some(payment) => {
                    totals.paid_count += 1;
                    totals.paid_amount = totals.paid_amount + payment.amount;
                }
                None => totals.unpaid_count += 1,
            }
        }

        totals
    }

    /// Verifies the structural invariants of a schedule:
    ///
    /// - months run 1..=n without gaps
    /// - principal + interest equals the planned payment on every item
    /// - each balance is the previous balance minus this principal part
    /// - balances never go negative and the last one is exactly zero
    pub fn check_integrity(&self) -> Result<(), ScheduleDefect> {
        let currency = self.currency();
        let mut previous = self.principal;

        for (index, item) in self.items.iter().enumerate() {
            let expected = index as u32 + 1;
            let month = item.month_number;
            if month != expected {
                return Err(ScheduleDefect::MonthSequence { expected, found: month });
            }

            let amounts = [
                item.planned_payment,
                item.interest_part,
                item.principal_part,
                item.remaining_balance,
            ];
            if amounts.iter().any(|m| m.currency() != currency) {
                return Err(ScheduleDefect::CurrencyMismatch { month });
            }

            if item.principal_part + item.interest_part != item.planned_payment {
                return Err(ScheduleDefect::SplitMismatch { month });
            }
            if previous - item.principal_part != item.remaining_balance {
                return Err(ScheduleDefect::BalanceMismatch { month });
            }
            if item.remaining_balance.is_negative() {
                return Err(ScheduleDefect::NegativeBalance { month });
            }
            previous = item.remaining_balance;
        }

        match self.items.last() {
            None => Err(ScheduleDefect::Empty),
            Some(last) if !last.remaining_balance.is_zero() => {
                Err(ScheduleDefect::NonZeroTerminalBalance(last.remaining_balance.amount()))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Builds the payment schedule for resolved terms.
///
/// - **Annuity**: every item but the last plans the level payment; interest
///   is charged on the previous balance and the rest repays principal.
/// - **Differentiated**: every item but the last repays the floor share
///   `principal / term`; the payment is that share plus interest.
///
/// In both policies the final item repays the whole remaining balance and
/// its planned payment is adjusted to match. A zero rate charges no
/// interest, so the payments are the principal split across the term.
/// Solved terms always keep interest within range; deserialized terms
/// whose interest overflows are charged none for that month.
///
/// Each call issues fresh line-item ids; ids from an earlier build of the
/// same terms do not resolve against the new schedule.
pub fn build(terms: &LoanTerms) -> Schedule {
    let currency = terms.currency();
    let rate = terms.monthly_rate();
    let term = terms.term_months();
    let principal = terms.principal();
    let level_payment = terms.monthly_payment();
    let principal_share = Money::new(
        currency.floor(principal.amount() / Decimal::from(term.max(1))),
        currency,
    );

    let mut balance = principal;
    let mut items = Vec::with_capacity(term as usize);

    for month_number in 1..=term {
        let interest_part = rate.interest_on(&balance).unwrap_or(Money::zero(currency));
        let principal_part = if month_number == term {
            balance
        } else {
            match terms.schedule_type() {
                ScheduleType::Annuity => (level_payment - interest_part).min(balance),
                ScheduleType::Differentiated => principal_share.min(balance),
            }
        };
        balance = balance - principal_part;

        // Solved terms always have representable dates; deserialized ones may not
        let payment_date = terms.payment_date(month_number).unwrap_or(NaiveDate::MAX);

        items.push(ScheduleLineItem {
            id: LineItemId::new_v7(),
            month_number,
            payment_date,
            planned_payment: principal_part + interest_part,
            interest_part,
            principal_part,
            remaining_balance: balance,
            payment: None,
        });
    }

    let schedule = Schedule {
        id: ScheduleId::new_v7(),
        schedule_type: terms.schedule_type(),
        principal,
        items,
    };

    debug!(
        schedule_id = %schedule.id,
        schedule_type = ?schedule.schedule_type,
        months = term,
        "Built payment schedule"
    );

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use crate::terms::{KnownParameters, PartialLoanTerms};
    use rust_decimal_macros::dec;

    fn terms(principal: Decimal, rate: Decimal, months: u32, policy: ScheduleType) -> LoanTerms {
        solve(PartialLoanTerms::new(
            KnownParameters::PrincipalRateTerm {
                principal: Money::new(principal, Currency::USD),
                annual_rate_percent: rate,
                term_months: months,
            },
            policy,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        ))
        .unwrap()
    }

    #[test]
    fn test_annuity_final_item_absorbs_rounding() {
        let schedule = build(&terms(dec!(120000), dec!(12), 12, ScheduleType::Annuity));
        let last = schedule.items().last().unwrap();

        assert_eq!(last.planned_payment.amount(), dec!(10661.91));
        assert_eq!(last.principal_part.amount(), dec!(10556.35));
        assert!(last.remaining_balance.is_zero());
        assert!(schedule.check_integrity().is_ok());
    }

    #[test]
    fn test_differentiated_remainder_on_last_item() {
        let schedule = build(&terms(dec!(100000), dec!(10), 3, ScheduleType::Differentiated));
        let parts: Vec<_> = schedule.items().iter().map(|i| i.principal_part.amount()).collect();

        assert_eq!(parts, vec![dec!(33333.33), dec!(33333.33), dec!(33333.34)]);
        assert_eq!(schedule.items()[0].planned_payment.amount(), dec!(34166.66));
        assert!(schedule.check_integrity().is_ok());
    }

    #[test]
    fn test_outstanding_balance_follows_first_unpaid() {
        let mut schedule = build(&terms(dec!(12000), dec!(0), 12, ScheduleType::Annuity));
        assert_eq!(schedule.outstanding_balance().amount(), dec!(12000));

        let paid_at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let first = schedule.items()[0].id;
        schedule.item_mut(&first).unwrap().payment = Some(RecordedPayment {
            amount: Money::new(dec!(1000), Currency::USD),
            paid_at,
        });

        assert_eq!(schedule.outstanding_balance().amount(), dec!(11000));
    }

    #[test]
    fn test_integrity_detects_broken_split() {
        let mut schedule = build(&terms(dec!(12000), dec!(6), 12, ScheduleType::Annuity));
        schedule.items[3].interest_part = Money::new(dec!(1), Currency::USD);

        assert_eq!(schedule.check_integrity(), Err(ScheduleDefect::SplitMismatch { month: 4 }));
    }

    #[test]
    fn test_status_classification() {
        let schedule = build(&terms(dec!(12000), dec!(6), 12, ScheduleType::Annuity));
        let item = &schedule.items()[1];
        let due = item.payment_date;

        assert_eq!(item.status_on(due + chrono::Days::new(1), 7), LineItemStatus::Overdue);
        assert_eq!(item.status_on(due, 7), LineItemStatus::DueSoon);
        assert_eq!(item.status_on(due - chrono::Days::new(30), 7), LineItemStatus::Scheduled);
    }
}
