//! Unit tests for the Money and Rate types
//!
//! Tests cover construction and rounding, arithmetic, allocation, minor
//! units and interest accrual.

use core_kernel::{Currency, Money, MoneyError, Rate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_minor_unit() {
        let m = Money::new(dec!(100.125), Currency::USD);
        assert_eq!(m.amount(), dec!(100.13));
    }

    #[test]
    fn test_new_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec!(0.005), Currency::USD).amount(), dec!(0.01));
        assert_eq!(Money::new(dec!(-0.005), Currency::USD).amount(), dec!(-0.01));
        assert_eq!(Money::new(dec!(0.0049), Currency::USD).amount(), dec!(0.00));
    }

    #[test]
    fn test_jpy_rounds_to_whole_yen() {
        let m = Money::new(dec!(1234.5), Currency::JPY);
        assert_eq!(m.amount(), dec!(1235));
    }

    #[test]
    fn test_from_minor_converts_cents() {
        let m = Money::from_minor(10050, Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_to_minor_returns_cents() {
        assert_eq!(Money::new(dec!(100.5), Currency::USD).to_minor(), 10050);
        assert_eq!(Money::new(dec!(100), Currency::JPY).to_minor(), 100);
    }

    #[test]
    fn test_zero() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
        assert_eq!(m.currency(), Currency::EUR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_same_currency() {
        let sum = Money::new(dec!(10.10), Currency::USD) + Money::new(dec!(0.05), Currency::USD);
        assert_eq!(sum.amount(), dec!(10.15));
    }

    #[test]
    fn test_checked_add_rejects_currency_mismatch() {
        let usd = Money::new(dec!(10), Currency::USD);
        let eur = Money::new(dec!(10), Currency::EUR);

        assert_eq!(
            usd.checked_add(&eur),
            Err(MoneyError::CurrencyMismatch("USD".to_string(), "EUR".to_string()))
        );
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_add_panics_on_currency_mismatch() {
        let _ = Money::new(dec!(1), Currency::USD) + Money::new(dec!(1), Currency::GBP);
    }

    #[test]
    fn test_sub_can_go_negative() {
        let diff = Money::new(dec!(5), Currency::USD) - Money::new(dec!(7.50), Currency::USD);
        assert!(diff.is_negative());
        assert_eq!(diff.abs().amount(), dec!(2.50));
    }

    #[test]
    fn test_multiply_rounds_product() {
        let m = Money::new(dec!(10.00), Currency::USD) * dec!(0.3333);
        assert_eq!(m.amount(), dec!(3.33));
    }

    #[test]
    fn test_min_picks_smaller() {
        let a = Money::new(dec!(3), Currency::USD);
        let b = Money::new(dec!(4), Currency::USD);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }
}

mod allocation {
    use super::*;

    #[test]
    fn test_allocate_even_split() {
        let parts = Money::new(dec!(12000), Currency::USD).allocate(12).unwrap();
        assert!(parts.iter().all(|p| p.amount() == dec!(1000)));
    }

    #[test]
    fn test_allocate_remainder_on_last_part() {
        let parts = Money::new(dec!(100000), Currency::USD).allocate(3).unwrap();
        let amounts: Vec<Decimal> = parts.iter().map(Money::amount).collect();

        assert_eq!(amounts, vec![dec!(33333.33), dec!(33333.33), dec!(33333.34)]);
    }

    #[test]
    fn test_allocate_zero_parts_fails() {
        let result = Money::new(dec!(1), Currency::USD).allocate(0);
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_allocate_fewer_cents_than_parts() {
        let parts = Money::new(dec!(0.02), Currency::USD).allocate(5).unwrap();
        let amounts: Vec<Decimal> = parts.iter().map(Money::amount).collect();

        assert_eq!(amounts, vec![dec!(0), dec!(0), dec!(0), dec!(0), dec!(0.02)]);
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_monthly_from_annual_percent() {
        assert_eq!(Rate::monthly_from_annual_percent(dec!(12)).as_decimal(), dec!(0.01));
        assert!(Rate::monthly_from_annual_percent(dec!(0)).is_zero());
    }

    #[test]
    fn test_from_percentage() {
        let rate = Rate::from_percentage(dec!(5));
        assert_eq!(rate.as_decimal(), dec!(0.05));
        assert_eq!(rate.as_percentage(), dec!(5));
    }

    #[test]
    fn test_interest_on_rounds_once() {
        let rate = Rate::monthly_from_annual_percent(dec!(12));
        let interest = rate
            .interest_on(&Money::new(dec!(110538.15), Currency::USD))
            .unwrap();
        assert_eq!(interest.amount(), dec!(1105.38));
    }

    #[test]
    fn test_interest_on_repeating_monthly_rate() {
        let rate = Rate::monthly_from_annual_percent(dec!(10));
        let interest = rate
            .interest_on(&Money::new(dec!(100000), Currency::USD))
            .unwrap();
        assert_eq!(interest.amount(), dec!(833.33));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_json_keeps_exact_amount() {
        let m = Money::new(dec!(10661.85), Currency::USD);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();

        assert_eq!(back, m);
        assert!(json.contains("\"USD\""));
    }

    #[test]
    fn test_money_json_rounds_to_minor_unit() {
        let back: Money =
            serde_json::from_str(r#"{"amount":"100.555","currency":"USD"}"#).unwrap();

        assert_eq!(back.amount(), dec!(100.56));
        assert_eq!(back.amount().scale(), 2);
    }

    #[test]
    fn test_money_json_rounds_yen_to_whole_units() {
        let back: Money = serde_json::from_str(r#"{"amount":"88849.5","currency":"JPY"}"#).unwrap();

        assert_eq!(back.amount(), dec!(88850));
    }
}

proptest! {
    #[test]
    fn allocation_parts_sum_to_total(minor in 0i64..1_000_000_000i64, n in 1u32..500u32) {
        let total = Money::from_minor(minor, Currency::USD);
        let parts = total.allocate(n).unwrap();

        let sum = parts.iter().fold(Money::zero(Currency::USD), |acc, p| acc + *p);
        prop_assert_eq!(sum, total);
        prop_assert_eq!(parts.len(), n as usize);
        prop_assert!(parts.windows(2).all(|w| w[0].amount() <= w[1].amount()));
    }

    #[test]
    fn minor_units_round_trip(minor in -1_000_000_000i64..1_000_000_000i64) {
        let m = Money::from_minor(minor, Currency::EUR);
        prop_assert_eq!(m.to_minor(), i128::from(minor));
    }
}
