//! Tests for month arithmetic, date ranges and clocks

use chrono::NaiveDate;
use core_kernel::temporal::{days_in_month, monthly_due_date, shift_month, validate_payment_day};
use core_kernel::{Clock, DateRange, FixedClock, SystemClock, TemporalError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod month_arithmetic {
    use super::*;

    #[test]
    fn test_leap_february() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn test_invalid_month_has_no_days() {
        assert_eq!(days_in_month(2024, 0), 0);
    }

    #[test]
    fn test_shift_month_across_years() {
        assert_eq!(shift_month(2024, 12, 1), Some((2025, 1)));
        assert_eq!(shift_month(2024, 6, 18), Some((2025, 12)));
        assert_eq!(shift_month(2024, 1, 1200), Some((2124, 1)));
    }
}

mod due_dates {
    use super::*;

    #[test]
    fn test_day_clamped_in_short_months() {
        let start = date(2023, 1, 31);
        let dates: Vec<_> = (0..4).map(|k| monthly_due_date(start, k, 31).unwrap()).collect();

        assert_eq!(
            dates,
            vec![date(2023, 1, 31), date(2023, 2, 28), date(2023, 3, 31), date(2023, 4, 30)]
        );
    }

    #[test]
    fn test_payment_day_differs_from_start_day() {
        let start = date(2024, 1, 10);
        assert_eq!(monthly_due_date(start, 0, 25), Some(date(2024, 1, 25)));
        assert_eq!(monthly_due_date(start, 1, 25), Some(date(2024, 2, 25)));
    }

    #[test]
    fn test_first_payment_stays_in_start_month() {
        let start = date(2024, 5, 20);
        assert_eq!(monthly_due_date(start, 0, 1), Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_beyond_calendar_is_none() {
        assert_eq!(monthly_due_date(NaiveDate::MAX, 1, 1), None);
    }

    #[test]
    fn test_validate_payment_day() {
        assert_eq!(validate_payment_day(1), Ok(1));
        assert_eq!(validate_payment_day(31), Ok(31));
        assert_eq!(validate_payment_day(0), Err(TemporalError::InvalidDayOfMonth(0)));
        assert_eq!(validate_payment_day(32), Err(TemporalError::InvalidDayOfMonth(32)));
    }
}

mod date_range {
    use super::*;

    #[test]
    fn test_new_rejects_reversed_range() {
        let result = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_days_ahead_is_inclusive() {
        let range = DateRange::days_ahead(date(2024, 6, 1), 7).unwrap();

        assert_eq!(range.end, date(2024, 6, 8));
        assert_eq!(range.days(), 7);
        assert!(range.contains(date(2024, 6, 1)));
        assert!(range.contains(date(2024, 6, 8)));
        assert!(!range.contains(date(2024, 6, 9)));
    }

    #[test]
    fn test_days_ahead_overflow() {
        let result = DateRange::days_ahead(NaiveDate::MAX, 1);
        assert!(matches!(result, Err(TemporalError::OutOfRange(_))));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.to_string(), "2024-01-01..=2024-01-31");
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock(date(2024, 6, 1));
        assert_eq!(clock.today(), clock.today());
    }

    #[test]
    fn test_system_clock_is_after_epoch() {
        assert!(SystemClock.today() > date(2020, 1, 1));
    }
}
