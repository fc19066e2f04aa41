//! Tests for the JSON form of terms, schedules and legacy records

use domain_credit::{apply_payment, build, migrate, solve, LegacyCredit, LoanTerms, Schedule, SolverLimits};
use rust_decimal_macros::dec;
use test_utils::*;

#[test]
fn test_terms_round_trip() {
    let terms = solve(LoanFixtures::annuity_120k()).unwrap();

    let json = serde_json::to_string(&terms).unwrap();
    let back: LoanTerms = serde_json::from_str(&json).unwrap();

    assert_eq!(back, terms);
    assert!(json.contains("\"annuity\""));
}

#[test]
fn test_schedule_round_trip_keeps_payments() {
    let schedule = build(&solve(LoanFixtures::annuity_120k()).unwrap());
    let id = schedule.items()[0].id;
    let schedule = apply_payment(schedule, &id, Some(MoneyFixtures::usd(dec!(5000))), DateFixtures::today()).unwrap();

    let json = serde_json::to_string_pretty(&schedule).unwrap();
    let back: Schedule = serde_json::from_str(&json).unwrap();

    assert_eq!(back, schedule);
    assert!(back.check_integrity().is_ok());
    assert_eq!(back.item(&id).unwrap().paid_at(), Some(DateFixtures::today()));
}

#[test]
fn test_legacy_record_from_json_migrates() {
    let legacy: LegacyCredit = serde_json::from_str(
        r#"{
            "name": "Mortgage",
            "principal": { "amount": "120000", "currency": "USD" },
            "annual_rate_percent": "12",
            "term_months": 12,
            "start_date": "2024-01-15"
        }"#,
    )
    .unwrap();

    assert!(legacy.monthly_payment.is_none());

    let migrated = migrate(&legacy, DateFixtures::today(), &SolverLimits::default()).unwrap();

    assert_amount(&migrated.credit.terms().monthly_payment(), dec!(10661.85));
    assert_eq!(migrated.credit.schedule().unwrap().len(), 12);
    assert!(migrated.warnings.is_empty());
}
