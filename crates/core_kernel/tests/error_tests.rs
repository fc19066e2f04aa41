//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::TemporalError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("credit CRD-1");
    assert_eq!(error.to_string(), "Not found: credit CRD-1");
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("max_term_months must be at least 1");
    assert!(matches!(error, CoreError::Configuration(_)));
}

#[test]
fn test_money_error_converts() {
    let error: CoreError = MoneyError::Overflow.into();
    assert_eq!(error.to_string(), "Money error: Overflow during calculation");
}

#[test]
fn test_temporal_error_converts() {
    let error: CoreError = TemporalError::InvalidDayOfMonth(40).into();
    assert!(matches!(error, CoreError::Temporal(TemporalError::InvalidDayOfMonth(40))));
}
