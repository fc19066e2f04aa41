//! Property tests for schedule and ledger invariants

use domain_credit::{
    apply_payment, build, migrate_all, reverse_payment, solve, KnownParameters, LegacyCredit, LoanField,
    PartialLoanTerms, SolverError, SolverLimits,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use test_utils::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn built_schedule_amortizes_exactly(partial in principal_rate_term_strategy()) {
        let terms = solve(partial).unwrap();
        let schedule = build(&terms);

        prop_assert_eq!(schedule.len(), terms.term_months() as usize);
        prop_assert!(schedule.items().last().unwrap().remaining_balance.is_zero());
        assert_schedule_invariants(&schedule);
        assert_payment_shape(&schedule);
    }

    #[test]
    fn solved_payment_recovers_term(partial in principal_rate_term_strategy()) {
        let terms = solve(partial.clone()).unwrap();
        let inverse = PartialLoanTerms {
            known: KnownParameters::PrincipalRatePayment {
                principal: terms.principal(),
                annual_rate_percent: terms.annual_rate_percent(),
                monthly_payment: terms.monthly_payment(),
            },
            ..partial
        };

        let resolved = solve(inverse).unwrap();
        prop_assert_eq!(resolved.term_months(), terms.term_months());
        prop_assert_eq!(build(&resolved).len(), terms.term_months() as usize);
    }

    #[test]
    fn full_range_payment_is_level_and_recovers_term(partial in full_range_annuity_strategy()) {
        match solve(partial.clone()) {
            Ok(terms) => {
                let schedule = build(&terms);
                let level = terms.monthly_payment();
                let (last, body) = schedule.items().split_last().unwrap();

                prop_assert!(body.iter().all(|item| item.planned_payment == level));
                prop_assert!(last.planned_payment.is_positive());
                prop_assert!(last.planned_payment.amount() < level.amount() * Decimal::TWO);
                prop_assert!(last.remaining_balance.is_zero());

                let inverse = PartialLoanTerms {
                    known: KnownParameters::PrincipalRatePayment {
                        principal: terms.principal(),
                        annual_rate_percent: terms.annual_rate_percent(),
                        monthly_payment: level,
                    },
                    ..partial
                };
                prop_assert_eq!(solve(inverse).unwrap().term_months(), terms.term_months());
            }
            Err(error) => {
                prop_assert!(
                    matches!(
                        error,
                        SolverError::InvalidInput { field: LoanField::TermMonths | LoanField::Principal, .. }
                    ),
                    "unexpected error {:?}",
                    error
                );
            }
        }
    }

    #[test]
    fn payment_dates_increase(partial in principal_rate_term_strategy()) {
        let schedule = build(&solve(partial).unwrap());
        prop_assert!(schedule.items().windows(2).all(|w| w[0].payment_date < w[1].payment_date));
    }

    #[test]
    fn applying_twice_equals_applying_once(
        partial in principal_rate_term_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let schedule = build(&solve(partial).unwrap());
        let id = pick.get(schedule.items()).id;

        let once = apply_payment(schedule, &id, None, DateFixtures::today()).unwrap();
        let twice = apply_payment(once.clone(), &id, None, DateFixtures::today()).unwrap();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reverse_undoes_apply(
        partial in principal_rate_term_strategy(),
        pick in any::<prop::sample::Index>(),
        minor in positive_amount_minor_strategy(),
    ) {
        let original = build(&solve(partial).unwrap());
        let id = pick.get(original.items()).id;
        let amount = core_kernel::Money::from_minor(minor, original.currency());

        let paid = apply_payment(original.clone(), &id, Some(amount), DateFixtures::today()).unwrap();
        let restored = reverse_payment(paid, &id).unwrap();

        prop_assert_eq!(restored, original);
    }

    #[test]
    fn migration_never_drops_records(
        records in prop::collection::vec(
            (
                prop::option::of(principal_strategy()),
                prop::option::of(annual_rate_strategy()),
                prop::option::of(term_strategy()),
            ),
            0..20,
        )
    ) {
        let legacy: Vec<LegacyCredit> = records
            .into_iter()
            .map(|(principal, annual_rate_percent, term_months)| LegacyCredit {
                principal,
                annual_rate_percent,
                term_months,
                start_date: Some(DateFixtures::loan_start()),
                ..LegacyCredit::default()
            })
            .collect();
        let count = legacy.len();

        let report = migrate_all(legacy, DateFixtures::today(), &SolverLimits::default());

        prop_assert_eq!(report.succeeded.len() + report.failed.len(), count);
    }
}
