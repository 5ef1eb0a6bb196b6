use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use underwrite_core::asset::{AssetRecord, AssetRecordInput, PropertyType};
use underwrite_core::assumptions::{AssumptionSet, ExpenseFractions};
use underwrite_core::underwriting::charts::build_chart_series;
use underwrite_core::underwriting::model::{self, DebtCoverage, OperatingExpenses};
use underwrite_core::underwriting::projection;
use underwrite_core::UnderwriteError;

fn listing(price: Decimal) -> AssetRecord {
    AssetRecord::new(AssetRecordInput {
        id: "lst-001".into(),
        price,
        address: "1200 Harbor Blvd".into(),
        city: "Long Beach".into(),
        state: "CA".into(),
        zip_code: "90802".into(),
        units: 8,
        cap_rate: dec!(0.057),
        property_type: PropertyType::Apartment,
        year_built: Some(1978),
        square_footage: Some(7200),
        lot_size: Some("0.4 acres".into()),
        description: None,
        amenities: vec!["Laundry".into()],
    })
    .unwrap()
}

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected {expected} ± {tol}, got {actual}"
    );
}

// ===========================================================================
// Financial model
// ===========================================================================

#[test]
fn test_reference_scenario_at_450k() {
    let r = model::compute(&listing(dec!(450000)), &AssumptionSet::default()).unwrap();

    assert_eq!(r.down_payment, dec!(112500));
    assert_eq!(r.loan_amount, dec!(337500));
    assert_eq!(r.monthly_rent, dec!(4500));
    assert_eq!(r.gross_rental_income, dec!(54000));
    assert_eq!(r.effective_gross_income, dec!(51300));
    assert_eq!(
        r.operating_expenses.amounts(),
        [dec!(4104), dec!(6156), dec!(3078), dec!(7695), dec!(2565), dec!(2052)]
    );
    assert_eq!(r.total_operating_expenses, dec!(25650));
    assert_eq!(r.net_operating_income, dec!(25650));
    assert_close(r.cap_rate_pct, dec!(5.70), dec!(0.005), "cap rate");
    assert_close(r.monthly_debt_service, dec!(2133.8), dec!(1), "monthly debt service");

    let dscr = r.debt_service_coverage.ratio().expect("leveraged deal has a ratio");
    assert_close(dscr, dec!(1.002), dec!(0.001), "dscr");
}

#[test]
fn test_identities_hold_across_prices() {
    for price in [dec!(95000), dec!(450000), dec!(1234567.89), dec!(25000000)] {
        let r = model::compute(&listing(price), &AssumptionSet::default()).unwrap();
        assert_eq!(
            r.net_operating_income,
            r.effective_gross_income - r.operating_expenses.total()
        );
        assert_eq!(r.monthly_debt_service * dec!(12), r.annual_debt_service);
        assert_eq!(r.annual_cash_flow, r.net_operating_income - r.annual_debt_service);
    }
}

#[test]
fn test_zero_interest_is_straight_line() {
    let assumptions = AssumptionSet {
        interest_rate: Decimal::ZERO,
        ..Default::default()
    };
    let r = model::compute(&listing(dec!(450000)), &assumptions).unwrap();
    assert_eq!(r.monthly_debt_service, dec!(337500) / dec!(360));
}

#[test]
fn test_all_cash_purchase_has_unbounded_coverage() {
    let assumptions = AssumptionSet {
        down_payment_pct: Decimal::ONE,
        ..Default::default()
    };
    let r = model::compute(&listing(dec!(450000)), &assumptions).unwrap();
    assert_eq!(r.loan_amount, Decimal::ZERO);
    assert_eq!(r.debt_service_coverage, DebtCoverage::Unbounded);
    assert_eq!(r.annual_cash_flow, r.net_operating_income);
}

#[test]
fn test_zero_down_payment_is_division_by_zero() {
    let assumptions = AssumptionSet {
        down_payment_pct: Decimal::ZERO,
        ..Default::default()
    };
    match model::compute(&listing(dec!(450000)), &assumptions).unwrap_err() {
        UnderwriteError::DivisionByZero { context } => {
            assert!(context.contains("down payment"), "context was {context}")
        }
        other => panic!("Expected DivisionByZero, got {other:?}"),
    }
}

#[test]
fn test_overlong_loan_term_is_rejected_before_computing() {
    let assumptions = AssumptionSet {
        loan_term_years: 3000,
        ..Default::default()
    };
    match model::compute(&listing(dec!(450000)), &assumptions).unwrap_err() {
        UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "loan_term_years"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_extreme_but_valid_inputs_do_not_overflow() {
    let assumptions = AssumptionSet {
        interest_rate: Decimal::ONE,
        loan_term_years: 50,
        rent_to_price_ratio: Decimal::ONE,
        ..Default::default()
    };
    let r = model::compute(&listing(underwrite_core::asset::MAX_PRICE), &assumptions).unwrap();
    assert_eq!(r.monthly_debt_service * dec!(12), r.annual_debt_service);
    let table = projection::project(&r, dec!(0.03), dec!(0.02), 100).unwrap();
    assert_eq!(table.len(), 100);
}

#[test]
fn test_envelope_warns_on_thin_coverage() {
    let out = model::underwrite(&listing(dec!(450000)), &AssumptionSet::default()).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("DSCR")));
    assert!(!out.methodology.is_empty());
}

// ===========================================================================
// Projection & charts
// ===========================================================================

#[test]
fn test_projection_cumulative_matches_running_sum() {
    let assumptions = AssumptionSet::default();
    let r = model::compute(&listing(dec!(450000)), &assumptions).unwrap();
    let table = projection::project_default(&r, &assumptions).unwrap();

    assert_eq!(table.len(), 10);
    let mut running = Decimal::ZERO;
    for (i, p) in table.periods.iter().enumerate() {
        running += p.cash_flow;
        assert_eq!(p.period as usize, i + 1);
        assert_eq!(p.cumulative_cash_flow, running);
        assert_eq!(p.debt_service, r.annual_debt_service);
    }
    assert_eq!(table.total_cash_flow(), running);
}

#[test]
fn test_projection_first_period_uses_gross_rent() {
    let assumptions = AssumptionSet::default();
    let r = model::compute(&listing(dec!(450000)), &assumptions).unwrap();
    let table = projection::project_default(&r, &assumptions).unwrap();
    let first = &table.periods[0];
    assert_eq!(first.rent, dec!(54000));
    assert_eq!(first.expenses, dec!(25650));
    assert_eq!(first.noi, dec!(28350));
}

#[test]
fn test_expense_series_keeps_zero_categories() {
    let assumptions = AssumptionSet {
        expense_fractions: ExpenseFractions {
            utilities: Decimal::ZERO,
            other: Decimal::ZERO,
            ..Default::default()
        },
        ..Default::default()
    };
    let r = model::compute(&listing(dec!(450000)), &assumptions).unwrap();
    let table = projection::project_default(&r, &assumptions).unwrap();
    let charts = build_chart_series(&r, &table);

    assert_eq!(charts.expenses.labels(), OperatingExpenses::LABELS.map(String::from));
    assert_eq!(charts.expenses.values()[4], Decimal::ZERO);
    assert_eq!(charts.expenses.values()[5], Decimal::ZERO);
    assert_eq!(charts.cash_flow.len(), 10);
    assert_eq!(charts.cash_flow.labels()[9], "Period 10");
}
