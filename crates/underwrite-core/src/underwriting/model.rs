use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::asset::AssetRecord;
use crate::assumptions::AssumptionSet;
use crate::error::UnderwriteError;
use crate::time_value;
use crate::types::{to_pct, with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::UnderwriteResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Annual operating expense amounts, in canonical category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingExpenses {
    pub management: Money,
    pub maintenance: Money,
    pub insurance: Money,
    pub taxes: Money,
    pub utilities: Money,
    pub other: Money,
}

impl OperatingExpenses {
    /// Display labels, in the same order as [`OperatingExpenses::amounts`].
    pub const LABELS: [&'static str; 6] = [
        "Management",
        "Maintenance",
        "Insurance",
        "Taxes",
        "Utilities",
        "Other",
    ];

    pub fn amounts(&self) -> [Money; 6] {
        [
            self.management,
            self.maintenance,
            self.insurance,
            self.taxes,
            self.utilities,
            self.other,
        ]
    }

    pub fn total(&self) -> Money {
        self.amounts().iter().sum()
    }
}

/// Debt service coverage. `Unbounded` when there is no debt service to cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DebtCoverage {
    Ratio(Multiple),
    Unbounded,
}

impl DebtCoverage {
    pub fn ratio(&self) -> Option<Multiple> {
        match self {
            DebtCoverage::Ratio(r) => Some(*r),
            DebtCoverage::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, DebtCoverage::Unbounded)
    }
}

impl fmt::Display for DebtCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtCoverage::Ratio(r) => write!(f, "{:.2}", r),
            DebtCoverage::Unbounded => f.write_str("Unbounded (no debt service)"),
        }
    }
}

/// Complete year-one underwriting of an asset under a set of assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingResult {
    pub purchase_price: Money,
    pub down_payment: Money,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub loan_term_years: u32,
    pub monthly_rent: Money,
    /// Annual gross rental income (monthly rent x 12)
    pub gross_rental_income: Money,
    pub vacancy_rate: Rate,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: OperatingExpenses,
    pub total_operating_expenses: Money,
    pub net_operating_income: Money,
    /// NOI / price x 100
    pub cap_rate_pct: Decimal,
    /// Annual cash flow / down payment x 100
    pub cash_on_cash_pct: Decimal,
    pub debt_service_coverage: DebtCoverage,
    pub monthly_debt_service: Money,
    pub annual_debt_service: Money,
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Underwrite an asset and wrap the result in the standard computation envelope.
///
/// Warnings flag thin coverage, negative cash flow, and a listed cap rate that
/// disagrees with the computed one. The computed figure is authoritative.
pub fn underwrite(
    asset: &AssetRecord,
    assumptions: &AssumptionSet,
) -> UnderwriteResult<ComputationOutput<UnderwritingResult>> {
    let start = Instant::now();
    let result = compute(asset, assumptions)?;
    let warnings = collect_warnings(asset, &result);

    for warning in &warnings {
        tracing::warn!(asset_id = asset.id(), "{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Real Estate Underwriting (Income Approach, Fixed-Rate Amortising Debt)",
        assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Derive income, expenses, debt service and returns for one asset.
pub fn compute(
    asset: &AssetRecord,
    assumptions: &AssumptionSet,
) -> UnderwriteResult<UnderwritingResult> {
    assumptions.validate()?;

    let price = asset.price();
    if price <= Decimal::ZERO {
        return Err(UnderwriteError::invalid("price", "Purchase price must be positive"));
    }
    if asset.units() == 0 {
        return Err(UnderwriteError::invalid("units", "Unit count must be at least 1"));
    }

    // --- Financing ---
    let down_payment = price * assumptions.down_payment_pct;
    let loan_amount = price - down_payment;
    if loan_amount < Decimal::ZERO {
        return Err(UnderwriteError::FinancialImpossibility(
            "Down payment exceeds purchase price".into(),
        ));
    }

    // --- Income ---
    let monthly_rent = price * assumptions.rent_to_price_ratio;
    let gross_rental_income = monthly_rent * dec!(12);
    let effective_gross_income = gross_rental_income * (Decimal::ONE - assumptions.vacancy_rate);
    let vacancy_loss = gross_rental_income - effective_gross_income;

    // --- Expenses (each against EGI) ---
    let f = &assumptions.expense_fractions;
    let operating_expenses = OperatingExpenses {
        management: effective_gross_income * f.management,
        maintenance: effective_gross_income * f.maintenance,
        insurance: effective_gross_income * f.insurance,
        taxes: effective_gross_income * f.taxes,
        utilities: effective_gross_income * f.utilities,
        other: effective_gross_income * f.other,
    };
    let total_operating_expenses = operating_expenses.total();
    let net_operating_income = effective_gross_income - total_operating_expenses;

    // --- Debt service ---
    let monthly_debt_service = time_value::monthly_payment(
        loan_amount,
        assumptions.interest_rate,
        assumptions.loan_term_years,
    )?;
    let annual_debt_service = monthly_debt_service * dec!(12);

    // --- Cash flow & returns ---
    let annual_cash_flow = net_operating_income - annual_debt_service;
    let monthly_cash_flow = annual_cash_flow / dec!(12);

    let cap_rate_pct = to_pct(net_operating_income / price);

    if down_payment.is_zero() {
        return Err(UnderwriteError::DivisionByZero {
            context: "cash-on-cash return (down payment is zero)".into(),
        });
    }
    let cash_on_cash_pct = to_pct(annual_cash_flow / down_payment);

    let debt_service_coverage = if annual_debt_service.is_zero() {
        DebtCoverage::Unbounded
    } else {
        DebtCoverage::Ratio(net_operating_income / annual_debt_service)
    };

    debug!(
        asset_id = asset.id(),
        noi = %net_operating_income,
        annual_debt_service = %annual_debt_service,
        "underwriting computed"
    );

    Ok(UnderwritingResult {
        purchase_price: price,
        down_payment,
        loan_amount,
        interest_rate: assumptions.interest_rate,
        loan_term_years: assumptions.loan_term_years,
        monthly_rent,
        gross_rental_income,
        vacancy_rate: assumptions.vacancy_rate,
        vacancy_loss,
        effective_gross_income,
        operating_expenses,
        total_operating_expenses,
        net_operating_income,
        cap_rate_pct,
        cash_on_cash_pct,
        debt_service_coverage,
        monthly_debt_service,
        annual_debt_service,
        monthly_cash_flow,
        annual_cash_flow,
    })
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

fn collect_warnings(asset: &AssetRecord, result: &UnderwritingResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if let DebtCoverage::Ratio(dscr) = result.debt_service_coverage {
        if dscr < dec!(1.2) {
            warnings.push(format!(
                "DSCR of {dscr:.2} is below 1.20x — lender covenant risk"
            ));
        }
    }

    if result.annual_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Annual cash flow of {:.0} is negative — income does not cover debt service",
            result.annual_cash_flow
        ));
    }

    let listed_pct = to_pct(asset.cap_rate());
    if !asset.cap_rate().is_zero() && (listed_pct - result.cap_rate_pct).abs() > Decimal::ONE {
        warnings.push(format!(
            "Listed cap rate {listed_pct:.2}% differs from computed {:.2}%; computed value is used",
            result.cap_rate_pct
        ));
    }

    warnings
}
