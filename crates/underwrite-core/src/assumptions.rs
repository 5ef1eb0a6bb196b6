use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::UnderwriteError;
use crate::types::Rate;
use crate::UnderwriteResult;

/// Expense fractions, each applied against effective gross income.
///
/// Field order is the canonical category order used by every report and chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseFractions {
    pub management: Rate,
    pub maintenance: Rate,
    pub insurance: Rate,
    pub taxes: Rate,
    pub utilities: Rate,
    pub other: Rate,
}

impl Default for ExpenseFractions {
    fn default() -> Self {
        Self {
            management: dec!(0.08),
            maintenance: dec!(0.12),
            insurance: dec!(0.06),
            taxes: dec!(0.15),
            utilities: dec!(0.05),
            other: dec!(0.04),
        }
    }
}

impl ExpenseFractions {
    /// (field name, fraction) pairs in canonical order.
    pub fn entries(&self) -> [(&'static str, Rate); 6] {
        [
            ("management", self.management),
            ("maintenance", self.maintenance),
            ("insurance", self.insurance),
            ("taxes", self.taxes),
            ("utilities", self.utilities),
            ("other", self.other),
        ]
    }

    pub fn total(&self) -> Rate {
        self.entries().iter().map(|(_, r)| *r).sum()
    }
}

/// Financing, income and growth assumptions behind an underwriting run.
///
/// `Default` carries the house assumptions; config files only need to name
/// the values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssumptionSet {
    /// Share of the price paid in cash (0.25 = 25%)
    pub down_payment_pct: Rate,
    /// Annual fixed interest rate on the loan
    pub interest_rate: Rate,
    pub loan_term_years: u32,
    /// Monthly rent as a fraction of price ("1% rule")
    pub rent_to_price_ratio: Rate,
    pub vacancy_rate: Rate,
    pub expense_fractions: ExpenseFractions,
    /// Annual rent growth used by the projection
    pub rent_growth: Rate,
    /// Annual expense growth used by the projection
    pub expense_growth: Rate,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            down_payment_pct: dec!(0.25),
            interest_rate: dec!(0.065),
            loan_term_years: 30,
            rent_to_price_ratio: dec!(0.01),
            vacancy_rate: dec!(0.05),
            expense_fractions: ExpenseFractions::default(),
            rent_growth: dec!(0.03),
            expense_growth: dec!(0.02),
        }
    }
}

/// Longest amortisation term accepted.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

impl AssumptionSet {
    pub fn validate(&self) -> UnderwriteResult<()> {
        require_fraction("down_payment_pct", self.down_payment_pct)?;

        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE {
            return Err(UnderwriteError::invalid(
                "interest_rate",
                "Interest rate must be between 0 and 1",
            ));
        }
        if self.loan_term_years == 0 || self.loan_term_years > MAX_LOAN_TERM_YEARS {
            return Err(UnderwriteError::invalid(
                "loan_term_years",
                format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
            ));
        }
        if self.rent_to_price_ratio <= Decimal::ZERO || self.rent_to_price_ratio > Decimal::ONE {
            return Err(UnderwriteError::invalid(
                "rent_to_price_ratio",
                "Rent-to-price ratio must be positive and at most 1",
            ));
        }
        if self.vacancy_rate < Decimal::ZERO || self.vacancy_rate >= Decimal::ONE {
            return Err(UnderwriteError::invalid(
                "vacancy_rate",
                "Vacancy rate must be between 0 and 1 (exclusive upper)",
            ));
        }
        for (name, fraction) in self.expense_fractions.entries() {
            require_fraction(name, fraction)?;
        }
        if self.rent_growth <= dec!(-1) {
            return Err(UnderwriteError::invalid(
                "rent_growth",
                "Rent growth must be greater than -100%",
            ));
        }
        if self.expense_growth <= dec!(-1) {
            return Err(UnderwriteError::invalid(
                "expense_growth",
                "Expense growth must be greater than -100%",
            ));
        }
        Ok(())
    }
}

fn require_fraction(field: &str, value: Rate) -> UnderwriteResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(UnderwriteError::invalid(
            field,
            format!("{value} must be between 0 and 1"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_house_assumptions() {
        let a = AssumptionSet::default();
        assert_eq!(a.down_payment_pct, dec!(0.25));
        assert_eq!(a.interest_rate, dec!(0.065));
        assert_eq!(a.loan_term_years, 30);
        assert_eq!(a.rent_to_price_ratio, dec!(0.01));
        assert_eq!(a.vacancy_rate, dec!(0.05));
        assert_eq!(a.expense_fractions.total(), dec!(0.50));
        assert_eq!(a.rent_growth, dec!(0.03));
        assert_eq!(a.expense_growth, dec!(0.02));
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let a: AssumptionSet =
            serde_json::from_str(r#"{"interest_rate": "0.07", "expense_fractions": {"taxes": "0.10"}}"#)
                .unwrap();
        assert_eq!(a.interest_rate, dec!(0.07));
        assert_eq!(a.loan_term_years, 30);
        assert_eq!(a.expense_fractions.taxes, dec!(0.10));
        assert_eq!(a.expense_fractions.management, dec!(0.08));
    }

    #[test]
    fn test_full_vacancy_rejected() {
        let a = AssumptionSet {
            vacancy_rate: Decimal::ONE,
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_zero_term_rejected() {
        let a = AssumptionSet {
            loan_term_years: 0,
            ..Default::default()
        };
        match a.validate().unwrap_err() {
            UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "loan_term_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_term_above_maximum_rejected() {
        let at_cap = AssumptionSet {
            loan_term_years: MAX_LOAN_TERM_YEARS,
            ..Default::default()
        };
        assert!(at_cap.validate().is_ok());

        let a = AssumptionSet {
            loan_term_years: 3000,
            ..Default::default()
        };
        match a.validate().unwrap_err() {
            UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "loan_term_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_interest_rate_above_one_rejected() {
        let a = AssumptionSet {
            interest_rate: dec!(1.5),
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_negative_expense_fraction_rejected() {
        let mut a = AssumptionSet::default();
        a.expense_fractions.utilities = dec!(-0.01);
        assert!(a.validate().is_err());
    }
}
