use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::UnderwriteError;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Compounding factor (1 + rate)^periods via iterative multiplication.
///
/// Iterating keeps the factor exact to Decimal precision, where `powd`
/// would route through a logarithm approximation.
pub fn growth_factor(rate: Rate, periods: u32) -> UnderwriteResult<Money> {
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow("growth factor"))?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(one_plus_r)
            .ok_or_else(|| overflow("growth factor"))?;
    }
    Ok(factor)
}

/// Standard fixed-rate amortising payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// Evaluated as `P * r / (1 - (1+r)^-n)` so intermediates stay near the
/// payment's own magnitude. A zero periodic rate falls back to straight-line
/// repayment `P / n`.
pub fn amortized_payment(
    principal: Money,
    periodic_rate: Rate,
    periods: u32,
) -> UnderwriteResult<Money> {
    if periods == 0 {
        return Err(UnderwriteError::DivisionByZero {
            context: "amortised payment over zero periods".into(),
        });
    }
    if periodic_rate < Decimal::ZERO {
        return Err(UnderwriteError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic interest rate cannot be negative".into(),
        });
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let compound = growth_factor(periodic_rate, periods)?;
    let denominator = Decimal::ONE - Decimal::ONE / compound;
    if denominator.is_zero() {
        return Err(UnderwriteError::DivisionByZero {
            context: "amortised payment denominator".into(),
        });
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| overflow("amortised payment"))
}

/// Decimal range exceeded; inputs are valid but the result is not representable.
pub(crate) fn overflow(context: &str) -> UnderwriteError {
    UnderwriteError::FinancialImpossibility(format!("{context} exceeds the representable range"))
}

/// Monthly payment on a loan quoted at an annual rate over a term in years.
pub fn monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
) -> UnderwriteResult<Money> {
    let monthly_rate = annual_rate / dec!(12);
    let months = term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| UnderwriteError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Loan term is too long".into(),
        })?;
    amortized_payment(principal, monthly_rate, months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_factor_zero_periods_is_one() {
        assert_eq!(growth_factor(dec!(0.03), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_growth_factor_compounds() {
        assert_eq!(growth_factor(dec!(0.10), 2).unwrap(), dec!(1.21));
    }

    #[test]
    fn test_monthly_payment_30y_650() {
        // 6.5% / 30y: ~6.3207 per 1,000 borrowed
        let pmt = monthly_payment(dec!(337500), dec!(0.065), 30).unwrap();
        assert!((pmt - dec!(2133.23)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let pmt = monthly_payment(dec!(360000), Decimal::ZERO, 30).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_zero_periods_error() {
        assert!(amortized_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_growth_factor_overflow_is_an_error() {
        match growth_factor(dec!(0.5), 10_000).unwrap_err() {
            UnderwriteError::FinancialImpossibility(msg) => assert!(msg.contains("growth factor")),
            other => panic!("Expected FinancialImpossibility, got {other:?}"),
        }
    }

    #[test]
    fn test_amortised_payment_overflow_is_an_error() {
        let err = amortized_payment(dec!(1000000), dec!(0.5), 10_000).unwrap_err();
        assert!(matches!(err, UnderwriteError::FinancialImpossibility(_)));
    }
}
