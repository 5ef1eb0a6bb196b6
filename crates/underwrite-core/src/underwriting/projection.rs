use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::error::UnderwriteError;
use crate::time_value::overflow;
use crate::types::{round_money, Money, Rate};
use crate::underwriting::model::UnderwritingResult;
use crate::UnderwriteResult;

pub const DEFAULT_PROJECTION_PERIODS: u32 = 10;
pub const MAX_PROJECTION_PERIODS: u32 = 100;

/// One projected year. Values are unrounded; see [`ProjectionTable::rounded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPeriod {
    pub period: u32,
    pub rent: Money,
    pub expenses: Money,
    pub noi: Money,
    pub debt_service: Money,
    pub cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub rent_growth: Rate,
    pub expense_growth: Rate,
    pub periods: Vec<ProjectionPeriod>,
}

impl ProjectionTable {
    /// Copy of the table with every monetary column rounded to whole units.
    pub fn rounded(&self) -> ProjectionTable {
        ProjectionTable {
            rent_growth: self.rent_growth,
            expense_growth: self.expense_growth,
            periods: self
                .periods
                .iter()
                .map(|p| ProjectionPeriod {
                    period: p.period,
                    rent: round_money(p.rent),
                    expenses: round_money(p.expenses),
                    noi: round_money(p.noi),
                    debt_service: round_money(p.debt_service),
                    cash_flow: round_money(p.cash_flow),
                    cumulative_cash_flow: round_money(p.cumulative_cash_flow),
                })
                .collect(),
        }
    }

    pub fn total_cash_flow(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.cumulative_cash_flow)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Grow rent and expenses from the underwritten base year over `periods` years.
///
/// Rent starts from annual gross rental income, expenses from total operating
/// expenses. Debt service is flat (fixed-rate loan, no refinancing).
pub fn project(
    result: &UnderwritingResult,
    rent_growth: Rate,
    expense_growth: Rate,
    periods: u32,
) -> UnderwriteResult<ProjectionTable> {
    if periods == 0 || periods > MAX_PROJECTION_PERIODS {
        return Err(UnderwriteError::invalid(
            "periods",
            format!("Projection needs between 1 and {MAX_PROJECTION_PERIODS} periods"),
        ));
    }
    if rent_growth <= dec!(-1) {
        return Err(UnderwriteError::invalid(
            "rent_growth",
            "Rent growth must be greater than -100%",
        ));
    }
    if expense_growth <= dec!(-1) {
        return Err(UnderwriteError::invalid(
            "expense_growth",
            "Expense growth must be greater than -100%",
        ));
    }

    let debt_service = result.annual_debt_service;
    let mut rent = result.gross_rental_income;
    let mut expenses = result.total_operating_expenses;
    let mut cumulative = Decimal::ZERO;
    let mut rows = Vec::with_capacity(periods as usize);

    let rent_step = Decimal::ONE + rent_growth;
    let expense_step = Decimal::ONE + expense_growth;

    for period in 1..=periods {
        if period > 1 {
            rent = rent
                .checked_mul(rent_step)
                .ok_or_else(|| overflow("projected rent"))?;
            expenses = expenses
                .checked_mul(expense_step)
                .ok_or_else(|| overflow("projected expenses"))?;
        }
        let noi = rent
            .checked_sub(expenses)
            .ok_or_else(|| overflow("projected NOI"))?;
        let cash_flow = noi
            .checked_sub(debt_service)
            .ok_or_else(|| overflow("projected cash flow"))?;
        cumulative = cumulative
            .checked_add(cash_flow)
            .ok_or_else(|| overflow("cumulative cash flow"))?;

        rows.push(ProjectionPeriod {
            period,
            rent,
            expenses,
            noi,
            debt_service,
            cash_flow,
            cumulative_cash_flow: cumulative,
        });
    }

    Ok(ProjectionTable {
        rent_growth,
        expense_growth,
        periods: rows,
    })
}

/// Ten-year projection using the growth rates carried by the assumption set.
pub fn project_default(
    result: &UnderwritingResult,
    assumptions: &AssumptionSet,
) -> UnderwriteResult<ProjectionTable> {
    project(
        result,
        assumptions.rent_growth,
        assumptions.expense_growth,
        DEFAULT_PROJECTION_PERIODS,
    )
}
