use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UnderwriteError;
use crate::types::{round_cents, round_money};
use crate::underwriting::model::{OperatingExpenses, UnderwritingResult};
use crate::underwriting::projection::ProjectionTable;
use crate::UnderwriteResult;

/// Positionally aligned labels and values for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChartSeries")]
pub struct ChartSeries {
    labels: Vec<String>,
    values: Vec<Decimal>,
}

#[derive(Deserialize)]
struct RawChartSeries {
    labels: Vec<String>,
    values: Vec<Decimal>,
}

impl TryFrom<RawChartSeries> for ChartSeries {
    type Error = UnderwriteError;

    fn try_from(raw: RawChartSeries) -> Result<Self, Self::Error> {
        ChartSeries::new(raw.labels, raw.values)
    }
}

impl ChartSeries {
    pub fn new(labels: Vec<String>, values: Vec<Decimal>) -> UnderwriteResult<Self> {
        if labels.len() != values.len() {
            return Err(UnderwriteError::invalid(
                "values",
                format!(
                    "{} labels but {} values; series must be aligned",
                    labels.len(),
                    values.len()
                ),
            ));
        }
        Ok(ChartSeries { labels, values })
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        let (labels, values) = pairs.into_iter().unzip();
        ChartSeries { labels, values }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Both charts shown alongside an underwriting preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesSet {
    pub cash_flow: ChartSeries,
    pub expenses: ChartSeries,
}

/// "Period 1".."Period N" against rounded period cash flows.
pub fn build_cash_flow_series(table: &ProjectionTable) -> ChartSeries {
    ChartSeries::from_pairs(
        table
            .periods
            .iter()
            .map(|p| (format!("Period {}", p.period), round_money(p.cash_flow))),
    )
}

/// The six expense categories in canonical order, amounts rounded to cents.
pub fn build_expense_series(result: &UnderwritingResult) -> ChartSeries {
    ChartSeries::from_pairs(
        OperatingExpenses::LABELS
            .iter()
            .zip(result.operating_expenses.amounts())
            .map(|(label, amount)| (label.to_string(), round_cents(amount))),
    )
}

pub fn build_chart_series(result: &UnderwritingResult, table: &ProjectionTable) -> ChartSeriesSet {
    ChartSeriesSet {
        cash_flow: build_cash_flow_series(table),
        expenses: build_expense_series(result),
    }
}
