use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use serde::Serialize;

use crate::asset::AssetRecord;
use crate::render::{render_error, to_f64};
use crate::types::{round_money, to_pct, Money};
use crate::underwriting::model::{DebtCoverage, UnderwritingResult};
use crate::underwriting::projection::ProjectionTable;
use crate::UnderwriteResult;

pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";
pub const CASH_FLOW_ANALYSIS: &str = "Cash Flow Analysis";
pub const TEN_YEAR_PROJECTION: &str = "10-Year Projection";
pub const RATIOS_AND_METRICS: &str = "Ratios & Metrics";

/// Sheet order of every underwriting workbook.
pub const SHEET_NAMES: [&str; 4] = [
    EXECUTIVE_SUMMARY,
    CASH_FLOW_ANALYSIS,
    TEN_YEAR_PROJECTION,
    RATIOS_AND_METRICS,
];

pub const PROJECTION_HEADERS: [&str; 7] = [
    "Year",
    "Rental Income",
    "Operating Expenses",
    "NOI",
    "Debt Service",
    "Cash Flow",
    "Cumulative CF",
];

const CURRENCY_FORMAT: &str = "\"$\"#,##0";
const PERCENT_FORMAT: &str = "0.00\"%\"";
const MULTIPLE_FORMAT: &str = "0.00";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Emphasis {
    Normal,
    Strong,
    /// Non-negative cash flow
    Positive,
    /// Negative cash flow
    Negative,
}

impl Emphasis {
    pub fn for_cash_flow(amount: Money) -> Self {
        if amount >= Decimal::ZERO {
            Emphasis::Positive
        } else {
            Emphasis::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    /// Rounded to whole units when written
    Currency(Money),
    /// A percentage figure (5.70 means 5.70%)
    Percent(Decimal),
    Multiple(Decimal),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SheetRow {
    Title(String),
    Heading(String),
    Field {
        label: String,
        value: CellValue,
        emphasis: Emphasis,
    },
    Header(Vec<String>),
    Record(Vec<CellValue>),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

impl SheetLayout {
    fn new(name: &str, title: &str) -> Self {
        SheetLayout {
            name: name.into(),
            rows: vec![SheetRow::Title(title.into()), SheetRow::Blank],
        }
    }

    fn heading(&mut self, text: &str) {
        self.rows.push(SheetRow::Heading(text.into()));
    }

    fn field(&mut self, label: &str, value: CellValue) {
        self.emphasised(label, value, Emphasis::Normal);
    }

    fn emphasised(&mut self, label: &str, value: CellValue, emphasis: Emphasis) {
        self.rows.push(SheetRow::Field {
            label: label.into(),
            value,
            emphasis,
        });
    }

    fn blank(&mut self) {
        self.rows.push(SheetRow::Blank);
    }

    /// Labels of every `Field` row, in order.
    pub fn field_labels(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| match r {
                SheetRow::Field { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn find_field(&self, label: &str) -> Option<(&CellValue, Emphasis)> {
        self.rows.iter().find_map(|r| match r {
            SheetRow::Field {
                label: l,
                value,
                emphasis,
            } if l == label => Some((value, *emphasis)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookLayout {
    pub sheets: Vec<SheetLayout>,
}

impl WorkbookLayout {
    pub fn sheet(&self, name: &str) -> Option<&SheetLayout> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Assemble the four underwriting sheets.
pub fn layout(
    asset: &AssetRecord,
    result: &UnderwritingResult,
    table: &ProjectionTable,
) -> WorkbookLayout {
    WorkbookLayout {
        sheets: vec![
            executive_summary(asset, result),
            cash_flow_analysis(result),
            projection_sheet(table),
            ratios_and_metrics(asset, result),
        ],
    }
}

fn coverage_cell(coverage: DebtCoverage) -> CellValue {
    match coverage {
        DebtCoverage::Ratio(r) => CellValue::Multiple(r),
        DebtCoverage::Unbounded => CellValue::Text(coverage.to_string()),
    }
}

fn optional_count(value: Option<u32>) -> CellValue {
    value
        .map(|v| CellValue::Integer(i64::from(v)))
        .unwrap_or_else(|| CellValue::Text("N/A".into()))
}

fn executive_summary(asset: &AssetRecord, r: &UnderwritingResult) -> SheetLayout {
    let mut sheet = SheetLayout::new(
        EXECUTIVE_SUMMARY,
        "INVESTMENT PROPERTY UNDERWRITING ANALYSIS",
    );

    sheet.heading("Property Information");
    sheet.field("Address:", CellValue::Text(asset.address().into()));
    sheet.field("City:", CellValue::Text(asset.city().into()));
    sheet.field("State:", CellValue::Text(asset.state().into()));
    sheet.field("ZIP Code:", CellValue::Text(asset.zip_code().into()));
    sheet.field("Units:", CellValue::Integer(i64::from(asset.units())));
    sheet.field(
        "Property Type:",
        CellValue::Text(asset.property_type().to_string()),
    );
    sheet.field("Year Built:", optional_count(asset.year_built()));
    sheet.field("Square Footage:", optional_count(asset.square_footage()));
    sheet.blank();

    sheet.heading("Purchase Information");
    sheet.field("Purchase Price:", CellValue::Currency(r.purchase_price));
    sheet.field("Down Payment:", CellValue::Currency(r.down_payment));
    sheet.field("Loan Amount:", CellValue::Currency(r.loan_amount));
    sheet.field("Interest Rate:", CellValue::Percent(to_pct(r.interest_rate)));
    sheet.field(
        "Loan Term:",
        CellValue::Text(format!("{} years", r.loan_term_years)),
    );
    sheet.blank();

    sheet.heading("Key Metrics");
    sheet.emphasised("Cap Rate:", CellValue::Percent(r.cap_rate_pct), Emphasis::Strong);
    sheet.emphasised(
        "Cash-on-Cash Return:",
        CellValue::Percent(r.cash_on_cash_pct),
        Emphasis::Strong,
    );
    sheet.emphasised(
        "Debt Service Coverage:",
        coverage_cell(r.debt_service_coverage),
        Emphasis::Strong,
    );
    sheet.emphasised(
        "Monthly Cash Flow:",
        CellValue::Currency(r.monthly_cash_flow),
        Emphasis::Strong,
    );
    sheet.emphasised(
        "Annual Cash Flow:",
        CellValue::Currency(r.annual_cash_flow),
        Emphasis::Strong,
    );

    sheet
}

fn cash_flow_analysis(r: &UnderwritingResult) -> SheetLayout {
    let mut sheet = SheetLayout::new(CASH_FLOW_ANALYSIS, "CASH FLOW ANALYSIS");

    sheet.heading("Income");
    sheet.field(
        "Gross Rental Income (Monthly):",
        CellValue::Currency(r.monthly_rent),
    );
    sheet.field(
        "Gross Rental Income (Annual):",
        CellValue::Currency(r.gross_rental_income),
    );
    sheet.field(
        &format!("Less: Vacancy ({:.1}%):", to_pct(r.vacancy_rate)),
        CellValue::Currency(-r.vacancy_loss),
    );
    sheet.field(
        "Effective Rental Income:",
        CellValue::Currency(r.effective_gross_income),
    );
    sheet.blank();

    let e = &r.operating_expenses;
    sheet.heading("Operating Expenses");
    sheet.field("Management:", CellValue::Currency(e.management));
    sheet.field("Maintenance & Repairs:", CellValue::Currency(e.maintenance));
    sheet.field("Insurance:", CellValue::Currency(e.insurance));
    sheet.field("Property Taxes:", CellValue::Currency(e.taxes));
    sheet.field("Utilities:", CellValue::Currency(e.utilities));
    sheet.field("Other Expenses:", CellValue::Currency(e.other));
    sheet.emphasised(
        "Total Operating Expenses:",
        CellValue::Currency(r.total_operating_expenses),
        Emphasis::Strong,
    );
    sheet.blank();

    sheet.emphasised(
        "Net Operating Income (NOI):",
        CellValue::Currency(r.net_operating_income),
        Emphasis::Strong,
    );
    sheet.blank();

    sheet.heading("Debt Service");
    sheet.field(
        "Monthly Debt Service:",
        CellValue::Currency(r.monthly_debt_service),
    );
    sheet.field(
        "Annual Debt Service:",
        CellValue::Currency(r.annual_debt_service),
    );
    sheet.blank();

    sheet.heading("Cash Flow");
    sheet.emphasised(
        "Before-Tax Cash Flow (Annual):",
        CellValue::Currency(r.annual_cash_flow),
        Emphasis::for_cash_flow(r.annual_cash_flow),
    );
    sheet.emphasised(
        "Before-Tax Cash Flow (Monthly):",
        CellValue::Currency(r.monthly_cash_flow),
        Emphasis::for_cash_flow(r.monthly_cash_flow),
    );

    sheet
}

fn projection_sheet(table: &ProjectionTable) -> SheetLayout {
    let mut sheet = SheetLayout::new(TEN_YEAR_PROJECTION, "10-YEAR CASH FLOW PROJECTION");
    sheet
        .rows
        .push(SheetRow::Header(PROJECTION_HEADERS.iter().map(|h| h.to_string()).collect()));

    for p in &table.periods {
        sheet.rows.push(SheetRow::Record(vec![
            CellValue::Integer(i64::from(p.period)),
            CellValue::Currency(p.rent),
            CellValue::Currency(p.expenses),
            CellValue::Currency(p.noi),
            CellValue::Currency(p.debt_service),
            CellValue::Currency(p.cash_flow),
            CellValue::Currency(p.cumulative_cash_flow),
        ]));
    }

    sheet
}

/// `numerator / denominator`, or text when the denominator is zero.
fn ratio_or_na(numerator: Decimal, denominator: Decimal, scale: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator * scale)
    }
}

fn ratios_and_metrics(asset: &AssetRecord, r: &UnderwritingResult) -> SheetLayout {
    let mut sheet = SheetLayout::new(RATIOS_AND_METRICS, "INVESTMENT RATIOS & METRICS");
    let na = || CellValue::Text("N/A".into());
    let annual_rent = r.gross_rental_income;

    sheet.heading("Profitability Ratios");
    sheet.field("Cap Rate:", CellValue::Percent(r.cap_rate_pct));
    sheet.field("Cash-on-Cash Return:", CellValue::Percent(r.cash_on_cash_pct));
    sheet.field(
        "Gross Rent Multiplier:",
        ratio_or_na(r.purchase_price, annual_rent, Decimal::ONE)
            .map(CellValue::Multiple)
            .unwrap_or_else(na),
    );
    sheet.blank();

    sheet.heading("Risk Ratios");
    sheet.field(
        "Debt Service Coverage Ratio:",
        coverage_cell(r.debt_service_coverage),
    );
    sheet.field(
        "Loan-to-Value Ratio:",
        ratio_or_na(r.loan_amount, r.purchase_price, dec!(100))
            .map(CellValue::Percent)
            .unwrap_or_else(na),
    );
    sheet.blank();

    sheet.heading("Efficiency Ratios");
    sheet.field(
        "Operating Expense Ratio:",
        ratio_or_na(r.total_operating_expenses, annual_rent, dec!(100))
            .map(CellValue::Percent)
            .unwrap_or_else(na),
    );
    sheet.field(
        "NOI Margin:",
        ratio_or_na(r.net_operating_income, annual_rent, dec!(100))
            .map(CellValue::Percent)
            .unwrap_or_else(na),
    );
    sheet.blank();

    let units = Decimal::from(asset.units());
    sheet.heading("Per Unit Analysis");
    sheet.field("Price per Unit:", CellValue::Currency(r.purchase_price / units));
    sheet.field(
        "NOI per Unit:",
        CellValue::Currency(r.net_operating_income / units),
    );
    sheet.field(
        "Cash Flow per Unit:",
        CellValue::Currency(r.annual_cash_flow / units),
    );

    sheet
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Render the underwriting workbook (xlsx bytes).
pub fn render(
    asset: &AssetRecord,
    result: &UnderwritingResult,
    table: &ProjectionTable,
) -> UnderwriteResult<Vec<u8>> {
    write_workbook(&layout(asset, result, table))
}

struct Formats {
    title: Format,
    heading: Format,
    header: Format,
    strong: Format,
    currency: Format,
    percent: Format,
    multiple: Format,
}

impl Formats {
    fn new() -> Self {
        Formats {
            title: Format::new().set_bold().set_font_size(16),
            heading: Format::new().set_bold().set_font_size(12),
            header: Format::new().set_bold().set_align(FormatAlign::Center),
            strong: Format::new().set_bold(),
            currency: Format::new().set_num_format(CURRENCY_FORMAT),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
            multiple: Format::new().set_num_format(MULTIPLE_FORMAT),
        }
    }

    /// Base number format for a value, with emphasis layered on top.
    fn for_value(&self, value: &CellValue, emphasis: Emphasis) -> Format {
        let base = match value {
            CellValue::Currency(_) => self.currency.clone(),
            CellValue::Percent(_) => self.percent.clone(),
            CellValue::Multiple(_) => self.multiple.clone(),
            CellValue::Text(_) | CellValue::Integer(_) => Format::new(),
        };
        match emphasis {
            Emphasis::Normal => base,
            Emphasis::Strong => base.set_bold(),
            Emphasis::Positive => base.set_bold().set_font_color(Color::Green),
            Emphasis::Negative => base.set_bold().set_font_color(Color::Red),
        }
    }
}

/// Write a layout to xlsx. Fails as a whole; never returns a partial buffer.
pub fn write_workbook(layout: &WorkbookLayout) -> UnderwriteResult<Vec<u8>> {
    let err = |e| render_error("underwriting workbook", e);
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    for sheet in &layout.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str()).map_err(err)?;
        write_sheet(worksheet, sheet, &formats).map_err(err)?;
    }

    workbook.save_to_buffer().map_err(err)
}

fn write_sheet(
    ws: &mut Worksheet,
    sheet: &SheetLayout,
    formats: &Formats,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    ws.set_column_width(0, 34)?;
    for col in 1..PROJECTION_HEADERS.len() as u16 {
        ws.set_column_width(col, 18)?;
    }

    for (row, entry) in sheet.rows.iter().enumerate() {
        let row = row as u32;
        match entry {
            SheetRow::Title(text) => {
                ws.write_string_with_format(row, 0, text, &formats.title)?;
            }
            SheetRow::Heading(text) => {
                ws.write_string_with_format(row, 0, text, &formats.heading)?;
            }
            SheetRow::Field {
                label,
                value,
                emphasis,
            } => {
                let label_format = if *emphasis == Emphasis::Strong {
                    formats.strong.clone()
                } else {
                    Format::new()
                };
                ws.write_string_with_format(row, 0, label, &label_format)?;
                write_cell(ws, row, 1, value, &formats.for_value(value, *emphasis))?;
            }
            SheetRow::Header(columns) => {
                for (col, text) in columns.iter().enumerate() {
                    ws.write_string_with_format(row, col as u16, text, &formats.header)?;
                }
            }
            SheetRow::Record(cells) => {
                for (col, value) in cells.iter().enumerate() {
                    let format = formats.for_value(value, Emphasis::Normal);
                    write_cell(ws, row, col as u16, value, &format)?;
                }
            }
            SheetRow::Blank => {}
        }
    }
    Ok(())
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        CellValue::Text(text) => {
            ws.write_string_with_format(row, col, text, format)?;
        }
        CellValue::Currency(amount) => {
            ws.write_number_with_format(row, col, to_f64(round_money(*amount)), format)?;
        }
        CellValue::Percent(pct) => {
            ws.write_number_with_format(row, col, to_f64(pct.round_dp(2)), format)?;
        }
        CellValue::Multiple(m) => {
            ws.write_number_with_format(row, col, to_f64(m.round_dp(4)), format)?;
        }
        CellValue::Integer(n) => {
            ws.write_number_with_format(row, col, *n as f64, format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetRecordInput, PropertyType};
    use crate::assumptions::AssumptionSet;
    use crate::underwriting::model::compute;
    use crate::underwriting::projection::project_default;

    fn fixture(
        price: Decimal,
        assumptions: &AssumptionSet,
    ) -> (AssetRecord, UnderwritingResult, ProjectionTable) {
        let asset = AssetRecord::new(AssetRecordInput {
            id: "wb-1".into(),
            price,
            address: "900 Commerce St".into(),
            city: "Dallas".into(),
            state: "TX".into(),
            zip_code: "75202".into(),
            units: 5,
            cap_rate: dec!(0.06),
            property_type: PropertyType::Office,
            year_built: None,
            square_footage: Some(12000),
            lot_size: None,
            description: None,
            amenities: vec![],
        })
        .unwrap();
        let result = compute(&asset, assumptions).unwrap();
        let table = project_default(&result, assumptions).unwrap();
        (asset, result, table)
    }

    #[test]
    fn test_sheet_order() {
        let (a, r, t) = fixture(dec!(450000), &AssumptionSet::default());
        let wb = layout(&a, &r, &t);
        let names: Vec<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, SHEET_NAMES.to_vec());
    }

    #[test]
    fn test_positive_cash_flow_emphasis() {
        let (a, r, t) = fixture(dec!(450000), &AssumptionSet::default());
        let wb = layout(&a, &r, &t);
        let sheet = wb.sheet(CASH_FLOW_ANALYSIS).unwrap();
        let (_, emphasis) = sheet.find_field("Before-Tax Cash Flow (Annual):").unwrap();
        assert_eq!(emphasis, Emphasis::Positive);
    }

    #[test]
    fn test_negative_cash_flow_emphasis() {
        let assumptions = AssumptionSet {
            interest_rate: dec!(0.09),
            ..Default::default()
        };
        let (a, r, t) = fixture(dec!(450000), &assumptions);
        assert!(r.annual_cash_flow < Decimal::ZERO);
        let wb = layout(&a, &r, &t);
        let sheet = wb.sheet(CASH_FLOW_ANALYSIS).unwrap();
        let (_, emphasis) = sheet.find_field("Before-Tax Cash Flow (Annual):").unwrap();
        assert_eq!(emphasis, Emphasis::Negative);
        let (_, emphasis) = sheet.find_field("Before-Tax Cash Flow (Monthly):").unwrap();
        assert_eq!(emphasis, Emphasis::Negative);
    }

    #[test]
    fn test_projection_rows() {
        let (a, r, t) = fixture(dec!(450000), &AssumptionSet::default());
        let wb = layout(&a, &r, &t);
        let sheet = wb.sheet(TEN_YEAR_PROJECTION).unwrap();
        let records = sheet
            .rows
            .iter()
            .filter(|row| matches!(row, SheetRow::Record(_)))
            .count();
        assert_eq!(records, 10);
    }

    #[test]
    fn test_ratio_fields() {
        let (a, r, t) = fixture(dec!(450000), &AssumptionSet::default());
        let wb = layout(&a, &r, &t);
        let sheet = wb.sheet(RATIOS_AND_METRICS).unwrap();
        assert_eq!(
            sheet.field_labels(),
            vec![
                "Cap Rate:",
                "Cash-on-Cash Return:",
                "Gross Rent Multiplier:",
                "Debt Service Coverage Ratio:",
                "Loan-to-Value Ratio:",
                "Operating Expense Ratio:",
                "NOI Margin:",
                "Price per Unit:",
                "NOI per Unit:",
                "Cash Flow per Unit:",
            ]
        );
        let (grm, _) = sheet.find_field("Gross Rent Multiplier:").unwrap();
        assert_eq!(*grm, CellValue::Multiple(dec!(450000) / dec!(54000)));
        let (ltv, _) = sheet.find_field("Loan-to-Value Ratio:").unwrap();
        assert_eq!(*ltv, CellValue::Percent(dec!(75)));
        let (per_unit, _) = sheet.find_field("Price per Unit:").unwrap();
        assert_eq!(*per_unit, CellValue::Currency(dec!(90000)));
    }

    #[test]
    fn test_unbounded_coverage_rendered_as_text() {
        let assumptions = AssumptionSet {
            down_payment_pct: Decimal::ONE,
            ..Default::default()
        };
        let (a, r, t) = fixture(dec!(450000), &assumptions);
        let wb = layout(&a, &r, &t);
        let sheet = wb.sheet(RATIOS_AND_METRICS).unwrap();
        let (dscr, _) = sheet.find_field("Debt Service Coverage Ratio:").unwrap();
        assert_eq!(*dscr, CellValue::Text("Unbounded (no debt service)".into()));
    }

    #[test]
    fn test_render_produces_xlsx_zip() {
        let (a, r, t) = fixture(dec!(450000), &AssumptionSet::default());
        let bytes = render(&a, &r, &t).unwrap();
        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }
}
