use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use underwrite_core::asset::AssetRecord;
use underwrite_core::offer::terms;
use underwrite_core::underwriting::charts::build_chart_series;
use underwrite_core::underwriting::{model, projection};

use super::{AssumptionOverrides, Settings};
use crate::input;

#[derive(Args)]
pub struct UnderwriteArgs {
    /// Asset record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub overrides: AssumptionOverrides,
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Asset record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of projected years (1-100)
    #[arg(long, default_value_t = projection::DEFAULT_PROJECTION_PERIODS)]
    pub periods: u32,

    /// Include chart series alongside the table
    #[arg(long)]
    pub charts: bool,

    #[command(flatten)]
    pub overrides: AssumptionOverrides,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct OfferArgs {
    /// Asset record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Offer price; defaults to the asking price less the configured discount
    #[arg(long)]
    pub offer_price: Option<Decimal>,
}

pub fn run_underwrite(
    args: UnderwriteArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let asset: AssetRecord = input::read_input(args.input.as_deref(), "underwriting")?;
    let assumptions = args.overrides.apply(&settings.assumptions);
    let output = model::underwrite(&asset, &assumptions)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_project(
    args: ProjectArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let asset: AssetRecord = input::read_input(args.input.as_deref(), "projection")?;
    let assumptions = args.overrides.apply(&settings.assumptions);
    let result = model::compute(&asset, &assumptions)?;
    let table = projection::project(
        &result,
        assumptions.rent_growth,
        assumptions.expense_growth,
        args.periods,
    )?;

    if args.charts {
        let charts = build_chart_series(&result, &table);
        return Ok(json!({
            "projection": table.rounded(),
            "chart_series": charts,
        }));
    }
    Ok(serde_json::to_value(table.rounded().periods)?)
}

pub fn run_offer(args: OfferArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let asset: AssetRecord = input::read_input(args.input.as_deref(), "offer terms")?;
    let letter = terms::build(&asset, args.offer_price, &settings.offer_config)?;
    Ok(json!({ "result": letter }))
}
