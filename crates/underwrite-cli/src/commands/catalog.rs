use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use underwrite_core::asset::{AssetRecord, PropertyType};
use underwrite_core::catalog::{AssetCatalog, SearchFilters};

use crate::input;

#[derive(Args)]
pub struct SearchArgs {
    /// Catalog file: a JSON or YAML array of asset records
    #[arg(long)]
    pub input: Option<String>,

    /// Substring of city, address or state
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub min_price: Option<Decimal>,

    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Listed cap rate floor (decimal)
    #[arg(long)]
    pub min_cap_rate: Option<Decimal>,

    #[arg(long)]
    pub max_cap_rate: Option<Decimal>,

    /// apartment, office, retail, industrial or mixed_use
    #[arg(long)]
    pub property_type: Option<PropertyType>,

    #[arg(long)]
    pub min_units: Option<u32>,

    #[arg(long)]
    pub max_units: Option<u32>,
}

pub fn run_search(args: SearchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assets: Vec<AssetRecord> = input::read_input(args.input.as_deref(), "catalog search")?;
    let catalog = AssetCatalog::new(assets);
    let filters = SearchFilters {
        location: args.location,
        min_price: args.min_price,
        max_price: args.max_price,
        min_cap_rate: args.min_cap_rate,
        max_cap_rate: args.max_cap_rate,
        property_type: args.property_type,
        min_units: args.min_units,
        max_units: args.max_units,
    };
    let found = catalog.search(&filters)?;
    Ok(serde_json::to_value(found.assets)?)
}
