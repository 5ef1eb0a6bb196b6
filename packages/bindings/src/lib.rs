use napi::bindgen_prelude::Buffer;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use underwrite_core::asset::AssetRecord;
use underwrite_core::assumptions::AssumptionSet;
use underwrite_core::documents::{DocumentKind, DocumentOrchestrator};
use underwrite_core::offer::terms::OfferConfig;
use underwrite_core::underwriting::{model, projection};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_asset(asset_json: &str) -> NapiResult<AssetRecord> {
    serde_json::from_str(asset_json).map_err(to_napi_error)
}

/// Absent or empty JSON means the documented defaults.
fn parse_or_default<T: serde::de::DeserializeOwned + Default>(json: Option<String>) -> NapiResult<T> {
    match json.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(s) => serde_json::from_str(s).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Underwriting
// ---------------------------------------------------------------------------

#[napi]
pub fn underwrite(asset_json: String, assumptions_json: Option<String>) -> NapiResult<String> {
    let asset = parse_asset(&asset_json)?;
    let assumptions: AssumptionSet = parse_or_default(assumptions_json)?;
    let output = model::underwrite(&asset, &assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_cash_flows(
    asset_json: String,
    assumptions_json: Option<String>,
    periods: Option<u32>,
) -> NapiResult<String> {
    let asset = parse_asset(&asset_json)?;
    let assumptions: AssumptionSet = parse_or_default(assumptions_json)?;
    let result = model::compute(&asset, &assumptions).map_err(to_napi_error)?;
    let table = projection::project(
        &result,
        assumptions.rent_growth,
        assumptions.expense_growth,
        periods.unwrap_or(projection::DEFAULT_PROJECTION_PERIODS),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&table.rounded()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[napi(object)]
pub struct GeneratedFile {
    pub filename: String,
    pub media_type: String,
    pub data: Buffer,
}

fn orchestrator(
    assumptions_json: Option<String>,
    offer_config_json: Option<String>,
) -> NapiResult<DocumentOrchestrator> {
    let assumptions: AssumptionSet = parse_or_default(assumptions_json)?;
    let offer_config: OfferConfig = parse_or_default(offer_config_json)?;
    Ok(DocumentOrchestrator::new(assumptions, offer_config))
}

#[napi]
pub fn preview_document(
    asset_json: String,
    kind: String,
    assumptions_json: Option<String>,
    offer_config_json: Option<String>,
) -> NapiResult<String> {
    let kind: DocumentKind = kind.parse().map_err(to_napi_error)?;
    let asset = parse_asset(&asset_json)?;
    let preview = orchestrator(assumptions_json, offer_config_json)?
        .preview(&asset, kind)
        .map_err(to_napi_error)?;
    serde_json::to_string(&preview).map_err(to_napi_error)
}

#[napi]
pub fn generate_document(
    asset_json: String,
    kind: String,
    offer_price: Option<String>,
    assumptions_json: Option<String>,
    offer_config_json: Option<String>,
) -> NapiResult<GeneratedFile> {
    let kind: DocumentKind = kind.parse().map_err(to_napi_error)?;
    let asset = parse_asset(&asset_json)?;
    let offer_price = offer_price
        .map(|p| p.trim().parse::<Decimal>())
        .transpose()
        .map_err(to_napi_error)?;
    let document = orchestrator(assumptions_json, offer_config_json)?
        .produce(&asset, kind, offer_price)
        .map_err(to_napi_error)?;
    Ok(GeneratedFile {
        filename: document.filename,
        media_type: document.media_type.to_string(),
        data: document.bytes.into(),
    })
}
