use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

use underwrite_core::asset::AssetRecord;
use underwrite_core::documents::DocumentKind;

use super::{AssumptionOverrides, Settings};
use crate::input;

#[derive(Args)]
pub struct PreviewArgs {
    /// Asset record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Document type: underwriting or loi
    #[arg(long)]
    pub kind: String,

    #[command(flatten)]
    pub overrides: AssumptionOverrides,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GenerateArgs {
    /// Asset record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Document type: underwriting or loi
    #[arg(long)]
    pub kind: String,

    /// Directory the document is written into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Offer price for a letter of intent
    #[arg(long)]
    pub offer_price: Option<Decimal>,

    #[command(flatten)]
    pub overrides: AssumptionOverrides,
}

pub fn run_preview(args: PreviewArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let kind: DocumentKind = args.kind.parse()?;
    let asset: AssetRecord = input::read_input(args.input.as_deref(), "preview")?;
    let preview = settings.orchestrator(&args.overrides).preview(&asset, kind)?;
    Ok(serde_json::to_value(preview)?)
}

pub fn run_generate(
    args: GenerateArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let kind: DocumentKind = args.kind.parse()?;
    let asset: AssetRecord = input::read_input(args.input.as_deref(), "document generation")?;
    let document = settings
        .orchestrator(&args.overrides)
        .produce(&asset, kind, args.offer_price)?;

    if !args.out_dir.is_dir() {
        return Err(format!("Not a directory: {}", args.out_dir.display()).into());
    }
    let path = args.out_dir.join(&document.filename);
    fs::write(&path, &document.bytes)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "document written");

    Ok(json!({
        "filename": document.filename,
        "media_type": document.media_type,
        "path": path.display().to_string(),
        "bytes": document.bytes.len(),
    }))
}
