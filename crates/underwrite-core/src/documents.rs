use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::asset::AssetRecord;
use crate::assumptions::AssumptionSet;
use crate::error::UnderwriteError;
use crate::offer::terms::{self, LetterModel, OfferConfig};
#[cfg(feature = "render")]
use crate::types::Money;
use crate::underwriting::charts::{build_chart_series, ChartSeriesSet};
use crate::underwriting::model::{self, UnderwritingResult};
use crate::underwriting::projection::{self, ProjectionTable};
use crate::UnderwriteResult;

#[cfg(feature = "render")]
use crate::render::{letter, workbook};

// ---------------------------------------------------------------------------
// Document kinds & filenames
// ---------------------------------------------------------------------------

/// The two documents the system produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Underwriting,
    Loi,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Underwriting => "underwriting",
            DocumentKind::Loi => "loi",
        }
    }

    pub fn filename_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Underwriting => "Underwriting",
            DocumentKind::Loi => "LOI",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Underwriting => "xlsx",
            DocumentKind::Loi => "pdf",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            DocumentKind::Underwriting => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            DocumentKind::Loi => "application/pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = UnderwriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "underwriting" => Ok(DocumentKind::Underwriting),
            "loi" => Ok(DocumentKind::Loi),
            other => Err(UnderwriteError::invalid(
                "document_type",
                format!("'{other}' is not a document type; expected 'underwriting' or 'loi'"),
            )),
        }
    }
}

/// Spaces become underscores; commas and slashes are dropped.
pub fn sanitize_address(address: &str) -> String {
    address
        .chars()
        .filter(|c| *c != ',' && *c != '/')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// `<Prefix>_<address>_<YYYYMMDD>.<ext>`
pub fn document_filename(kind: DocumentKind, address: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.{}",
        kind.filename_prefix(),
        sanitize_address(address),
        date.format("%Y%m%d"),
        kind.extension()
    )
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A rendered document ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub filename: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Data shown in the UI before any binary is produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentPreview {
    Underwriting {
        asset: AssetRecord,
        model: UnderwritingResult,
        projection: ProjectionTable,
        chart_series: ChartSeriesSet,
        warnings: Vec<String>,
    },
    Loi {
        asset: AssetRecord,
        letter: LetterModel,
    },
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Sequences computation, rendering and naming. Holds configuration only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentOrchestrator {
    pub assumptions: AssumptionSet,
    pub offer_config: OfferConfig,
}

impl DocumentOrchestrator {
    pub fn new(assumptions: AssumptionSet, offer_config: OfferConfig) -> Self {
        DocumentOrchestrator {
            assumptions,
            offer_config,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Underwriting model plus its projection under the configured assumptions.
    pub fn model(&self, asset: &AssetRecord) -> UnderwriteResult<(UnderwritingResult, ProjectionTable)> {
        let result = model::compute(asset, &self.assumptions)?;
        let table = projection::project_default(&result, &self.assumptions)?;
        Ok((result, table))
    }

    pub fn preview(&self, asset: &AssetRecord, kind: DocumentKind) -> UnderwriteResult<DocumentPreview> {
        self.preview_on(asset, kind, Self::today())
    }

    /// Parse the selector first; an unknown kind fails before any computation.
    pub fn preview_data(&self, asset: &AssetRecord, kind: &str) -> UnderwriteResult<DocumentPreview> {
        let kind: DocumentKind = kind.parse()?;
        self.preview(asset, kind)
    }

    pub fn preview_on(
        &self,
        asset: &AssetRecord,
        kind: DocumentKind,
        today: NaiveDate,
    ) -> UnderwriteResult<DocumentPreview> {
        debug!(asset_id = asset.id(), %kind, "building preview");
        match kind {
            DocumentKind::Underwriting => {
                let output = model::underwrite(asset, &self.assumptions)?;
                let table = projection::project_default(&output.result, &self.assumptions)?;
                let chart_series = build_chart_series(&output.result, &table);
                Ok(DocumentPreview::Underwriting {
                    asset: asset.clone(),
                    model: output.result,
                    projection: table.rounded(),
                    chart_series,
                    warnings: output.warnings,
                })
            }
            DocumentKind::Loi => {
                let letter = terms::build_on(asset, None, &self.offer_config, today)?;
                Ok(DocumentPreview::Loi {
                    asset: asset.clone(),
                    letter,
                })
            }
        }
    }

    #[cfg(feature = "render")]
    pub fn produce(
        &self,
        asset: &AssetRecord,
        kind: DocumentKind,
        offer_price: Option<Money>,
    ) -> UnderwriteResult<GeneratedDocument> {
        self.produce_on(asset, kind, offer_price, Self::today())
    }

    #[cfg(feature = "render")]
    pub fn produce_on(
        &self,
        asset: &AssetRecord,
        kind: DocumentKind,
        offer_price: Option<Money>,
        today: NaiveDate,
    ) -> UnderwriteResult<GeneratedDocument> {
        match kind {
            DocumentKind::Underwriting => self.produce_underwriting_on(asset, today),
            DocumentKind::Loi => self.produce_offer_on(asset, offer_price, today),
        }
    }

    #[cfg(feature = "render")]
    pub fn produce_underwriting(&self, asset: &AssetRecord) -> UnderwriteResult<GeneratedDocument> {
        self.produce_underwriting_on(asset, Self::today())
    }

    #[cfg(feature = "render")]
    pub fn produce_underwriting_on(
        &self,
        asset: &AssetRecord,
        today: NaiveDate,
    ) -> UnderwriteResult<GeneratedDocument> {
        let (result, table) = self.model(asset)?;
        let bytes = workbook::render(asset, &result, &table)?;
        Ok(self.finish(DocumentKind::Underwriting, asset, today, bytes))
    }

    #[cfg(feature = "render")]
    pub fn produce_offer(
        &self,
        asset: &AssetRecord,
        offer_price: Option<Money>,
    ) -> UnderwriteResult<GeneratedDocument> {
        self.produce_offer_on(asset, offer_price, Self::today())
    }

    #[cfg(feature = "render")]
    pub fn produce_offer_on(
        &self,
        asset: &AssetRecord,
        offer_price: Option<Money>,
        today: NaiveDate,
    ) -> UnderwriteResult<GeneratedDocument> {
        let letter_model = terms::build_on(asset, offer_price, &self.offer_config, today)?;
        let bytes = letter::render(asset, &letter_model)?;
        Ok(self.finish(DocumentKind::Loi, asset, today, bytes))
    }

    #[cfg(feature = "render")]
    fn finish(
        &self,
        kind: DocumentKind,
        asset: &AssetRecord,
        today: NaiveDate,
        bytes: Vec<u8>,
    ) -> GeneratedDocument {
        let filename = document_filename(kind, asset.address(), today);
        tracing::info!(
            asset_id = asset.id(),
            %kind,
            %filename,
            size = bytes.len(),
            "document produced"
        );
        GeneratedDocument {
            kind,
            filename,
            media_type: kind.media_type(),
            bytes,
        }
    }
}
