use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use underwrite_core::asset::{AssetRecord, PropertyType};
use underwrite_core::documents::{
    document_filename, sanitize_address, DocumentKind, DocumentOrchestrator, DocumentPreview,
};
use underwrite_core::offer::terms::{self, OfferConfig};
use underwrite_core::render::letter;
use underwrite_core::UnderwriteError;

fn asset_from_json() -> AssetRecord {
    serde_json::from_str(
        r#"{
            "id": "tx-88",
            "price": "1200000",
            "address": "88 Congress Ave, Unit 3/4",
            "city": "Austin",
            "state": "TX",
            "zip_code": "78701",
            "units": 12,
            "cap_rate": "0.062",
            "property_type": "mixed_use"
        }"#,
    )
    .unwrap()
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

// ===========================================================================
// Asset records
// ===========================================================================

#[test]
fn test_asset_deserialises_through_validation() {
    let asset = asset_from_json();
    assert_eq!(asset.property_type(), PropertyType::MixedUse);
    assert!(asset.amenities().is_empty());

    let bad = r#"{"id":"x","price":"0","address":"a","city":"b","state":"c",
        "zip_code":"d","units":1,"cap_rate":"0.05","property_type":"retail"}"#;
    assert!(serde_json::from_str::<AssetRecord>(bad).is_err());

    let unknown_kind = r#"{"id":"x","price":"10","address":"a","city":"b","state":"c",
        "zip_code":"d","units":1,"cap_rate":"0.05","property_type":"castle"}"#;
    assert!(serde_json::from_str::<AssetRecord>(unknown_kind).is_err());
}

// ===========================================================================
// Offer terms
// ===========================================================================

#[test]
fn test_omitted_offer_uses_discount_and_earnest_pct() {
    let asset = asset_from_json();
    let model = terms::build_on(&asset, None, &OfferConfig::default(), as_of()).unwrap();
    assert_eq!(model.offer_price, dec!(1200000) * dec!(0.95));
    assert_eq!(model.earnest_money, model.offer_price * dec!(0.01));
    assert_eq!(model.letter_date, as_of());
    assert_eq!(model.closing_date, NaiveDate::from_ymd_opt(2026, 12, 2).unwrap());
}

#[test]
fn test_letter_numbering_is_contiguous() {
    let asset = asset_from_json();
    for extra in 0..5usize {
        let config = OfferConfig {
            additional_terms: (0..extra).map(|i| format!("Extra term {i}")).collect(),
            ..Default::default()
        };
        let model = terms::build_on(&asset, Some(dec!(1000000)), &config, as_of()).unwrap();
        let numbers: Vec<usize> = letter::numbered_terms(&model).iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, (1..=6 + extra).collect::<Vec<_>>());
    }
}

// ===========================================================================
// Orchestrator
// ===========================================================================

#[test]
fn test_unknown_selector_fails_before_computation() {
    let orchestrator = DocumentOrchestrator::default();
    match orchestrator.preview_data(&asset_from_json(), "invalid").unwrap_err() {
        UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "document_type"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_underwriting_preview_contents() {
    let orchestrator = DocumentOrchestrator::default();
    let preview = orchestrator
        .preview_data(&asset_from_json(), "underwriting")
        .unwrap();
    match preview {
        DocumentPreview::Underwriting {
            model,
            projection,
            chart_series,
            ..
        } => {
            assert_eq!(model.purchase_price, dec!(1200000));
            assert_eq!(projection.len(), 10);
            assert_eq!(chart_series.expenses.len(), 6);
            assert_eq!(chart_series.cash_flow.len(), 10);
            // projection in a preview is rounded to whole units
            assert!(projection
                .periods
                .iter()
                .all(|p| p.cash_flow == p.cash_flow.round()));
        }
        other => panic!("Expected underwriting preview, got {other:?}"),
    }
}

#[test]
fn test_preview_serialises_with_kind_tag() {
    let orchestrator = DocumentOrchestrator::default();
    let preview = orchestrator
        .preview_on(&asset_from_json(), DocumentKind::Loi, as_of())
        .unwrap();
    let json = serde_json::to_value(&preview).unwrap();
    assert_eq!(json["kind"], "loi");
    assert_eq!(json["letter"]["letter_date"], "2026-10-18");
}

#[test]
fn test_generated_workbook_name_and_bytes() {
    let orchestrator = DocumentOrchestrator::default();
    let doc = orchestrator
        .produce_on(&asset_from_json(), DocumentKind::Underwriting, None, as_of())
        .unwrap();
    assert_eq!(doc.filename, "Underwriting_88_Congress_Ave_Unit_34_20261018.xlsx");
    assert_eq!(doc.media_type, DocumentKind::Underwriting.media_type());
    assert!(doc.bytes.starts_with(b"PK"));
}

#[test]
fn test_generated_letter_name_and_bytes() {
    let orchestrator = DocumentOrchestrator::default();
    let doc = orchestrator
        .produce_on(&asset_from_json(), DocumentKind::Loi, Some(dec!(1100000)), as_of())
        .unwrap();
    assert_eq!(doc.filename, "LOI_88_Congress_Ave_Unit_34_20261018.pdf");
    assert_eq!(doc.media_type, "application/pdf");
    assert!(doc.bytes.starts_with(b"%PDF"));
}

#[test]
fn test_negative_offer_price_is_rejected() {
    let orchestrator = DocumentOrchestrator::default();
    let err = orchestrator
        .produce_offer_on(&asset_from_json(), Some(-Decimal::ONE), as_of())
        .unwrap_err();
    assert!(matches!(err, UnderwriteError::InvalidInput { .. }));
}

#[test]
fn test_filename_sanitisation_is_idempotent() {
    let raw = "12/B Oak Lane, Apt 7";
    let once = sanitize_address(raw);
    assert_eq!(once, "12B_Oak_Lane_Apt_7");
    assert_eq!(sanitize_address(&once), once);
    assert_eq!(
        document_filename(DocumentKind::Loi, &once, as_of()),
        document_filename(DocumentKind::Loi, raw, as_of())
    );
}
