use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use serde::Serialize;

use crate::asset::AssetRecord;
use crate::offer::terms::LetterModel;
use crate::render::{format_currency, group_thousands, render_error};
use crate::UnderwriteResult;

/// Clauses 1-6 of every letter; additional terms continue the numbering.
pub const STANDARD_CLAUSES: [&str; 6] = [
    "This Letter of Intent is non-binding and subject to execution of a formal Purchase Agreement.",
    "Buyer shall have the right to inspect the property during the inspection period.",
    "Sale is contingent upon buyer securing satisfactory financing terms.",
    "Property to be sold in \"as-is\" condition unless otherwise negotiated.",
    "Standard title insurance and warranty deed to be provided by seller.",
    "Prorations of taxes, insurance, and other expenses as of closing date.",
];

pub const FOOTER: &str = "Generated by RETS AI - Real Estate Transaction System";

const LONG_DATE: &str = "%B %d, %Y";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LetterLine {
    Field { label: String, value: String },
    Numbered { number: usize, text: String },
    Signature { party: String, signer: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterSection {
    pub heading: String,
    pub lines: Vec<LetterLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterLayout {
    pub title: String,
    pub subtitle: String,
    pub date_line: String,
    pub sections: Vec<LetterSection>,
    pub footer: String,
}

impl LetterLayout {
    pub fn section(&self, heading: &str) -> Option<&LetterSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

fn field(label: &str, value: impl Into<String>) -> LetterLine {
    LetterLine::Field {
        label: label.into(),
        value: value.into(),
    }
}

/// Standard clauses followed by the letter's additional terms, numbered from 1.
pub fn numbered_terms(letter: &LetterModel) -> Vec<(usize, String)> {
    STANDARD_CLAUSES
        .iter()
        .map(|c| c.to_string())
        .chain(letter.additional_terms.iter().cloned())
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .collect()
}

pub fn layout(asset: &AssetRecord, letter: &LetterModel) -> LetterLayout {
    let mut property = vec![
        field("Address", asset.address()),
        field(
            "City, State, ZIP",
            format!("{}, {} {}", asset.city(), asset.state(), asset.zip_code()),
        ),
        field(
            "Property Type",
            format!("{} ({} units)", asset.property_type(), asset.units()),
        ),
    ];
    if let Some(year) = asset.year_built() {
        property.push(field("Year Built", year.to_string()));
    }
    if let Some(sqft) = asset.square_footage() {
        property.push(field(
            "Square Footage",
            format!("{} sq ft", group_thousands(&sqft.to_string())),
        ));
    }

    let buyer = vec![
        field("Name", letter.buyer_name.as_str()),
        field("Contact", letter.buyer_contact.as_str()),
    ];

    let purchase = vec![
        field("Offer Price", format_currency(letter.offer_price)),
        field("Earnest Money", format_currency(letter.earnest_money)),
        field(
            "Proposed Closing Date",
            letter.closing_date.format(LONG_DATE).to_string(),
        ),
        field(
            "Inspection Period",
            format!("{} days", letter.inspection_period_days),
        ),
        field(
            "Financing Contingency",
            if letter.financing_contingency { "Yes" } else { "No" },
        ),
    ];

    let terms = numbered_terms(letter)
        .into_iter()
        .map(|(number, text)| LetterLine::Numbered { number, text })
        .collect();

    let signatures = vec![
        LetterLine::Signature {
            party: "Buyer".into(),
            signer: Some(letter.buyer_name.clone()),
        },
        LetterLine::Signature {
            party: "Seller".into(),
            signer: None,
        },
    ];

    LetterLayout {
        title: "LETTER OF INTENT".into(),
        subtitle: "Real Estate Purchase".into(),
        date_line: format!("Date: {}", letter.letter_date.format(LONG_DATE)),
        sections: vec![
            LetterSection {
                heading: "PROPERTY INFORMATION".into(),
                lines: property,
            },
            LetterSection {
                heading: "BUYER INFORMATION".into(),
                lines: buyer,
            },
            LetterSection {
                heading: "PURCHASE TERMS".into(),
                lines: purchase,
            },
            LetterSection {
                heading: "TERMS AND CONDITIONS".into(),
                lines: terms,
            },
            LetterSection {
                heading: "SIGNATURES".into(),
                lines: signatures,
            },
        ],
        footer: FOOTER.into(),
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 25.4;
const BOTTOM_MARGIN_MM: f32 = 15.0;
const PT_TO_MM: f32 = 0.3528;
/// Helvetica averages roughly half an em per glyph.
const AVG_GLYPH_EM: f32 = 0.5;

/// Render the letter of intent (PDF bytes).
pub fn render(asset: &AssetRecord, letter: &LetterModel) -> UnderwriteResult<Vec<u8>> {
    write_pdf(&layout(asset, letter))
}

struct Typesetter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Typesetter {
    fn new(title: &str) -> UnderwriteResult<Self> {
        let err = |e| render_error("letter of intent", e);
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Typesetter {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn line_height(size: f32) -> f32 {
        size * PT_TO_MM * 1.45
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < BOTTOM_MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn text_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
    }

    fn write(&mut self, text: &str, size: f32, bold: bool, x: f32) {
        let height = Self::line_height(size);
        self.ensure_room(height);
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn centered(&mut self, text: &str, size: f32, bold: bool) {
        let x = ((PAGE_WIDTH_MM - Self::text_width(text, size)) / 2.0).max(MARGIN_MM);
        self.write(text, size, bold, x);
    }

    /// Word-wrapped paragraph starting at `indent` mm from the left margin.
    fn paragraph(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent;
        let max_chars = (usable / (size * AVG_GLYPH_EM * PT_TO_MM)).floor().max(10.0) as usize;
        for line in wrap(text, max_chars) {
            self.write(&line, size, bold, MARGIN_MM + indent);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> UnderwriteResult<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| render_error("letter of intent", e))
    }
}

/// Greedy word wrap on character count.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Typeset a letter layout. Fails as a whole; never returns a partial buffer.
pub fn write_pdf(layout: &LetterLayout) -> UnderwriteResult<Vec<u8>> {
    let mut ts = Typesetter::new(&layout.title)?;

    ts.centered(&layout.title, 20.0, true);
    ts.gap(2.0);
    ts.centered(&layout.subtitle, 14.0, true);
    ts.gap(10.0);
    ts.paragraph(&layout.date_line, 10.0, false, 0.0);
    ts.gap(6.0);

    for section in &layout.sections {
        ts.gap(5.0);
        ts.paragraph(&format!("{}:", section.heading), 14.0, true, 0.0);
        ts.gap(2.0);
        for line in &section.lines {
            match line {
                LetterLine::Field { label, value } => {
                    ts.paragraph(&format!("{label}: {value}"), 10.0, false, 0.0);
                }
                LetterLine::Numbered { number, text } => {
                    ts.paragraph(&format!("{number}. {text}"), 10.0, false, 0.0);
                    ts.gap(1.5);
                }
                LetterLine::Signature { party, signer } => {
                    ts.gap(4.0);
                    ts.paragraph(
                        &format!("{party}: {}    Date: {}", "_".repeat(40), "_".repeat(20)),
                        10.0,
                        true,
                        0.0,
                    );
                    if let Some(name) = signer {
                        ts.paragraph(name, 10.0, false, 0.0);
                    }
                }
            }
        }
    }

    ts.gap(12.0);
    ts.centered(&layout.footer, 9.0, false);
    ts.finish()
}
