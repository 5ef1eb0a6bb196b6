use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnderwriteError;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

/// Property category. Closed set; unknown categories fail deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Office,
    Retail,
    Industrial,
    MixedUse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::Office,
        PropertyType::Retail,
        PropertyType::Industrial,
        PropertyType::MixedUse,
    ];

    /// Wire identifier, e.g. `mixed_use`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Office => "office",
            PropertyType::Retail => "retail",
            PropertyType::Industrial => "industrial",
            PropertyType::MixedUse => "mixed_use",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Office => "Office",
            PropertyType::Retail => "Retail",
            PropertyType::Industrial => "Industrial",
            PropertyType::MixedUse => "Mixed-Use",
        };
        f.write_str(label)
    }
}

impl FromStr for PropertyType {
    type Err = UnderwriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalised)
            .ok_or_else(|| {
                UnderwriteError::invalid(
                    "property_type",
                    format!(
                        "'{s}' is not one of apartment, office, retail, industrial, mixed_use"
                    ),
                )
            })
    }
}

/// Raw, unvalidated asset fields as supplied by a caller or a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecordInput {
    pub id: String,
    pub price: Money,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub units: u32,
    /// Listed capitalisation rate (decimal). Informational only.
    pub cap_rate: Rate,
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Largest purchase price accepted; keeps every derived figure within Decimal range.
pub const MAX_PRICE: Money = dec!(1000000000000000);

/// A validated property record. Immutable once constructed.
///
/// Every route into this type, including deserialisation, passes through
/// [`AssetRecord::new`], so downstream code never re-validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AssetRecordInput")]
pub struct AssetRecord {
    id: String,
    price: Money,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    units: u32,
    cap_rate: Rate,
    property_type: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_built: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    square_footage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lot_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    amenities: Vec<String>,
}

impl AssetRecord {
    pub fn new(input: AssetRecordInput) -> UnderwriteResult<Self> {
        require_text("id", &input.id)?;
        require_text("address", &input.address)?;
        require_text("city", &input.city)?;
        require_text("state", &input.state)?;
        require_text("zip_code", &input.zip_code)?;

        if input.price <= Decimal::ZERO || input.price > MAX_PRICE {
            return Err(UnderwriteError::invalid(
                "price",
                format!("Purchase price must be positive and at most {MAX_PRICE}"),
            ));
        }
        if input.units == 0 {
            return Err(UnderwriteError::invalid(
                "units",
                "Unit count must be at least 1",
            ));
        }
        if input.cap_rate < Decimal::ZERO {
            return Err(UnderwriteError::invalid(
                "cap_rate",
                "Listed cap rate cannot be negative",
            ));
        }
        if input.square_footage == Some(0) {
            return Err(UnderwriteError::invalid(
                "square_footage",
                "Square footage, when given, must be positive",
            ));
        }

        Ok(AssetRecord {
            id: input.id.trim().to_string(),
            price: input.price,
            address: input.address.trim().to_string(),
            city: input.city.trim().to_string(),
            state: input.state.trim().to_string(),
            zip_code: input.zip_code.trim().to_string(),
            units: input.units,
            cap_rate: input.cap_rate,
            property_type: input.property_type,
            year_built: input.year_built,
            square_footage: input.square_footage,
            lot_size: input.lot_size,
            description: input.description,
            amenities: input.amenities,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    /// Listed cap rate carried with the record; the model computes its own.
    pub fn cap_rate(&self) -> Rate {
        self.cap_rate
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn year_built(&self) -> Option<u32> {
        self.year_built
    }

    pub fn square_footage(&self) -> Option<u32> {
        self.square_footage
    }

    pub fn lot_size(&self) -> Option<&str> {
        self.lot_size.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amenities(&self) -> &[String] {
        &self.amenities
    }

    /// "address, city, state zip"
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }
}

impl TryFrom<AssetRecordInput> for AssetRecord {
    type Error = UnderwriteError;

    fn try_from(input: AssetRecordInput) -> Result<Self, Self::Error> {
        AssetRecord::new(input)
    }
}

fn require_text(field: &str, value: &str) -> UnderwriteResult<()> {
    if value.trim().is_empty() {
        return Err(UnderwriteError::invalid(field, "Must not be empty"));
    }
    Ok(())
}
