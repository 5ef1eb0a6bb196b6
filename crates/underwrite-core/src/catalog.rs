use serde::{Deserialize, Serialize};

use crate::asset::{AssetRecord, PropertyType};
use crate::error::UnderwriteError;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

/// Structured filters; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Case-insensitive substring of city, address or state
    pub location: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub min_cap_rate: Option<Rate>,
    pub max_cap_rate: Option<Rate>,
    pub property_type: Option<PropertyType>,
    pub min_units: Option<u32>,
    pub max_units: Option<u32>,
}

impl SearchFilters {
    pub fn validate(&self) -> UnderwriteResult<()> {
        fn check<T: PartialOrd>(lo: Option<T>, hi: Option<T>, field: &str) -> UnderwriteResult<()> {
            match (lo, hi) {
                (Some(lo), Some(hi)) if lo > hi => Err(UnderwriteError::invalid(
                    field,
                    "Minimum exceeds maximum",
                )),
                _ => Ok(()),
            }
        }
        check(self.min_price, self.max_price, "price")?;
        check(self.min_cap_rate, self.max_cap_rate, "cap_rate")?;
        check(self.min_units, self.max_units, "units")?;
        Ok(())
    }

    fn matches(&self, asset: &AssetRecord, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let hit = [asset.city(), asset.address(), asset.state()]
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        self.min_price.map_or(true, |v| asset.price() >= v)
            && self.max_price.map_or(true, |v| asset.price() <= v)
            && self.min_cap_rate.map_or(true, |v| asset.cap_rate() >= v)
            && self.max_cap_rate.map_or(true, |v| asset.cap_rate() <= v)
            && self.property_type.map_or(true, |t| asset.property_type() == t)
            && self.min_units.map_or(true, |v| asset.units() >= v)
            && self.max_units.map_or(true, |v| asset.units() <= v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub assets: Vec<AssetRecord>,
    pub total_count: usize,
}

/// In-memory listing of assets, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetCatalog {
    assets: Vec<AssetRecord>,
}

impl AssetCatalog {
    pub fn new(assets: Vec<AssetRecord>) -> Self {
        AssetCatalog { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AssetRecord> {
        self.assets.iter().find(|a| a.id() == id)
    }

    pub fn search(&self, filters: &SearchFilters) -> UnderwriteResult<SearchResult> {
        filters.validate()?;
        let needle = filters
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let assets: Vec<AssetRecord> = self
            .assets
            .iter()
            .filter(|a| filters.matches(a, needle.as_deref()))
            .cloned()
            .collect();
        tracing::debug!(matches = assets.len(), "catalog search");

        Ok(SearchResult {
            total_count: assets.len(),
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetRecordInput;
    use rust_decimal_macros::dec;

    fn asset(id: &str, city: &str, price: Money, units: u32, kind: PropertyType) -> AssetRecord {
        AssetRecord::new(AssetRecordInput {
            id: id.into(),
            address: format!("{id} Main St"),
            city: city.into(),
            state: "TX".into(),
            zip_code: "78701".into(),
            price,
            units,
            cap_rate: dec!(0.06),
            property_type: kind,
            year_built: None,
            square_footage: None,
            lot_size: None,
            description: None,
            amenities: Vec::new(),
        })
        .unwrap()
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::new(vec![
            asset("a1", "Austin", dec!(450000), 4, PropertyType::Apartment),
            asset("a2", "Dallas", dec!(1200000), 12, PropertyType::Apartment),
            asset("a3", "Austin", dec!(2500000), 1, PropertyType::Retail),
        ])
    }

    #[test]
    fn test_get_by_id() {
        let c = catalog();
        assert_eq!(c.get("a2").map(|a| a.city()), Some("Dallas"));
        assert!(c.get("zz").is_none());
    }

    #[test]
    fn test_empty_filters_return_everything() {
        let r = catalog().search(&SearchFilters::default()).unwrap();
        assert_eq!(r.total_count, 3);
    }

    #[test]
    fn test_location_is_case_insensitive() {
        let filters = SearchFilters {
            location: Some("aUSTIN".into()),
            ..Default::default()
        };
        let r = catalog().search(&filters).unwrap();
        let ids: Vec<&str> = r.assets.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn test_combined_filters() {
        let filters = SearchFilters {
            max_price: Some(dec!(1500000)),
            property_type: Some(PropertyType::Apartment),
            min_units: Some(5),
            ..Default::default()
        };
        let r = catalog().search(&filters).unwrap();
        assert_eq!(r.total_count, 1);
        assert_eq!(r.assets[0].id(), "a2");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let filters = SearchFilters {
            min_price: Some(dec!(2)),
            max_price: Some(dec!(1)),
            ..Default::default()
        };
        match catalog().search(&filters).unwrap_err() {
            UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "price"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
