use chrono::{Days, Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::AssetRecord;
use crate::error::UnderwriteError;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

/// Offer defaults and boilerplate. Substitutable per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferConfig {
    /// Default offer as a fraction of asking price
    pub asking_discount: Rate,
    /// Earnest money as a fraction of the offer
    pub earnest_money_pct: Rate,
    pub closing_days: u32,
    pub inspection_period_days: u32,
    pub financing_contingency: bool,
    pub buyer_name: String,
    pub buyer_contact: String,
    /// Terms appended after the standard clauses, in order
    pub additional_terms: Vec<String>,
}

impl Default for OfferConfig {
    fn default() -> Self {
        Self {
            asking_discount: dec!(0.95),
            earnest_money_pct: dec!(0.01),
            closing_days: 45,
            inspection_period_days: 14,
            financing_contingency: true,
            buyer_name: "Investment Group LLC".into(),
            buyer_contact: "contact@investmentgroup.com".into(),
            additional_terms: vec![
                "Seller to provide all property maintenance records".into(),
                "Current tenant leases to transfer to buyer at closing".into(),
                "Property management transition period of 30 days included".into(),
            ],
        }
    }
}

/// Proposed purchase terms for a letter of intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterModel {
    pub property_address: String,
    pub offer_price: Money,
    pub earnest_money: Money,
    pub letter_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub inspection_period_days: u32,
    pub financing_contingency: bool,
    pub additional_terms: Vec<String>,
    pub buyer_name: String,
    pub buyer_contact: String,
}

/// Build offer terms dated today.
pub fn build(
    asset: &AssetRecord,
    offer_price: Option<Money>,
    config: &OfferConfig,
) -> UnderwriteResult<LetterModel> {
    build_on(asset, offer_price, config, Local::now().date_naive())
}

/// Build offer terms as of `today`.
pub fn build_on(
    asset: &AssetRecord,
    offer_price: Option<Money>,
    config: &OfferConfig,
    today: NaiveDate,
) -> UnderwriteResult<LetterModel> {
    validate_config(config)?;

    let offer_price = match offer_price {
        Some(p) if p <= Decimal::ZERO => {
            return Err(UnderwriteError::invalid(
                "offer_price",
                "Offer price must be positive",
            ));
        }
        Some(p) => p,
        None => asset.price() * config.asking_discount,
    };

    let earnest_money = offer_price * config.earnest_money_pct;
    let closing_date = today
        .checked_add_days(Days::new(u64::from(config.closing_days)))
        .ok_or_else(|| {
            UnderwriteError::DateError(format!(
                "closing date {} days after {today} is out of range",
                config.closing_days
            ))
        })?;

    debug!(
        asset_id = asset.id(),
        offer_price = %offer_price,
        %closing_date,
        "offer terms built"
    );

    Ok(LetterModel {
        property_address: asset.full_address(),
        offer_price,
        earnest_money,
        letter_date: today,
        closing_date,
        inspection_period_days: config.inspection_period_days,
        financing_contingency: config.financing_contingency,
        additional_terms: config.additional_terms.clone(),
        buyer_name: config.buyer_name.clone(),
        buyer_contact: config.buyer_contact.clone(),
    })
}

fn validate_config(config: &OfferConfig) -> UnderwriteResult<()> {
    if config.asking_discount <= Decimal::ZERO {
        return Err(UnderwriteError::invalid(
            "asking_discount",
            "Asking-price multiplier must be positive",
        ));
    }
    if config.earnest_money_pct < Decimal::ZERO || config.earnest_money_pct > Decimal::ONE {
        return Err(UnderwriteError::invalid(
            "earnest_money_pct",
            "Earnest money must be between 0 and 1 of the offer",
        ));
    }
    if config.buyer_name.trim().is_empty() {
        return Err(UnderwriteError::invalid("buyer_name", "Must not be empty"));
    }
    if config.additional_terms.iter().any(|t| t.trim().is_empty()) {
        return Err(UnderwriteError::invalid(
            "additional_terms",
            "Additional terms must not be blank",
        ));
    }
    Ok(())
}
