//! Catalog Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{
    catalog::{LineKind, Unit},
    fixtures::FixtureError,
    tax::TaxRate,
};

/// Wrapper for a whole catalog file in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of category key -> category fixture
    #[serde(default)]
    pub categories: FxHashMap<String, CategoryFixture>,

    /// Map of group key -> modifier group fixture
    #[serde(default)]
    pub groups: FxHashMap<String, GroupFixture>,

    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Category fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Category name
    pub name: String,
}

/// Modifier group fixture from YAML
#[derive(Debug, Deserialize)]
pub struct GroupFixture {
    /// Group name
    pub name: String,

    /// Minimum selections required at commit (defaults to 0)
    #[serde(default)]
    pub min: usize,

    /// Maximum selections the group holds (defaults to 0)
    #[serde(default)]
    pub max: usize,

    /// Option key selected implicitly while the group has no explicit pick
    pub default: Option<String>,

    /// Option keys hidden from the group
    #[serde(default)]
    pub excluded: Vec<String>,

    /// VAT rate for options that do not carry their own (e.g. "20%")
    pub tax: Option<String>,

    /// Options in display order
    pub options: Vec<OptionFixture>,
}

/// Modifier option fixture from YAML
#[derive(Debug, Deserialize)]
pub struct OptionFixture {
    /// Key the option is referenced by within its group
    pub key: String,

    /// Option name
    pub name: String,

    /// Tax-inclusive price contribution (e.g. "0.40 GBP")
    pub price: String,

    /// VAT rate (e.g. "20%"); falls back to the group rate, then zero
    pub tax: Option<String>,

    /// Whether the option can be selected (defaults to true)
    pub active: Option<bool>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Stock-keeping unit (defaults to the fixture key)
    pub sku: Option<String>,

    /// Tax-inclusive price (e.g. "2.99 GBP")
    pub price: String,

    /// VAT rate (e.g. "20%"); defaults to zero
    pub tax: Option<String>,

    /// Category key the product belongs to
    pub category: Option<String>,

    /// Modifier group keys attached to the product
    #[serde(default)]
    pub groups: Vec<String>,

    /// Sale unit: "per_item" (the default) or a measure name such as "kg"
    pub unit: Option<String>,

    /// Line shape: "item" (the default), "box" or "crate"
    pub kind: Option<String>,

    /// Whether the price is entered at the till
    #[serde(default)]
    pub open_price: bool,

    /// Whether the product can be sold (defaults to true)
    pub active: Option<bool>,
}

/// Parse a price string (e.g. "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency((*code).to_string()))?;

    // Scale by the currency exponent so "500 JPY" comes out as 500 minor units.
    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|factor| amount.checked_mul(factor))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a percentage string (e.g. "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed in either format.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(points) = trimmed.strip_suffix('%') {
        let value = points
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

/// Parse a VAT rate string in percent points (e.g. "20%" or "20")
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_tax_rate(s: &str) -> Result<TaxRate, FixtureError> {
    let trimmed = s.trim();
    let points = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let value = points
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidTaxRate(s.to_string()))?;

    Ok(TaxRate::from_percent(value))
}

/// Parse a sale unit string: "per_item" (or nothing) for whole items,
/// anything else names a measure.
#[must_use]
pub fn parse_unit(s: Option<&str>) -> Unit {
    match s {
        None | Some("per_item") => Unit::PerItem,
        Some(measure) => Unit::Measured(measure.to_string()),
    }
}

/// Parse a line kind string: "item" (the default), "box" or "crate"
///
/// # Errors
///
/// Returns an error for any other kind string.
pub fn parse_kind(s: Option<&str>) -> Result<LineKind, FixtureError> {
    match s {
        None | Some("item") => Ok(LineKind::Item),
        Some("box") => Ok(LineKind::Box),
        Some("crate") => Ok(LineKind::Crate),
        Some(other) => Err(FixtureError::InvalidProductData(format!(
            "unknown line kind: {other}"
        ))),
    }
}
