//! Tax

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::ToPrimitive,
};
use rusty_money::{Money, iso::Currency};

/// A VAT rate in percent points, clamped to `0..=100` at construction.
///
/// Prices in the catalog are tax-inclusive; the rate is used to split a gross
/// price back into its net and VAT parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Create a rate from percent points (e.g. `20` for 20% VAT).
    ///
    /// Values outside `0..=100` are clamped.
    #[must_use]
    pub fn from_percent(points: Decimal) -> Self {
        Self(points.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// The zero rate.
    #[must_use]
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Rate in percent points.
    #[must_use]
    pub fn percent_points(&self) -> Decimal {
        self.0
    }

    /// Divisor for deriving a net amount from a gross amount.
    fn divisor(&self) -> Decimal {
        Decimal::ONE + self.0 / Decimal::ONE_HUNDRED
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::zero()
    }
}

/// A gross price decomposed into its net and VAT parts.
///
/// `net` and `vat` are rounded independently, so their sum may differ from the
/// gross price by one minor unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBreakdown<'a> {
    /// Pre-tax amount.
    pub net: Money<'a, Currency>,

    /// VAT amount.
    pub vat: Money<'a, Currency>,
}

/// Derive the net (pre-tax) part of a tax-inclusive price.
#[must_use]
pub fn net_of<'a>(price: &Money<'a, Currency>, rate: TaxRate) -> Money<'a, Currency> {
    let minor = round_minor(net_minor_exact(price.to_minor_units(), rate));

    Money::from_minor(minor, price.currency())
}

/// Derive the VAT part of a tax-inclusive price.
#[must_use]
pub fn vat_of<'a>(price: &Money<'a, Currency>, rate: TaxRate) -> Money<'a, Currency> {
    let gross = Decimal::from(price.to_minor_units());
    let minor = round_minor(gross - net_minor_exact(price.to_minor_units(), rate));

    Money::from_minor(minor, price.currency())
}

/// Decompose a tax-inclusive price into net and VAT in one call.
#[must_use]
pub fn breakdown<'a>(price: &Money<'a, Currency>, rate: TaxRate) -> TaxBreakdown<'a> {
    TaxBreakdown {
        net: net_of(price, rate),
        vat: vat_of(price, rate),
    }
}

/// Reassemble a gross price from a net amount.
#[must_use]
pub fn gross_of<'a>(net: &Money<'a, Currency>, rate: TaxRate) -> Money<'a, Currency> {
    let exact = Decimal::from(net.to_minor_units()) * rate.divisor();

    Money::from_minor(round_minor(exact), net.currency())
}

/// Exact (unrounded) net minor units for a gross minor amount.
fn net_minor_exact(gross_minor: i64, rate: TaxRate) -> Decimal {
    Decimal::from(gross_minor) / rate.divisor()
}

/// Round a decimal minor amount half-away-from-zero to whole minor units.
fn round_minor(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}
