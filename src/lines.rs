//! Lines
//!
//! Cart lines: priced snapshots of catalog products (or ad-hoc open entries),
//! the modifiers folded into their unit price, and the promotion money already
//! taken off them. Identity rules decide when an added product merges into an
//! existing line instead of appending a new one.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;

use crate::{
    catalog::{CategoryKey, GroupKey, LineKind, OptionKey, Product, ProductKey, Unit},
    modifiers::SelectedModifier,
    promotions::PromotionKey,
    tax::{self, TaxRate},
};

/// Display name reserved for ad-hoc entries. Lines carrying it never merge.
pub const OPEN_ITEM_NAME: &str = "Open Item";

/// Money a single promotion has taken off a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionShare {
    /// The promotion the share belongs to.
    pub promotion: PromotionKey,

    /// Amount taken off the line, in minor units of the cart currency.
    pub amount: i64,
}

/// A single cart line: one product (or open entry) at a quantity, with its
/// resolved modifiers folded into the unit price.
///
/// Unit net and VAT are decomposed from the tax-inclusive unit price, each
/// component rounded half-away-from-zero on its own, so `net + vat` may sit a
/// minor unit away from the gross. Discounted amounts are owned by the cart's
/// recompute pass and always derivable from the promotion shares.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    pub(crate) sku: String,
    pub(crate) product: Option<ProductKey>,
    pub(crate) category: Option<CategoryKey>,
    pub(crate) name: String,
    pub(crate) unit: Unit,
    pub(crate) kind: LineKind,
    pub(crate) qty: u32,
    pub(crate) tax: TaxRate,
    pub(crate) unit_total: Money<'a, Currency>,
    pub(crate) unit_net: Money<'a, Currency>,
    pub(crate) unit_vat: Money<'a, Currency>,
    pub(crate) modifiers: SmallVec<[SelectedModifier<'a>; 4]>,
    pub(crate) is_free: bool,
    pub(crate) is_qty_free: bool,
    pub(crate) open_price: bool,
    pub(crate) discounted_total: Money<'a, Currency>,
    pub(crate) discounted_vat: Money<'a, Currency>,
    pub(crate) promotions: SmallVec<[PromotionShare; 2]>,
}

impl<'a> LineItem<'a> {
    /// Price a catalog product into a line, folding the resolved modifier
    /// selection into the unit amounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] when a modifier's price is in a different
    /// currency to the product's.
    pub(crate) fn priced(
        key: ProductKey,
        product: &Product<'a>,
        selection: SmallVec<[SelectedModifier<'a>; 4]>,
        qty: u32,
    ) -> Result<Self, MoneyError> {
        let base = tax::breakdown(&product.price, product.tax);

        let mut unit_total = product.price;
        let mut unit_net = base.net;
        let mut unit_vat = base.vat;

        for modifier in &selection {
            unit_total = unit_total.add(modifier.total)?;
            unit_net = unit_net.add(modifier.net)?;
            unit_vat = unit_vat.add(modifier.vat)?;
        }

        let units = i64::from(qty);
        let currency = unit_total.currency();

        Ok(Self {
            sku: product.sku.clone(),
            product: Some(key),
            category: product.category,
            name: product.name.clone(),
            unit: product.unit.clone(),
            kind: product.kind,
            qty,
            tax: product.tax,
            unit_total,
            unit_net,
            unit_vat,
            modifiers: selection,
            is_free: false,
            is_qty_free: false,
            open_price: product.open_price,
            discounted_total: Money::from_minor(unit_total.to_minor_units() * units, currency),
            discounted_vat: Money::from_minor(unit_vat.to_minor_units() * units, currency),
            promotions: SmallVec::new(),
        })
    }

    /// Build an ad-hoc line at an operator-entered price.
    pub(crate) fn open(
        name: String,
        price: Money<'a, Currency>,
        tax: TaxRate,
        qty: u32,
    ) -> Self {
        let parts = tax::breakdown(&price, tax);
        let units = i64::from(qty);
        let currency = price.currency();

        Self {
            sku: name.clone(),
            product: None,
            category: None,
            name,
            unit: Unit::PerItem,
            kind: LineKind::Item,
            qty,
            tax,
            unit_total: price,
            unit_net: parts.net,
            unit_vat: parts.vat,
            modifiers: SmallVec::new(),
            is_free: false,
            is_qty_free: false,
            open_price: true,
            discounted_total: Money::from_minor(price.to_minor_units() * units, currency),
            discounted_vat: Money::from_minor(parts.vat.to_minor_units() * units, currency),
            promotions: SmallVec::new(),
        }
    }

    /// Stock-keeping unit the line was added under.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Catalog product the line snapshots, if it came from the catalog.
    #[must_use]
    pub fn product(&self) -> Option<ProductKey> {
        self.product
    }

    /// Category the product belonged to when the line was added.
    #[must_use]
    pub fn category(&self) -> Option<CategoryKey> {
        self.category
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selling unit.
    #[must_use]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Packaging kind.
    #[must_use]
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Units on the line.
    #[must_use]
    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// Tax rate the unit amounts were decomposed with.
    #[must_use]
    pub fn tax(&self) -> TaxRate {
        self.tax
    }

    /// Tax-inclusive unit price, modifiers folded in.
    #[must_use]
    pub fn unit_total(&self) -> &Money<'a, Currency> {
        &self.unit_total
    }

    /// Pre-tax unit price, modifiers folded in.
    #[must_use]
    pub fn unit_net(&self) -> &Money<'a, Currency> {
        &self.unit_net
    }

    /// VAT per unit, modifiers folded in.
    #[must_use]
    pub fn unit_vat(&self) -> &Money<'a, Currency> {
        &self.unit_vat
    }

    /// Priced modifier selection on the line.
    #[must_use]
    pub fn modifiers(&self) -> &[SelectedModifier<'a>] {
        &self.modifiers
    }

    /// Whether the whole line is given away.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.is_free
    }

    /// Whether the line's quantity was granted free of charge.
    #[must_use]
    pub fn is_qty_free(&self) -> bool {
        self.is_qty_free
    }

    /// Whether the price was entered at the till rather than read from the
    /// catalog.
    #[must_use]
    pub fn open_price(&self) -> bool {
        self.open_price
    }

    /// Promotion money already taken off the line.
    #[must_use]
    pub fn promotions(&self) -> &[PromotionShare] {
        &self.promotions
    }

    /// Tax-inclusive line total before any promotion money comes off.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.scaled(&self.unit_total)
    }

    /// Pre-tax line total before any promotion money comes off.
    #[must_use]
    pub fn net_total(&self) -> Money<'a, Currency> {
        self.scaled(&self.unit_net)
    }

    /// Line VAT before any promotion money comes off.
    #[must_use]
    pub fn vat_total(&self) -> Money<'a, Currency> {
        self.scaled(&self.unit_vat)
    }

    /// Tax-inclusive line total after promotion money comes off. Zero for
    /// free lines.
    #[must_use]
    pub fn discounted_total(&self) -> &Money<'a, Currency> {
        &self.discounted_total
    }

    /// Line VAT after promotion money comes off, reduced in proportion to the
    /// discount. Zero for free lines.
    #[must_use]
    pub fn discounted_vat(&self) -> &Money<'a, Currency> {
        &self.discounted_vat
    }

    /// Tax-inclusive line total in minor units.
    #[must_use]
    pub fn total_minor(&self) -> i64 {
        self.unit_total.to_minor_units() * i64::from(self.qty)
    }

    /// Line VAT in minor units.
    #[must_use]
    pub fn vat_minor(&self) -> i64 {
        self.unit_vat.to_minor_units() * i64::from(self.qty)
    }

    /// Minor units already taken off the line by promotions.
    #[must_use]
    pub fn promotion_minor(&self) -> i64 {
        self.promotions.iter().map(|share| share.amount).sum()
    }

    /// Whether a promotion has already left a share on this line.
    #[must_use]
    pub fn carries(&self, promotion: PromotionKey) -> bool {
        self.promotions
            .iter()
            .any(|share| share.promotion == promotion)
    }

    /// Whether the line sits outside normal identity rules.
    ///
    /// Ad-hoc entries, measured-unit lines and open-priced lines are rung up
    /// individually and never merge.
    #[must_use]
    pub fn is_special(&self) -> bool {
        self.name == OPEN_ITEM_NAME || !matches!(self.unit, Unit::PerItem) || self.open_price
    }

    /// Modifier selection as an order-insensitive signature.
    #[must_use]
    pub fn modifier_signature(&self) -> SmallVec<[(GroupKey, OptionKey); 4]> {
        let mut signature: SmallVec<[(GroupKey, OptionKey); 4]> = self
            .modifiers
            .iter()
            .map(|modifier| (modifier.group, modifier.option))
            .collect();

        signature.sort_unstable();
        signature
    }

    /// Whether an incoming line folds into this one.
    ///
    /// Identity is the SKU plus the modifier selection as a multiset; free
    /// lines and special lines always stand alone.
    #[must_use]
    pub fn merges_with(&self, other: &LineItem<'a>) -> bool {
        if self.is_special() || other.is_special() {
            return false;
        }

        if self.is_free || self.is_qty_free || other.is_free || other.is_qty_free {
            return false;
        }

        self.sku == other.sku && self.modifier_signature() == other.modifier_signature()
    }

    /// Scale a unit amount by the line quantity.
    fn scaled(&self, unit: &Money<'a, Currency>) -> Money<'a, Currency> {
        Money::from_minor(
            unit.to_minor_units() * i64::from(self.qty),
            unit.currency(),
        )
    }
}

/// Fold a line into an existing match or append it, returning its index.
pub(crate) fn merge_or_append<'a>(lines: &mut Vec<LineItem<'a>>, line: LineItem<'a>) -> usize {
    let merged = lines
        .iter_mut()
        .enumerate()
        .find(|(_, existing)| existing.merges_with(&line));

    if let Some((index, existing)) = merged {
        existing.qty = existing.qty.saturating_add(line.qty);
        existing.discounted_total = existing.total();
        existing.discounted_vat = existing.vat_total();
        index
    } else {
        lines.push(line);
        lines.len() - 1
    }
}
