//! Cart
//!
//! The sale aggregate. A cart borrows one catalog and one currency for its
//! whole life, owns its lines, charges, coupons and promotions, and rebuilds
//! its derived money after every mutation: promotion shares are stripped and
//! replayed in application order, promotions whose guards no longer hold are
//! retracted, and coupons that no longer fit are dropped. Reads never mutate.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Catalog, ProductKey},
    discounts::{self, Coupon, DiscountError},
    lines::{self, LineItem, OPEN_ITEM_NAME, PromotionShare},
    modifiers::{self, ModifierError, Pick},
    promotions::{
        self, FreeItem, Promotion, PromotionError, PromotionKey, PromotionPlan, PromotionRule,
        Reward,
    },
    tax::TaxRate,
    validity::{PromotionValidity, ValidityContext},
};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not currently sellable.
    #[error("product {0} is out of stock")]
    OutOfStock(String),

    /// The product key does not resolve in the catalog.
    #[error("unknown product")]
    UnknownProduct,

    /// No line at the given index.
    #[error("no line at index {0}")]
    LineOutOfBounds(usize),

    /// The money being added is in a different currency to the cart.
    #[error("expected {expected}, got {found}")]
    CurrencyMismatch {
        /// ISO code the cart is priced in.
        expected: String,

        /// ISO code of the offending amount.
        found: String,
    },

    /// A price override on a line that is not open-priced.
    #[error("line is not open-priced")]
    NotOpenPriced,

    /// Lines always carry at least one unit.
    #[error("quantity must be at least one")]
    ZeroQuantity,

    /// Wrapped modifier selection error.
    #[error(transparent)]
    Modifier(#[from] ModifierError),

    /// Wrapped coupon discount error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped promotion error.
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A flat extra on the order: delivery, service, bag charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge<'a> {
    /// Display name.
    pub name: String,

    /// Tax-inclusive amount.
    pub total: Money<'a, Currency>,
}

/// Read-side totals snapshot. Derived on every call and safe to recompute:
/// two reads of the same cart are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals<'a> {
    /// Net goods total after promotion money comes off.
    pub sub_total: Money<'a, Currency>,

    /// VAT after promotion money comes off.
    pub vat_total: Money<'a, Currency>,

    /// Flat charges on the order.
    pub charge_total: Money<'a, Currency>,

    /// Coupon money off the order.
    pub discount_total: Money<'a, Currency>,

    /// VAT share of the coupon money.
    pub vat_discount_total: Money<'a, Currency>,

    /// Promotion money already netted into the lines.
    pub promotion_total: Money<'a, Currency>,

    /// What the customer pays.
    pub grand_total: Money<'a, Currency>,

    /// Units across all lines.
    pub total_qty: u32,

    /// Number of lines.
    pub total_items: usize,
}

/// Partial update to one line. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct LinePatch<'a> {
    /// New quantity.
    pub qty: Option<u32>,

    /// Give the whole line away, or take that back.
    pub is_free: Option<bool>,

    /// Mark the line's quantity as granted free, or take that back.
    pub is_qty_free: Option<bool>,

    /// Replace the unit price. Only open-priced lines accept this.
    pub price_override: Option<Money<'a, Currency>>,
}

/// The sale aggregate.
#[derive(Debug, Clone)]
pub struct CartAggregate<'a> {
    catalog: &'a Catalog<'a>,
    currency: &'a Currency,
    lines: Vec<LineItem<'a>>,
    charges: Vec<Charge<'a>>,
    coupons: Vec<Coupon<'a>>,
    promotions: Vec<Promotion<'a>>,
}

impl<'a> CartAggregate<'a> {
    /// An empty cart priced in `currency`, selling from `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog<'a>, currency: &'a Currency) -> Self {
        Self {
            catalog,
            currency,
            lines: Vec::new(),
            charges: Vec::new(),
            coupons: Vec::new(),
            promotions: Vec::new(),
        }
    }

    /// Currency the cart is priced in.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// The lines, in ring-up order with granted free lines at the tail.
    #[must_use]
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// One line by index.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&LineItem<'a>> {
        self.lines.get(index)
    }

    /// Flat charges on the order.
    #[must_use]
    pub fn charges(&self) -> &[Charge<'a>] {
        &self.charges
    }

    /// Coupons on the order, in application order.
    #[must_use]
    pub fn coupons(&self) -> &[Coupon<'a>] {
        &self.coupons
    }

    /// Promotions on the order, in application order.
    #[must_use]
    pub fn promotions(&self) -> &[Promotion<'a>] {
        &self.promotions
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ring up a catalog product with the given modifier picks.
    ///
    /// The product is priced and its modifiers resolved once, here; the line
    /// then merges into an existing one when identity allows, or appends.
    /// Returns the index of the line the quantity landed on.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] for a zero `qty`.
    /// - [`CartError::UnknownProduct`] when the key does not resolve.
    /// - [`CartError::OutOfStock`] for an inactive product.
    /// - [`CartError::CurrencyMismatch`] when the product is priced in a
    ///   different currency.
    /// - [`CartError::Modifier`] when the picks do not satisfy the product's
    ///   modifier groups.
    pub fn add_line(
        &mut self,
        product: ProductKey,
        picks: &[Pick],
        qty: u32,
    ) -> Result<usize, CartError> {
        if qty == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let details = self.catalog.product(product).ok_or(CartError::UnknownProduct)?;

        if !details.active {
            return Err(CartError::OutOfStock(details.sku.clone()));
        }

        self.check_currency(&details.price)?;

        let selection = modifiers::resolve(self.catalog, &details.groups, picks)?;
        let line = LineItem::priced(product, details, selection, qty)?;

        let index = lines::merge_or_append(&mut self.lines, line);

        self.rebuild();

        Ok(index)
    }

    /// Ring up an ad-hoc entry at an operator-entered price.
    ///
    /// Open lines never merge. Returns the new line's index.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] for a zero `qty`.
    /// - [`CartError::CurrencyMismatch`] when `price` is in a different
    ///   currency.
    pub fn add_open_line(
        &mut self,
        name: Option<String>,
        price: Money<'a, Currency>,
        tax: TaxRate,
        qty: u32,
    ) -> Result<usize, CartError> {
        if qty == 0 {
            return Err(CartError::ZeroQuantity);
        }

        self.check_currency(&price)?;

        let name = name.unwrap_or_else(|| OPEN_ITEM_NAME.to_string());
        let index = lines::merge_or_append(&mut self.lines, LineItem::open(name, price, tax, qty));

        self.rebuild();

        Ok(index)
    }

    /// Patch one line in place.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineOutOfBounds`] when the index does not resolve.
    /// - [`CartError::ZeroQuantity`] for a zero quantity patch.
    /// - [`CartError::NotOpenPriced`] for a price override on a catalog line.
    /// - [`CartError::CurrencyMismatch`] when the override is in a different
    ///   currency.
    pub fn update_line(&mut self, index: usize, patch: LinePatch<'a>) -> Result<(), CartError> {
        if let Some(price) = &patch.price_override {
            self.check_currency(price)?;
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineOutOfBounds(index))?;

        if let Some(qty) = patch.qty {
            if qty == 0 {
                return Err(CartError::ZeroQuantity);
            }

            line.qty = qty;
        }

        if let Some(price) = patch.price_override {
            if !line.open_price {
                return Err(CartError::NotOpenPriced);
            }

            let parts = crate::tax::breakdown(&price, line.tax);

            line.unit_total = price;
            line.unit_net = parts.net;
            line.unit_vat = parts.vat;
        }

        if let Some(is_free) = patch.is_free {
            line.is_free = is_free;
        }

        if let Some(is_qty_free) = patch.is_qty_free {
            line.is_qty_free = is_qty_free;
        }

        self.rebuild();

        Ok(())
    }

    /// Remove a batch of lines by index, atomically.
    ///
    /// Either every index resolves and all the lines go, or nothing changes.
    /// Duplicate indexes are tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineOutOfBounds`] naming the first bad index.
    pub fn remove_lines(&mut self, indexes: &[usize]) -> Result<(), CartError> {
        for &index in indexes {
            if index >= self.lines.len() {
                return Err(CartError::LineOutOfBounds(index));
            }
        }

        let mut order: SmallVec<[usize; 8]> = indexes.iter().copied().collect();
        order.sort_unstable_by(|a, b| b.cmp(a));
        order.dedup();

        for index in order {
            self.lines.remove(index);
        }

        self.rebuild();

        Ok(())
    }

    /// Add a flat charge to the order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] when the charge is in a
    /// different currency.
    pub fn add_charge(&mut self, charge: Charge<'a>) -> Result<(), CartError> {
        self.check_currency(&charge.total)?;
        self.charges.push(charge);

        Ok(())
    }

    /// Remove the first charge with this name, returning it.
    pub fn remove_charge(&mut self, name: &str) -> Option<Charge<'a>> {
        let index = self.charges.iter().position(|charge| charge.name == name)?;

        Some(self.charges.remove(index))
    }

    /// Apply a coupon to the order.
    ///
    /// Preconditions run in a fixed order against the current aggregate and
    /// the first failure wins; on failure the cart is untouched. Coupon money
    /// never lands on lines: it comes off the totals at read time.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::EmptyCart`] on a cart with no lines.
    /// - [`DiscountError::AlreadyApplied`] when the coupon is already on.
    /// - [`DiscountError::CapExceeded`] when cumulative coupon money would
    ///   reach 99% of the total.
    /// - [`DiscountError::ExceedsTotal`] when coupons would swallow the whole
    ///   total.
    pub fn apply_coupon(&mut self, coupon: Coupon<'a>) -> Result<(), CartError> {
        if self.lines.is_empty() {
            return Err(DiscountError::EmptyCart.into());
        }

        if self
            .coupons
            .iter()
            .any(|applied| applied.key == coupon.key || applied.code == coupon.code)
        {
            return Err(DiscountError::AlreadyApplied(coupon.code).into());
        }

        let base = self.inclusive_minor();
        let existing = self.coupon_minor(base)?;
        let amount = discounts::value_minor(&coupon.value, base)?;

        discounts::check_caps(&coupon.code, base, existing, amount)?;

        self.coupons.push(coupon);

        Ok(())
    }

    /// Remove a coupon by code, returning it.
    pub fn retract_coupon(&mut self, code: &str) -> Option<Coupon<'a>> {
        let index = self.coupons.iter().position(|coupon| coupon.code == code)?;

        Some(self.coupons.remove(index))
    }

    /// Apply a promotion to the order.
    ///
    /// Guards run in a fixed order and the first failure wins: already
    /// applied, the eligibility verdict from `validity`, then the promotion's
    /// own plan (zero-line check, its terms, the offer cap, the whole-cart
    /// ceiling). On success the promotion's money lands on the lines it
    /// touches and any free items are rung in at the tail.
    ///
    /// # Errors
    ///
    /// Any [`PromotionError`] from the guard chain. A failed ceiling check
    /// also sweeps out free lines this promotion granted earlier.
    pub fn apply_promotion(
        &mut self,
        promotion: Promotion<'a>,
        validity: &dyn PromotionValidity,
        context: &ValidityContext,
    ) -> Result<(), CartError> {
        if self
            .promotions
            .iter()
            .any(|applied| applied.key == promotion.key || applied.code == promotion.code)
        {
            return Err(PromotionError::AlreadyApplied(promotion.code).into());
        }

        let spend = Money::from_minor(self.inclusive_minor(), self.currency);

        if !validity.check(&promotion, context, &spend) {
            return Err(PromotionError::NotValid(promotion.code).into());
        }

        match promotions::plan(&promotion, self.catalog, &self.lines) {
            Ok(_) => {}
            Err(PromotionError::ExceedsTotal(code)) => {
                self.sweep_grants(&promotion);
                self.rebuild();

                return Err(PromotionError::ExceedsTotal(code).into());
            }
            Err(err) => return Err(err.into()),
        }

        // Surface grant failures here rather than letting the replay drop
        // the promotion silently.
        if let PromotionRule::Advance {
            reward: Reward::GetItems { items },
            ..
        } = &promotion.rule
        {
            for item in items {
                self.grant_line(promotion.key, *item)?;
            }
        }

        self.promotions.push(promotion);
        self.rebuild();

        Ok(())
    }

    /// Remove a promotion by code, returning it.
    ///
    /// Its shares are stripped from every line and any free lines it granted
    /// are removed.
    pub fn retract_promotion(&mut self, code: &str) -> Option<Promotion<'a>> {
        let index = self
            .promotions
            .iter()
            .position(|promotion| promotion.code == code)?;

        let removed = self.promotions.remove(index);

        self.rebuild();

        Some(removed)
    }

    /// Compute the read-side totals snapshot.
    ///
    /// Pure and idempotent: the cart is not modified and repeated calls give
    /// equal snapshots.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] when a coupon cannot be valued against the
    /// current totals.
    pub fn totals(&self) -> Result<Totals<'a>, CartError> {
        let mut sub_minor = 0_i64;
        let mut vat_minor = 0_i64;
        let mut promotion_minor = 0_i64;
        let mut total_qty = 0_u32;

        for line in &self.lines {
            let discounted = line.discounted_total().to_minor_units();
            let discounted_vat = line.discounted_vat().to_minor_units();

            sub_minor += discounted - discounted_vat;
            vat_minor += discounted_vat;
            promotion_minor += line.promotion_minor();
            total_qty = total_qty.saturating_add(line.qty());
        }

        let charge_minor: i64 = self
            .charges
            .iter()
            .map(|charge| charge.total.to_minor_units())
            .sum();

        let base = sub_minor + vat_minor;

        let mut discount_minor = 0_i64;
        let mut vat_discount_minor = 0_i64;

        for coupon in &self.coupons {
            let amount = discounts::value_minor(&coupon.value, base)?;

            discount_minor += amount;
            vat_discount_minor += discounts::vat_share_minor(amount, vat_minor, base);
        }

        let grand = base + charge_minor - discount_minor;

        Ok(Totals {
            sub_total: Money::from_minor(sub_minor, self.currency),
            vat_total: Money::from_minor(vat_minor, self.currency),
            charge_total: Money::from_minor(charge_minor, self.currency),
            discount_total: Money::from_minor(discount_minor, self.currency),
            vat_discount_total: Money::from_minor(vat_discount_minor, self.currency),
            promotion_total: Money::from_minor(promotion_minor, self.currency),
            grand_total: Money::from_minor(grand, self.currency),
            total_qty,
            total_items: self.lines.len(),
        })
    }

    /// Reject money that is not in the cart's currency.
    fn check_currency(&self, amount: &Money<'_, Currency>) -> Result<(), CartError> {
        if amount.currency() == self.currency {
            return Ok(());
        }

        Err(CartError::CurrencyMismatch {
            expected: self.currency.iso_alpha_code.to_string(),
            found: amount.currency().iso_alpha_code.to_string(),
        })
    }

    /// Tax-inclusive total of the lines after promotion money, in minor units.
    fn inclusive_minor(&self) -> i64 {
        self.lines
            .iter()
            .map(|line| line.discounted_total().to_minor_units())
            .sum()
    }

    /// Cumulative coupon money already on the cart, valued against `base`.
    fn coupon_minor(&self, base: i64) -> Result<i64, DiscountError> {
        let mut total = 0_i64;

        for coupon in &self.coupons {
            total += discounts::value_minor(&coupon.value, base)?;
        }

        Ok(total)
    }

    /// Build the free line a promotion grants.
    fn grant_line(
        &self,
        promotion: PromotionKey,
        item: FreeItem,
    ) -> Result<LineItem<'a>, CartError> {
        let details = self
            .catalog
            .product(item.product)
            .ok_or(CartError::UnknownProduct)?;

        let selection = modifiers::resolve(self.catalog, &details.groups, &[])?;
        let mut line = LineItem::priced(item.product, details, selection, item.qty)?;

        line.is_free = true;

        let worth = line.total_minor();

        line.promotions.push(PromotionShare {
            promotion,
            amount: worth,
        });

        Ok(line)
    }

    /// Drop free lines granted by this promotion.
    fn sweep_grants(&mut self, promotion: &Promotion<'a>) {
        let key = promotion.key;

        self.lines
            .retain(|line| !(line.is_free() && line.carries(key)));
    }

    /// Recompute everything derived after a mutation.
    ///
    /// Granted free lines are removed, every line's promotion shares are
    /// stripped, and the applied promotions replay in order against the fresh
    /// lines; a promotion whose guards no longer pass is retracted. Coupons
    /// that no longer fit the rebuilt totals are dropped last.
    fn rebuild(&mut self) {
        self.lines
            .retain(|line| !(line.is_free() && !line.promotions().is_empty()));

        for line in &mut self.lines {
            line.promotions.clear();
        }

        let applied = std::mem::take(&mut self.promotions);
        let mut kept = Vec::with_capacity(applied.len());

        for promotion in applied {
            let Ok(plan) = promotions::plan(&promotion, self.catalog, &self.lines) else {
                continue;
            };

            if self.commit_plan(&promotion, plan).is_ok() {
                kept.push(promotion);
            }
        }

        self.promotions = kept;
        self.settle_lines();
        self.revalidate_coupons();
    }

    /// Land a planned promotion on the lines.
    fn commit_plan(
        &mut self,
        promotion: &Promotion<'a>,
        plan: PromotionPlan,
    ) -> Result<(), CartError> {
        let mut granted: SmallVec<[LineItem<'a>; 2]> = SmallVec::new();

        for item in &plan.grants {
            granted.push(self.grant_line(promotion.key, *item)?);
        }

        for share in &plan.shares {
            let line = self
                .lines
                .get_mut(share.line)
                .ok_or(CartError::LineOutOfBounds(share.line))?;

            line.promotions.push(PromotionShare {
                promotion: promotion.key,
                amount: share.amount,
            });
        }

        self.lines.extend(granted);

        Ok(())
    }

    /// Derive each line's discounted amounts from its shares and flags.
    fn settle_lines(&mut self) {
        for line in &mut self.lines {
            if line.is_free || line.is_qty_free {
                line.discounted_total = Money::from_minor(0, self.currency);
                line.discounted_vat = Money::from_minor(0, self.currency);

                continue;
            }

            let total = line.total_minor();
            let vat = line.vat_minor();
            let off = line.promotion_minor().min(total);

            line.discounted_total = Money::from_minor(total - off, self.currency);
            line.discounted_vat = Money::from_minor(
                vat - discounts::vat_share_minor(off, vat, total),
                self.currency,
            );
        }
    }

    /// Re-run the coupon preconditions against the rebuilt totals, dropping
    /// coupons that no longer fit.
    fn revalidate_coupons(&mut self) {
        let applied = std::mem::take(&mut self.coupons);

        if self.lines.is_empty() {
            return;
        }

        let base = self.inclusive_minor();
        let mut existing = 0_i64;
        let mut kept = Vec::with_capacity(applied.len());

        for coupon in applied {
            let Ok(amount) = discounts::value_minor(&coupon.value, base) else {
                continue;
            };

            if discounts::check_caps(&coupon.code, base, existing, amount).is_ok() {
                existing += amount;
                kept.push(coupon);
            }
        }

        self.coupons = kept;
    }
}
