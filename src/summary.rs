//! Summary
//!
//! Renders a cart as a till-roll table: one block per line with its
//! modifiers, promotion money and payable total, followed by the totals.

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartAggregate, CartError, Totals},
    lines::LineItem,
};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Totals could not be computed for the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A renderable view over one cart.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'c, 'a> {
    cart: &'c CartAggregate<'a>,
}

impl<'c, 'a> CartSummary<'c, 'a> {
    /// View over `cart`.
    #[must_use]
    pub fn new(cart: &'c CartAggregate<'a>) -> Self {
        Self { cart }
    }

    /// Render the summary to a string.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] when totals cannot be computed.
    pub fn render(&self) -> Result<String, SummaryError> {
        let mut buffer = Vec::new();

        self.write_to(&mut buffer)?;

        String::from_utf8(buffer).map_err(|_err| SummaryError::IO)
    }

    /// Write the summary table and totals block.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] when totals cannot be computed or the
    /// writer fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let totals = self.cart.totals()?;

        let mut builder = Builder::default();
        let mut boundary_rows: SmallVec<[usize; 16]> = SmallVec::new();

        builder.push_record(["Qty", "Item", "Modifiers", "Price", "Off", "Total"]);

        for (index, line) in self.cart.lines().iter().enumerate() {
            boundary_rows.push(index + 1);
            builder.push_record(line_record(line, self.cart.currency()));
        }

        write_table(&mut out, builder, &boundary_rows)?;
        write_totals(&mut out, self.cart, &totals)?;

        Ok(())
    }
}

/// One table row for a line.
fn line_record(line: &LineItem<'_>, currency: &Currency) -> [String; 6] {
    let mut name = line.name().to_string();

    if line.is_free() {
        name.push_str(" (free)");
    } else if line.is_qty_free() {
        name.push_str(" (qty free)");
    }

    let modifiers = line
        .modifiers()
        .iter()
        .map(|modifier| {
            if modifier.total.is_zero() {
                modifier.name.clone()
            } else {
                format!("{} +{}", modifier.name, modifier.total)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let off_minor = line.total_minor() - line.discounted_total().to_minor_units();

    let off = if off_minor == 0 {
        String::new()
    } else {
        format!("-{}", Money::from_minor(off_minor, currency))
    };

    [
        line.qty().to_string(),
        name,
        modifiers,
        format!("{}", line.total()),
        off,
        format!("{}", line.discounted_total()),
    ]
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    boundary_rows: &[usize],
) -> Result<(), SummaryError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();

    for &row in boundary_rows {
        theme.insert_horizontal_line(row, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)
}

fn write_totals(
    out: &mut impl io::Write,
    cart: &CartAggregate<'_>,
    totals: &Totals<'_>,
) -> Result<(), SummaryError> {
    let mut rows: SmallVec<[(String, String); 8]> = SmallVec::new();

    rows.push((" Subtotal:".to_string(), format!("{}  ", totals.sub_total)));
    rows.push((" VAT:".to_string(), format!("{}  ", totals.vat_total)));

    if !cart.charges().is_empty() {
        rows.push((" Charges:".to_string(), format!("{}  ", totals.charge_total)));
    }

    if !totals.promotion_total.is_zero() {
        rows.push((
            " Promotions:".to_string(),
            format!("-{}  ", totals.promotion_total),
        ));
    }

    if !totals.discount_total.is_zero() {
        rows.push((
            " Discounts:".to_string(),
            format!("-{}  ", totals.discount_total),
        ));
    }

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", totals.grand_total),
    ));

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        write_totals_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| SummaryError::IO)
}

/// Writes one totals line with a right-aligned label and a fixed-width value
/// column.
fn write_totals_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), SummaryError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(out, "{:>label_pad$}{label}  {:>value_pad$}{value}", "", "")
        .map_err(|_err| SummaryError::IO)
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0_usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rustc_hash::FxHashSet;
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        catalog::{Catalog, Category, LineKind, Product, ProductKey, Unit},
        discounts::{Coupon, DiscountKey, DiscountValue},
        promotions::{OfferCap, Promotion, PromotionKey, PromotionRule, Target},
        tax::TaxRate,
        validity::{AlwaysValid, ValidityContext},
    };

    use super::*;

    fn shelf() -> (Catalog<'static>, ProductKey) {
        let mut catalog = Catalog::new();

        let drinks = catalog.insert_category(Category {
            name: "Drinks".to_string(),
        });

        let latte = catalog.insert_product(Product {
            sku: "latte".to_string(),
            name: "Latte".to_string(),
            price: Money::from_minor(299, GBP),
            tax: TaxRate::from_percent(Decimal::from(20)),
            category: Some(drinks),
            groups: SmallVec::new(),
            unit: Unit::PerItem,
            kind: LineKind::Item,
            open_price: false,
            active: true,
        });

        (catalog, latte)
    }

    #[test]
    fn renders_lines_and_totals() -> TestResult {
        let (catalog, latte) = shelf();
        let mut cart = CartAggregate::new(&catalog, GBP);

        cart.add_line(latte, &[], 2)?;

        let rendered = CartSummary::new(&cart).render()?;

        assert!(rendered.contains("Latte"));
        assert!(rendered.contains("£5.98"));
        assert!(rendered.contains("Subtotal:"));
        assert!(rendered.contains("Total:"));

        Ok(())
    }

    #[test]
    fn shows_promotion_money_coming_off() -> TestResult {
        let (catalog, latte) = shelf();
        let mut cart = CartAggregate::new(&catalog, GBP);

        cart.add_line(latte, &[], 1)?;

        let mut products = FxHashSet::default();
        products.insert(latte);

        let key = {
            let mut keys: SlotMap<PromotionKey, ()> = SlotMap::with_key();
            keys.insert(())
        };

        cart.apply_promotion(
            Promotion {
                key,
                code: "LATTE20".to_string(),
                discount: DiscountValue::Percent(Percentage::from(0.20)),
                rule: PromotionRule::Basic {
                    target: Target::Products(products),
                },
                offer: OfferCap::unlimited(),
            },
            &AlwaysValid,
            &ValidityContext::default(),
        )?;

        let rendered = CartSummary::new(&cart).render()?;

        assert!(rendered.contains("-£0.60"));
        assert!(rendered.contains("Promotions:"));

        Ok(())
    }

    #[test]
    fn shows_coupon_money_in_the_totals_block() -> TestResult {
        let (catalog, latte) = shelf();
        let mut cart = CartAggregate::new(&catalog, GBP);

        cart.add_line(latte, &[], 1)?;

        let key = {
            let mut keys: SlotMap<DiscountKey, ()> = SlotMap::with_key();
            keys.insert(())
        };

        cart.apply_coupon(Coupon {
            key,
            code: "SAVE10".to_string(),
            value: DiscountValue::Percent(Percentage::from(0.10)),
            expiry: None,
        })?;

        let rendered = CartSummary::new(&cart).render()?;

        assert!(rendered.contains("Discounts:"));
        assert!(rendered.contains("-£0.30"));

        Ok(())
    }

    #[test]
    fn an_empty_cart_still_renders() -> TestResult {
        let (catalog, _) = shelf();
        let cart = CartAggregate::new(&catalog, GBP);

        let rendered = CartSummary::new(&cart).render()?;

        assert!(rendered.contains("Qty"));
        assert!(rendered.contains("£0.00"));

        Ok(())
    }
}
