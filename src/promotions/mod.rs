//! Promotions
//!
//! Line-scoped promotional discounts. A promotion names what it reaches
//! (products, categories, or the whole cart), what the customer must do to
//! earn it, and what comes back: money off the qualifying lines or free items
//! rung into the cart. Planning is pure; the cart owns applying the plan.

pub mod offers;
pub mod shares;

use rustc_hash::FxHashSet;
use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CategoryKey, ProductKey},
    discounts::{DiscountError, DiscountValue},
    lines::LineItem,
};

pub use offers::OfferCap;
pub use shares::LineShare;

use shares::{amount_shares, percent_shares};

new_key_type! {
    /// Key for a promotion.
    pub struct PromotionKey;
}

/// Errors from planning or applying a promotion.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// The promotion is already on the cart.
    #[error("promotion {0} is already applied")]
    AlreadyApplied(String),

    /// The eligibility oracle turned the promotion down.
    #[error("promotion {0} is not valid for this sale")]
    NotValid(String),

    /// A line's share of the discount would wipe out that line.
    #[error("promotion {0} would zero out a line")]
    ZerosItem(String),

    /// The promotion has nothing to work on, or its own terms make no sense
    /// against this cart.
    #[error("promotion {0} is not applicable to this cart")]
    NotApplicable(String),

    /// The computed discount is over the offer's budget.
    #[error("promotion {0} exceeds its budget")]
    BudgetExceeded(String),

    /// The offer has no redemptions left.
    #[error("promotion {0} has no offers remaining")]
    OfferExhausted(String),

    /// The computed discount would swallow the whole cart.
    #[error("promotion {0} exceeds the cart total")]
    ExceedsTotal(String),

    /// Wrapped discount-valuation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Which lines a promotion reaches.
#[derive(Debug, Clone)]
pub enum Target {
    /// Specific catalog products.
    Products(FxHashSet<ProductKey>),

    /// Every product in one of these categories.
    Categories(FxHashSet<CategoryKey>),
}

impl Target {
    /// Whether a line falls inside the target.
    #[must_use]
    pub fn matches(&self, line: &LineItem<'_>) -> bool {
        match self {
            Self::Products(products) => line.product().is_some_and(|key| products.contains(&key)),
            Self::Categories(categories) => {
                line.category().is_some_and(|key| categories.contains(&key))
            }
        }
    }
}

/// What the customer must do to earn an advance promotion.
#[derive(Debug, Clone)]
pub enum Condition<'a> {
    /// Buy qualifying items, optionally narrowed to a target.
    BuysItems {
        /// Narrowing filter; `None` reaches every line.
        target: Option<Target>,
    },

    /// Spend at least this much across the sale.
    SpendsAmount {
        /// Minimum spend the sale must reach.
        amount: Money<'a, Currency>,
    },
}

/// A free item granted by a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeItem {
    /// Product to ring in free of charge.
    pub product: ProductKey,

    /// Units to grant.
    pub qty: u32,
}

/// What an advance promotion gives back.
#[derive(Debug, Clone)]
pub enum Reward {
    /// Money off the qualifying lines.
    SaveAmount,

    /// Free items rung into the cart.
    GetItems {
        /// Items granted, with quantities.
        items: SmallVec<[FreeItem; 2]>,
    },
}

/// How a promotion decides what it touches.
#[derive(Debug, Clone)]
pub enum PromotionRule<'a> {
    /// A straight discount on every line the target matches.
    Basic {
        /// Lines the discount reaches.
        target: Target,
    },

    /// Earn-and-reward: a condition the sale must meet, and the reward.
    Advance {
        /// What the customer must do.
        condition: Condition<'a>,

        /// What they get for it.
        reward: Reward,
    },
}

/// A promotion: a coded discount with a rule for what it touches and a cap on
/// how much it may still give away.
#[derive(Debug, Clone)]
pub struct Promotion<'a> {
    /// Key the cart tracks the promotion under.
    pub key: PromotionKey,

    /// Promotion code.
    pub code: String,

    /// Face value of the discount.
    pub discount: DiscountValue<'a>,

    /// What the promotion touches and how it is earned.
    pub rule: PromotionRule<'a>,

    /// Remaining headroom on the offer.
    pub offer: OfferCap<'a>,
}

/// What applying a promotion would do to the cart.
#[derive(Debug, Default)]
pub(crate) struct PromotionPlan {
    /// Money off existing lines.
    pub shares: SmallVec<[LineShare; 4]>,

    /// Free items to ring in.
    pub grants: SmallVec<[FreeItem; 2]>,

    /// Total value given away, shares plus grants, in minor units.
    pub total_minor: i64,
}

/// Plan a promotion against the current lines without touching them.
///
/// Guards run in a fixed order and the first failure wins: the zero-line
/// check (unscoped buy-and-save only), the promotion's own terms, the offer
/// cap, and finally the whole-cart ceiling.
///
/// # Errors
///
/// Any [`PromotionError`] from the guard chain; the lines are never modified.
pub(crate) fn plan(
    promotion: &Promotion<'_>,
    catalog: &Catalog<'_>,
    lines: &[LineItem<'_>],
) -> Result<PromotionPlan, PromotionError> {
    match &promotion.rule {
        PromotionRule::Basic { target } => plan_save(promotion, lines, Some(target), None),
        PromotionRule::Advance { condition, reward } => match reward {
            Reward::SaveAmount => {
                let scope = match condition {
                    Condition::BuysItems { target } => target.as_ref(),
                    Condition::SpendsAmount { .. } => None,
                };

                plan_save(promotion, lines, scope, Some(condition))
            }
            Reward::GetItems { items } => plan_grant(promotion, catalog, lines, condition, items),
        },
    }
}

/// Plan a money-off promotion across the lines in scope.
fn plan_save(
    promotion: &Promotion<'_>,
    lines: &[LineItem<'_>],
    scope: Option<&Target>,
    condition: Option<&Condition<'_>>,
) -> Result<PromotionPlan, PromotionError> {
    let code = &promotion.code;
    let eligible = eligible_lines(lines, scope);

    if eligible.is_empty() {
        return Err(PromotionError::NotApplicable(code.clone()));
    }

    let shares = match &promotion.discount {
        DiscountValue::Percent(percent) => percent_shares(percent, &eligible)?,
        DiscountValue::Amount(amount) => amount_shares(amount.to_minor_units(), &eligible),
    };

    let total_minor: i64 = shares.iter().map(|share| share.amount).sum();

    // An unscoped buy-and-save must not wipe any single line out.
    if let Some(Condition::BuysItems { target: None }) = condition {
        for (share, &(_, remaining)) in shares.iter().zip(&eligible) {
            if share.amount >= remaining {
                return Err(PromotionError::ZerosItem(code.clone()));
            }
        }
    }

    if let Some(Condition::SpendsAmount { amount }) = condition
        && amount.to_minor_units() <= total_minor
    {
        return Err(PromotionError::NotApplicable(code.clone()));
    }

    promotion.offer.check(code, total_minor)?;
    check_ceiling(code, total_minor, lines)?;

    Ok(PromotionPlan {
        shares,
        grants: SmallVec::new(),
        total_minor,
    })
}

/// Plan a free-items promotion: price the grants off the catalog.
fn plan_grant(
    promotion: &Promotion<'_>,
    catalog: &Catalog<'_>,
    lines: &[LineItem<'_>],
    condition: &Condition<'_>,
    items: &SmallVec<[FreeItem; 2]>,
) -> Result<PromotionPlan, PromotionError> {
    let code = &promotion.code;

    let scope = match condition {
        Condition::BuysItems { target } => target.as_ref(),
        Condition::SpendsAmount { .. } => None,
    };

    if eligible_lines(lines, scope).is_empty() {
        return Err(PromotionError::NotApplicable(code.clone()));
    }

    let mut total_minor = 0_i64;

    for item in items {
        let Some(product) = catalog.product(item.product) else {
            return Err(PromotionError::NotApplicable(code.clone()));
        };

        if !product.active {
            return Err(PromotionError::NotApplicable(code.clone()));
        }

        total_minor += product.price.to_minor_units() * i64::from(item.qty);
    }

    if let Condition::SpendsAmount { amount } = condition
        && amount.to_minor_units() <= total_minor
    {
        return Err(PromotionError::NotApplicable(code.clone()));
    }

    promotion.offer.check(code, total_minor)?;
    check_ceiling(code, total_minor, lines)?;

    Ok(PromotionPlan {
        shares: SmallVec::new(),
        grants: items.clone(),
        total_minor,
    })
}

/// Lines a money-off promotion may draw from: paid lines inside the scope
/// that still have something left, as `(index, remaining minor units)`.
fn eligible_lines(
    lines: &[LineItem<'_>],
    scope: Option<&Target>,
) -> SmallVec<[(usize, i64); 8]> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            if line.is_free() || line.is_qty_free() {
                return None;
            }

            if let Some(target) = scope
                && !target.matches(line)
            {
                return None;
            }

            let remaining = line.total_minor() - line.promotion_minor();

            (remaining > 0).then_some((index, remaining))
        })
        .collect()
}

/// The whole-cart ceiling: a promotion may never swallow everything left.
fn check_ceiling(
    code: &str,
    total_minor: i64,
    lines: &[LineItem<'_>],
) -> Result<(), PromotionError> {
    let sub_total: i64 = lines
        .iter()
        .map(|line| {
            if line.is_free() || line.is_qty_free() {
                0
            } else {
                (line.total_minor() - line.promotion_minor()).max(0)
            }
        })
        .sum();

    if total_minor >= sub_total {
        return Err(PromotionError::ExceedsTotal(code.to_string()));
    }

    Ok(())
}
