//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartAggregate, CartError, Charge, LinePatch, Totals},
    catalog::{
        Catalog, Category, CategoryKey, GroupKey, LineKind, ModifierGroup, ModifierOption,
        OptionKey, Product, ProductKey, Unit,
    },
    discounts::{Coupon, DiscountError, DiscountKey, DiscountValue},
    fixtures::{Fixture, FixtureError},
    lines::{LineItem, PromotionShare},
    modifiers::{ModifierError, Pick, SelectedModifier},
    promotions::{
        Condition, FreeItem, OfferCap, Promotion, PromotionError, PromotionKey, PromotionRule,
        Reward, Target,
    },
    summary::{CartSummary, SummaryError},
    tax::{TaxBreakdown, TaxRate},
    validity::{AlwaysValid, PromotionValidity, ValidityContext},
};
