//! Offer caps
//!
//! How much a promotion may still give away. The cart consults the cap before
//! applying and surfaces the matching error; redemption book-keeping lives
//! with whoever issued the promotion, so nothing here ever decrements.

use rusty_money::{Money, iso::Currency};

use super::PromotionError;

/// Remaining headroom on a promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferCap<'a> {
    /// No limit; the promotion can always be given.
    Unlimited,

    /// A single application's discount may not exceed this amount.
    Budget {
        /// Largest discount one application may reach.
        limit: Money<'a, Currency>,
    },

    /// A countdown of redemptions.
    Offers {
        /// Redemptions left on the offer.
        remaining: u32,
    },
}

impl<'a> OfferCap<'a> {
    /// Cap that never limits anything.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self::Unlimited
    }

    /// Cap limiting a single application's discount to `limit`.
    #[must_use]
    pub const fn budget(limit: Money<'a, Currency>) -> Self {
        Self::Budget { limit }
    }

    /// Cap allowing `remaining` more redemptions.
    #[must_use]
    pub const fn offers(remaining: u32) -> Self {
        Self::Offers { remaining }
    }

    /// Whether the cap constrains anything at all.
    #[must_use]
    pub const fn has_constraints(&self) -> bool {
        !matches!(self, Self::Unlimited)
    }

    /// Check a computed discount against the cap.
    ///
    /// # Errors
    ///
    /// - [`PromotionError::BudgetExceeded`] when a budget cap is smaller than
    ///   the discount.
    /// - [`PromotionError::OfferExhausted`] when no redemptions remain.
    pub fn check(&self, code: &str, discount_minor: i64) -> Result<(), PromotionError> {
        match self {
            Self::Unlimited => Ok(()),
            Self::Budget { limit } => {
                if discount_minor > limit.to_minor_units() {
                    return Err(PromotionError::BudgetExceeded(code.to_string()));
                }

                Ok(())
            }
            Self::Offers { remaining } => {
                if *remaining == 0 {
                    return Err(PromotionError::OfferExhausted(code.to_string()));
                }

                Ok(())
            }
        }
    }
}
