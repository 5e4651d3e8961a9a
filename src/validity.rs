//! Validity
//!
//! The seam between the cart and whatever decides promotion eligibility.
//! Schedule windows, customer lists, company and location scoping and
//! minimum-spend rules all live on the far side of this trait; the cart only
//! ever sees the verdict.

use chrono::NaiveDate;
use rusty_money::{Money, iso::Currency};

use crate::promotions::Promotion;

/// Facts about the sale an eligibility check may consult.
#[derive(Debug, Clone, Default)]
pub struct ValidityContext {
    /// Customer identifier, when the sale is attached to one.
    pub customer: Option<String>,

    /// Trading company.
    pub company: Option<String>,

    /// Store or till location.
    pub location: Option<String>,

    /// Date to evaluate schedules against.
    pub today: Option<NaiveDate>,
}

/// Decides whether a promotion may apply to a sale at all.
pub trait PromotionValidity {
    /// Whether `promotion` is eligible for this sale at the given spend.
    fn check(
        &self,
        promotion: &Promotion<'_>,
        context: &ValidityContext,
        spend: &Money<'_, Currency>,
    ) -> bool;
}

/// Accepts every promotion. The default when nothing external is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValid;

impl PromotionValidity for AlwaysValid {
    fn check(
        &self,
        _promotion: &Promotion<'_>,
        _context: &ValidityContext,
        _spend: &Money<'_, Currency>,
    ) -> bool {
        true
    }
}
