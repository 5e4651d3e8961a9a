//! Coupon and Promotion Fixtures

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for coupons and promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Map of coupon key -> coupon fixture
    #[serde(default)]
    pub coupons: FxHashMap<String, CouponFixture>,

    /// Map of promotion key -> promotion fixture
    #[serde(default)]
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Redemption code
    pub code: String,

    /// Face value
    pub discount: DiscountFixture,

    /// Last redeemable day
    pub expires: Option<NaiveDate>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Promotion code
    pub code: String,

    /// Face value
    pub discount: DiscountFixture,

    /// What the promotion touches
    pub rule: RuleFixture,

    /// Redemption cap (defaults to unlimited)
    pub offer: Option<OfferFixture>,
}

/// Discount face value from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percentage off (e.g. "10%" or "0.10")
    Percentage {
        /// Percentage string
        value: String,
    },

    /// Fixed amount off (e.g. "2.50 GBP")
    Amount {
        /// Price string
        value: String,
    },
}

/// Promotion rule from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleFixture {
    /// Straight discount on the named products
    TargetProducts {
        /// Product keys
        products: Vec<String>,
    },

    /// Straight discount on everything in the named categories
    TargetCategories {
        /// Category keys
        categories: Vec<String>,
    },

    /// Earn-and-reward promotion
    Advance {
        /// What the customer must do
        condition: ConditionFixture,

        /// What they get for it
        reward: RewardFixture,
    },
}

/// Advance promotion condition from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionFixture {
    /// Buy qualifying items; give products or categories, not both
    BuysTheFollowingItems {
        /// Product keys narrowing the qualifying lines
        #[serde(default)]
        products: Vec<String>,

        /// Category keys narrowing the qualifying lines
        #[serde(default)]
        categories: Vec<String>,
    },

    /// Spend at least this much across the sale
    SpendsTheFollowingAmount {
        /// Minimum spend price string (e.g. "15.00 GBP")
        amount: String,
    },
}

/// Advance promotion reward from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardFixture {
    /// Money off the qualifying lines
    SaveCertainAmount,

    /// Free items rung into the cart
    GetTheFollowingItems {
        /// Items granted
        items: Vec<FreeItemFixture>,
    },
}

/// Free item granted by a promotion, from YAML
#[derive(Debug, Deserialize)]
pub struct FreeItemFixture {
    /// Product key
    pub product: String,

    /// Units to grant (defaults to 1)
    pub qty: Option<u32>,
}

/// Redemption cap from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferFixture {
    /// No cap
    Unlimited,

    /// Stop once the money given away would pass a limit
    Budget {
        /// Budget price string (e.g. "100.00 GBP")
        limit: String,
    },

    /// Stop after a number of redemptions
    Offers {
        /// Redemptions left
        remaining: u32,
    },
}
