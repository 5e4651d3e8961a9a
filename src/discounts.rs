//! Discounts
//!
//! Coupon discounts taken off the whole order. Coupons never touch lines:
//! their money comes off the cart's read-side totals, recomputed from the
//! current aggregate every time, so removing a coupon is nothing more than
//! forgetting it.

use chrono::NaiveDate;
use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Key for a coupon discount.
    pub struct DiscountKey;
}

/// Errors from applying or valuing a coupon.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// The cart has no lines to discount.
    #[error("cannot apply a discount to an empty cart")]
    EmptyCart,

    /// The coupon is already on the cart.
    #[error("discount {0} is already applied")]
    AlreadyApplied(String),

    /// Applying the coupon would push the cumulative discount to 99% of the
    /// total or beyond.
    #[error("discount {0} would exceed the cumulative discount cap")]
    CapExceeded(String),

    /// The coupon is worth more than what is left to pay.
    #[error("discount {0} exceeds the remaining total")]
    ExceedsTotal(String),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The face value of a coupon or promotion.
#[derive(Debug, Copy, Clone)]
pub enum DiscountValue<'a> {
    /// Take a percentage off (e.g. "10% off").
    Percent(Percentage),

    /// Take a fixed amount off (e.g. "£2 off").
    Amount(Money<'a, Currency>),
}

/// A redeemable coupon: a coded face value with an optional expiry date.
///
/// Expiry is data only; enforcement belongs to whoever hands the coupon to
/// the cart.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    /// Key the cart tracks the coupon under.
    pub key: DiscountKey,

    /// Redemption code as entered at the till.
    pub code: String,

    /// Face value.
    pub value: DiscountValue<'a>,

    /// Last day the coupon can be redeemed, if it expires at all.
    pub expiry: Option<NaiveDate>,
}

impl Coupon<'_> {
    /// Whether the coupon can no longer be redeemed on `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry.is_some_and(|last_day| today > last_day)
    }
}

/// A percentage of a minor-unit amount, rounded half-away-from-zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] when the multiplication
/// overflows or the result does not fit back into an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    // Percentage keeps its Decimal private; multiplying by one gets it out.
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Value a discount against a tax-inclusive base amount, in minor units.
///
/// Percent values scale with the base; amount values are worth their face
/// value regardless of it.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] when a percent value cannot
/// be computed against the base.
pub fn value_minor(value: &DiscountValue<'_>, base_minor: i64) -> Result<i64, DiscountError> {
    match value {
        DiscountValue::Percent(percent) => percent_of_minor(percent, base_minor),
        DiscountValue::Amount(amount) => Ok(amount.to_minor_units()),
    }
}

/// VAT share of a discount: the discount scaled by the VAT-to-gross ratio of
/// what it came off.
#[must_use]
pub fn vat_share_minor(discount_minor: i64, vat_minor: i64, gross_minor: i64) -> i64 {
    if gross_minor == 0 {
        return 0;
    }

    let share =
        Decimal::from(discount_minor) * Decimal::from(vat_minor) / Decimal::from(gross_minor);

    share
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Enforce the cumulative-discount caps, in precedence order.
///
/// The cumulative cap fires when existing discounts plus the candidate reach
/// 99% of the base; the remaining-total check fires when they swallow the
/// base outright. The first dominates in practice but both are kept distinct,
/// in this order.
pub(crate) fn check_caps(
    code: &str,
    base_minor: i64,
    existing_minor: i64,
    amt_minor: i64,
) -> Result<(), DiscountError> {
    let cumulative = existing_minor + amt_minor;

    if cumulative * 100 >= base_minor * 99 {
        return Err(DiscountError::CapExceeded(code.to_string()));
    }

    if base_minor <= cumulative {
        return Err(DiscountError::ExceedsTotal(code.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    fn coupon(code: &str, value: DiscountValue<'static>) -> Coupon<'static> {
        let mut keys: SlotMap<DiscountKey, ()> = SlotMap::with_key();

        Coupon {
            key: keys.insert(()),
            code: code.to_string(),
            value,
            expiry: None,
        }
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(0.10);

        // 10% of 11.50 is 1.15 exactly.
        assert_eq!(percent_of_minor(&percent, 1150)?, 115);

        // 10% of 1.25 is 0.125, which rounds up to 0.13.
        assert_eq!(percent_of_minor(&percent, 125)?, 13);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_is_an_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn value_minor_scales_percent_but_not_amount() -> TestResult {
        let percent = DiscountValue::Percent(Percentage::from(0.10));
        let amount = DiscountValue::Amount(Money::from_minor(200, GBP));

        assert_eq!(value_minor(&percent, 1150)?, 115);
        assert_eq!(value_minor(&amount, 1150)?, 200);

        Ok(())
    }

    #[test]
    fn vat_share_follows_the_vat_to_gross_ratio() {
        // 1.15 off a cart of 11.50 carrying 1.50 VAT: share is 0.15.
        assert_eq!(vat_share_minor(115, 150, 1150), 15);

        assert_eq!(vat_share_minor(115, 150, 0), 0);
    }

    #[test]
    fn cumulative_cap_fires_at_ninety_nine_percent() {
        let result = check_caps("SAVE99", 1000, 500, 490);

        assert!(matches!(result, Err(DiscountError::CapExceeded(code)) if code == "SAVE99"));
    }

    #[test]
    fn cap_dominates_the_remaining_total_check() {
        // Worth more than the whole cart, but the cumulative cap is hit first.
        let result = check_caps("BIG", 1000, 0, 1500);

        assert!(matches!(result, Err(DiscountError::CapExceeded(_))));
    }

    #[test]
    fn caps_admit_a_modest_discount() -> TestResult {
        check_caps("SAVE10", 1000, 0, 100)?;

        Ok(())
    }

    #[test]
    fn expiry_is_inclusive_of_the_last_day() -> TestResult {
        let mut dated = coupon("SUMMER", DiscountValue::Percent(Percentage::from(0.10)));
        dated.expiry = NaiveDate::from_ymd_opt(2026, 6, 30);

        let last_day = NaiveDate::from_ymd_opt(2026, 6, 30).ok_or("bad date")?;
        let day_after = NaiveDate::from_ymd_opt(2026, 7, 1).ok_or("bad date")?;

        assert!(!dated.is_expired(last_day));
        assert!(dated.is_expired(day_after));

        let undated = coupon("EVERGREEN", DiscountValue::Percent(Percentage::from(0.10)));

        assert!(!undated.is_expired(day_after));

        Ok(())
    }
}
