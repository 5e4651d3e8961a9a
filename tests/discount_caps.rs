//! Order-level coupons and the caps that keep them honest.
//!
//! Coupons never touch lines: each one is valued against the full
//! tax-inclusive goods total at read time, so two stacked coupons are worth
//! the sum of their independent values. The cumulative cap rejects any
//! application that would push coupon money to 99% of that total or beyond,
//! and a rebuilt cart silently sheds coupons it can no longer fund.

use chrono::NaiveDate;
use decimal_percentage::Percentage;
use rusty_money::{Money, iso::GBP};
use slotmap::SlotMap;
use testresult::TestResult;

use till::{
    cart::CartError,
    discounts::{Coupon, DiscountError, DiscountKey, DiscountValue},
    fixtures::Fixture,
};

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
fn stacked_coupons_each_value_against_the_full_base() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    // Beans are £11.50 gross. SAVE10 is worth £1.15 and TWOOFF a flat
    // £2.00; neither shrinks the base the other sees.
    cart.add_line(fixture.product_key("beans")?, &[], 1)?;
    cart.apply_coupon(fixture.coupon("save10")?.clone())?;
    cart.apply_coupon(fixture.coupon("two-off")?.clone())?;

    let totals = cart.totals()?;

    assert_eq!(totals.discount_total, Money::from_minor(315, GBP));
    assert_eq!(totals.vat_discount_total, Money::from_minor(41, GBP));
    assert_eq!(totals.grand_total, Money::from_minor(835, GBP));

    Ok(())
}

#[test]
fn the_cumulative_cap_blocks_the_second_deep_coupon() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    cart.add_line(fixture.product_key("beans")?, &[], 1)?;
    cart.apply_coupon(coupon(
        "STAFF90",
        DiscountValue::Percent(Percentage::from(0.90)),
    ))?;

    assert_eq!(cart.totals()?.grand_total, Money::from_minor(115, GBP));

    // Another 10% would take the order to a full 100% off.
    let result = cart.apply_coupon(fixture.coupon("save10")?.clone());

    assert!(matches!(
        result,
        Err(CartError::Discount(DiscountError::CapExceeded(code))) if code == "SAVE10"
    ));
    assert_eq!(cart.coupons().len(), 1);
    assert_eq!(cart.totals()?.grand_total, Money::from_minor(115, GBP));

    Ok(())
}

#[test]
fn an_outsized_amount_coupon_bounces_without_landing() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    cart.add_line(fixture.product_key("beans")?, &[], 1)?;

    let result = cart.apply_coupon(coupon(
        "MEGA",
        DiscountValue::Amount(Money::from_minor(2000, GBP)),
    ));

    assert!(matches!(
        result,
        Err(CartError::Discount(DiscountError::CapExceeded(_)))
    ));
    assert!(cart.coupons().is_empty());
    assert_eq!(cart.totals()?.grand_total, Money::from_minor(1150, GBP));

    Ok(())
}

#[test]
fn expiry_is_data_for_the_till_to_enforce() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    cart.add_line(fixture.product_key("beans")?, &[], 1)?;

    // TWOOFF expired at the end of January; the cart does not care.
    let two_off = fixture.coupon("two-off")?;
    let last_day = NaiveDate::from_ymd_opt(2027, 1, 31).ok_or("bad date")?;
    let day_after = NaiveDate::from_ymd_opt(2027, 2, 1).ok_or("bad date")?;

    assert!(!two_off.is_expired(last_day));
    assert!(two_off.is_expired(day_after));

    cart.apply_coupon(two_off.clone())?;

    assert_eq!(cart.totals()?.grand_total, Money::from_minor(950, GBP));

    Ok(())
}

#[test]
fn a_shrunken_cart_sheds_the_coupon_it_cannot_fund() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    // £11.50 of beans and a £4.50 sandwich fund a £12.00 coupon.
    cart.add_line(fixture.product_key("beans")?, &[], 1)?;
    cart.add_line(fixture.product_key("sandwich")?, &[], 1)?;
    cart.apply_coupon(coupon(
        "TWELVE",
        DiscountValue::Amount(Money::from_minor(1200, GBP)),
    ))?;

    assert_eq!(cart.totals()?.grand_total, Money::from_minor(400, GBP));

    // The beans alone cannot.
    cart.remove_lines(&[1])?;

    assert!(cart.coupons().is_empty());

    let totals = cart.totals()?;

    assert_eq!(totals.discount_total, Money::from_minor(0, GBP));
    assert_eq!(totals.grand_total, Money::from_minor(1150, GBP));

    Ok(())
}

#[test]
fn a_retracted_coupon_can_come_back() -> TestResult {
    let fixture = Fixture::from_set("cafe")?;
    let mut cart = fixture.cart()?;

    cart.add_line(fixture.product_key("beans")?, &[], 1)?;
    cart.apply_coupon(fixture.coupon("save10")?.clone())?;

    let returned = cart.retract_coupon("SAVE10").ok_or("coupon not returned")?;

    assert_eq!(returned.code, "SAVE10");
    assert_eq!(cart.totals()?.grand_total, Money::from_minor(1150, GBP));

    cart.apply_coupon(returned)?;

    assert_eq!(cart.totals()?.grand_total, Money::from_minor(1035, GBP));

    Ok(())
}
