//! Checkout Summary Example
//!
//! Rings up a small cafe order from a fixture set, runs its promotions and
//! coupons, and prints the cart summary.
//!
//! Use `-f` to load a fixture set by name
//! Use `--fixtures` to point at a different fixture directory

use std::{io, io::Write, path::PathBuf, time::Instant};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};

use till::{
    fixtures::Fixture,
    modifiers::Pick,
    summary::CartSummary,
    validity::{AlwaysValid, ValidityContext},
};

/// Checkout Summary Example
#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Rings up a demo order and prints the summary", long_about = None)]
struct CheckoutArgs {
    /// Fixture set name
    #[arg(short, long, default_value = "cafe")]
    fixture: String,

    /// Base path for fixture files
    #[arg(long, default_value = "./fixtures")]
    fixtures: PathBuf,
}

/// Checkout Summary Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = CheckoutArgs::parse();

    let mut fixture = Fixture::with_base_path(&args.fixtures);

    fixture
        .load_catalog(&args.fixture)?
        .load_promotions(&args.fixture)?;

    let start = Instant::now();

    let mut cart = fixture.cart()?;

    cart.add_line(
        fixture.product_key("latte")?,
        &[
            Pick {
                group: fixture.group_key("milk")?,
                option: fixture.option_key("milk.oat")?,
            },
            Pick {
                group: fixture.group_key("syrups")?,
                option: fixture.option_key("syrups.vanilla")?,
            },
        ],
        1,
    )?;

    cart.add_line(fixture.product_key("americano")?, &[], 2)?;
    cart.add_line(fixture.product_key("croissant")?, &[], 1)?;
    cart.add_line(fixture.product_key("sandwich")?, &[], 1)?;

    let context = ValidityContext::default();

    for key in ["hot-drinks", "spend-big", "free-croissant"] {
        let promotion = fixture.promotion(key)?;

        if let Err(error) = cart.apply_promotion(promotion.clone(), &AlwaysValid, &context) {
            println!("skipping promotion {}: {error}", promotion.code);
        }
    }

    let today = Local::now().date_naive();

    for key in ["save10", "two-off"] {
        let coupon = fixture.coupon(key)?;

        if coupon.is_expired(today) {
            println!("coupon {} has expired", coupon.code);
            continue;
        }

        if let Err(error) = cart.apply_coupon(coupon.clone()) {
            println!("skipping coupon {}: {error}", coupon.code);
        }
    }

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    CartSummary::new(&cart).write_to(&mut handle)?;

    writeln!(
        handle,
        " priced in {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
