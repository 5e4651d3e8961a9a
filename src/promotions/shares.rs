//! Line shares
//!
//! Splitting a promotion's money across the lines it touches. Percent values
//! take the same slice of every line; amount values split evenly by line,
//! with any leftover minor units landing on the earliest lines.

use decimal_percentage::Percentage;
use smallvec::SmallVec;

use crate::discounts;

use super::PromotionError;

/// One line's slice of a promotion's discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineShare {
    /// Index of the line in the cart.
    pub line: usize,

    /// Minor units coming off that line.
    pub amount: i64,
}

/// Per-line shares for a percent discount: each line gives up the same
/// percentage of its remaining total.
///
/// # Errors
///
/// Returns a conversion error when the percentage cannot be taken of a line
/// total.
pub(crate) fn percent_shares(
    percent: &Percentage,
    eligible: &[(usize, i64)],
) -> Result<SmallVec<[LineShare; 4]>, PromotionError> {
    let mut shares: SmallVec<[LineShare; 4]> = SmallVec::new();

    for &(line, remaining) in eligible {
        let amount = discounts::percent_of_minor(percent, remaining)?;

        shares.push(LineShare { line, amount });
    }

    Ok(shares)
}

/// Per-line shares for a fixed amount: an even split by line count, leftover
/// minor units going to the earliest lines, each share clamped to what the
/// line still has.
pub(crate) fn amount_shares(
    amount_minor: i64,
    eligible: &[(usize, i64)],
) -> SmallVec<[LineShare; 4]> {
    let mut shares: SmallVec<[LineShare; 4]> = SmallVec::new();

    let count = i64::try_from(eligible.len()).unwrap_or(i64::MAX);

    if count == 0 || amount_minor <= 0 {
        return shares;
    }

    let base = amount_minor / count;
    let mut leftover = amount_minor % count;

    for &(line, remaining) in eligible {
        let mut amount = base;

        if leftover > 0 {
            amount += 1;
            leftover -= 1;
        }

        shares.push(LineShare {
            line,
            amount: amount.min(remaining),
        });
    }

    shares
}
