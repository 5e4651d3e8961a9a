//! Till
//!
//! Till is a pricing, discount and promotion engine for retail point-of-sale carts.
//! It decomposes tax-inclusive prices, resolves product modifier selections against
//! per-group cardinality rules, merges cart lines by identity, and layers coupon
//! discounts and marketing promotions on top while enforcing business caps.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod lines;
pub mod modifiers;
pub mod prelude;
pub mod promotions;
pub mod summary;
pub mod tax;
pub mod validity;
