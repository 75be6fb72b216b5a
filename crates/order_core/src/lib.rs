//! `order_core`: constrained weighted random order selection.
//!
//! No IO. All randomness via the passed-in Rng, so a seeded Rng reproduces
//! a basket exactly.

mod audit;
mod engine;
mod phases;
mod pool;
pub mod rules;
mod state;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use audit::{audit_basket, basket_total, summarize_basket, BasketSummary, Violation};
pub use engine::{add_one_item, build_basket, select};
pub use types::*;

#[cfg(test)]
mod tests;
