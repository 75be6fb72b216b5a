use order_core::{
    audit_basket, build_basket, summarize_basket, BasketSummary, Menus, RuleConfig, Selection,
    SelectionOptions, Violation,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

pub struct SeedResult {
    pub seed: u64,
    pub selection: Selection,
    pub summary: BasketSummary,
    pub violations: Vec<Violation>,
    pub wall_time_us: u64,
}

/// Builds one basket for `seed` and audits it against the hard rules.
pub fn run_seed(
    menus: &Menus,
    rules: &RuleConfig,
    options: &SelectionOptions,
    seed: u64,
) -> SeedResult {
    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let selection = build_basket(menus, rules, options, &mut rng);

    #[allow(clippy::cast_possible_truncation)]
    let wall_time_us = start.elapsed().as_micros() as u64;

    let summary = summarize_basket(&selection.lines, &rules.total_cost);
    let violations = audit_basket(&selection.lines, menus, rules);
    SeedResult {
        seed,
        selection,
        summary,
        violations,
        wall_time_us,
    }
}
