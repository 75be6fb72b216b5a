use super::*;
use crate::test_fixtures::{
    canteen, food_and_drink, item, line_for, make_rng, menus_of, rule, rules_for,
    set_category_rule, set_item_rule,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod incremental;

// --- Shared test helpers ------------------------------------------------

fn fresh(menus: &Menus, rules: &RuleConfig, seed: u64) -> Selection {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    build_basket(menus, rules, &SelectionOptions::default(), &mut rng)
}

fn quantity_of(lines: &[OrderLine], item_id: &str) -> u32 {
    lines
        .iter()
        .filter(|line| line.menu_item_id.0 == item_id)
        .map(|line| line.quantity)
        .sum()
}

fn assert_clean(selection: &Selection, menus: &Menus, rules: &RuleConfig) {
    let violations = audit_basket(&selection.lines, menus, rules);
    assert!(violations.is_empty(), "rule violations: {violations:?}");
    assert!(
        (basket_total(&selection.lines) - selection.total_cost).abs() < 1e-6,
        "reported total {} disagrees with lines",
        selection.total_cost
    );
}
