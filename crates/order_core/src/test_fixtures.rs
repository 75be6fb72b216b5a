//! Shared test fixtures for order_core and downstream crates.
//!
//! `food_and_drink()` is the two-item menu used throughout the docs.
//! `canteen()` is a two-target menu with several categories for broader
//! property checks.

use crate::{
    CostBounds, ItemRule, MenuItem, MenuItemId, Menus, OrderLine, RuleConfig, TargetId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// An enabled item whose display name equals its id.
pub fn item(target: &str, id: &str, category: &str, price: f64) -> MenuItem {
    MenuItem {
        id: MenuItemId::from(id),
        target_id: TargetId::from(target),
        name: id.to_string(),
        category: category.to_string(),
        price,
        enabled: true,
    }
}

/// Groups items by their target, keeping the given order.
pub fn menus_of(items: Vec<MenuItem>) -> Menus {
    let mut menus: Menus = HashMap::new();
    for item in items {
        menus.entry(item.target_id.clone()).or_default().push(item);
    }
    menus
}

pub fn rule(weight: f64, min_items: Option<u32>, max_items: Option<u32>) -> ItemRule {
    ItemRule {
        weight,
        min_items,
        max_items,
    }
}

/// Rules with cost bounds and no per-item or per-category entries.
pub fn rules_for(targets: &[&str], min: f64, mid: f64, max: f64) -> RuleConfig {
    RuleConfig {
        total_cost: CostBounds { min, mid, max },
        select_from_targets: targets.iter().map(|t| TargetId::from(*t)).collect(),
        targets_data: HashMap::new(),
    }
}

pub fn set_item_rule(rules: &mut RuleConfig, target: &str, item_id: &str, item_rule: ItemRule) {
    rules
        .targets_data
        .entry(TargetId::from(target))
        .or_default()
        .items
        .insert(MenuItemId::from(item_id), item_rule);
}

pub fn set_category_rule(
    rules: &mut RuleConfig,
    target: &str,
    category: &str,
    category_rule: ItemRule,
) {
    rules
        .targets_data
        .entry(TargetId::from(target))
        .or_default()
        .categories
        .insert(category.to_string(), category_rule);
}

/// A line as a caller would hold it, `quantity` units of `item`.
pub fn line_for(item: &MenuItem, quantity: u32) -> OrderLine {
    OrderLine {
        id: format!("line_{}", item.id),
        name: item.name.clone(),
        price: item.price,
        quantity,
        target_id: item.target_id.clone(),
        menu_item_id: item.id.clone(),
    }
}

/// Target "A": x (Food, 100) and y (Drink, 50); cost window 140..=200, mid 150.
pub fn food_and_drink() -> (Menus, RuleConfig) {
    let menus = menus_of(vec![
        item("A", "x", "Food", 100.0),
        item("A", "y", "Drink", 50.0),
    ]);
    (menus, rules_for(&["A"], 140.0, 150.0, 200.0))
}

/// Two targets with mains, sides, drinks and desserts.
///
/// Rules: one main required at the canteen, at most one dessert, the
/// espresso blacklisted, cold drinks weighted up, cost window 18..=30.
pub fn canteen() -> (Menus, RuleConfig) {
    let mut soldout = item("canteen", "lasagne", "Mains", 9.5);
    soldout.enabled = false;
    let menus = menus_of(vec![
        item("canteen", "schnitzel", "Mains", 11.0),
        item("canteen", "curry", "Mains", 9.0),
        soldout,
        item("canteen", "fries", "Sides", 3.5),
        item("canteen", "salad", "Sides", 4.0),
        item("canteen", "cola", "Drinks", 2.5),
        item("canteen", "espresso", "Drinks", 2.0),
        item("bakery", "pretzel", "Bread", 1.5),
        item("bakery", "roll", "Bread", 0.8),
        item("bakery", "cheesecake", "Desserts", 3.2),
        item("bakery", "brownie", "Desserts", 2.9),
    ]);
    let mut rules = rules_for(&["canteen", "bakery"], 18.0, 22.0, 30.0);
    set_category_rule(&mut rules, "canteen", "Mains", rule(1.0, Some(1), Some(2)));
    set_category_rule(&mut rules, "canteen", "Drinks", rule(2.0, None, None));
    set_item_rule(&mut rules, "canteen", "espresso", rule(0.0, None, None));
    set_category_rule(&mut rules, "bakery", "Desserts", rule(1.0, None, Some(1)));
    (menus, rules)
}

/// Target "A": a (60) and b (70) under a 130 ceiling with a minimum of 1000.
/// Every weighted fill runs dry below `min`.
pub fn unreachable_minimum() -> (Menus, RuleConfig) {
    let menus = menus_of(vec![
        item("A", "a", "Food", 60.0),
        item("A", "b", "Food", 70.0),
    ]);
    (menus, rules_for(&["A"], 1000.0, 1000.0, 130.0))
}
