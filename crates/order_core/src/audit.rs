//! Basket summaries and rule audits.
//!
//! The selector never reports errors, so callers judge a basket after the
//! fact: `summarize_basket` for the cost window, `audit_basket` for hard-rule
//! breaches.

use std::collections::HashMap;

use serde::Serialize;

use crate::rules::{category_limits, item_limits};
use crate::{CostBounds, MenuItemId, Menus, OrderLine, RuleConfig, TargetId};

/// Slack for summing decimal prices.
const COST_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketSummary {
    pub total_cost: f64,
    pub line_count: usize,
    pub units: u32,
    /// `min <= total <= max`.
    pub within_window: bool,
    pub below_min: bool,
}

pub fn basket_total(lines: &[OrderLine]) -> f64 {
    lines
        .iter()
        .map(|line| line.price * f64::from(line.quantity))
        .sum()
}

pub fn summarize_basket(lines: &[OrderLine], bounds: &CostBounds) -> BasketSummary {
    let total_cost = basket_total(lines);
    let below_min = total_cost + COST_EPSILON < bounds.min;
    BasketSummary {
        total_cost,
        line_count: lines.len(),
        units: lines
            .iter()
            .fold(0, |units: u32, line| units.saturating_add(line.quantity)),
        within_window: !below_min && total_cost <= bounds.max + COST_EPSILON,
        below_min,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Violation {
    OverMax {
        total_cost: f64,
        max: f64,
    },
    ZeroQuantity {
        name: String,
    },
    UnknownItem {
        target_id: TargetId,
        menu_item_id: MenuItemId,
    },
    DisabledItem {
        target_id: TargetId,
        menu_item_id: MenuItemId,
    },
    ExcludedItem {
        target_id: TargetId,
        menu_item_id: MenuItemId,
    },
    ItemCapExceeded {
        target_id: TargetId,
        menu_item_id: MenuItemId,
        count: u32,
        cap: u32,
    },
    CategoryCapExceeded {
        target_id: TargetId,
        category: String,
        count: u32,
        cap: u32,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::OverMax { total_cost, max } => {
                write!(f, "total {total_cost:.2} exceeds max {max:.2}")
            }
            Violation::ZeroQuantity { name } => write!(f, "line '{name}' has quantity 0"),
            Violation::UnknownItem {
                target_id,
                menu_item_id,
            } => write!(f, "item {target_id}/{menu_item_id} is not on the menu"),
            Violation::DisabledItem {
                target_id,
                menu_item_id,
            } => write!(f, "item {target_id}/{menu_item_id} is disabled"),
            Violation::ExcludedItem {
                target_id,
                menu_item_id,
            } => write!(f, "item {target_id}/{menu_item_id} is excluded by the rules"),
            Violation::ItemCapExceeded {
                target_id,
                menu_item_id,
                count,
                cap,
            } => write!(
                f,
                "item {target_id}/{menu_item_id} selected {count} times, cap {cap}"
            ),
            Violation::CategoryCapExceeded {
                target_id,
                category,
                count,
                cap,
            } => write!(
                f,
                "category {target_id}/{category} selected {count} times, cap {cap}"
            ),
        }
    }
}

/// Checks a basket against the hard rules. Results are sorted by kind and
/// key so the output is stable across runs.
pub fn audit_basket(lines: &[OrderLine], menus: &Menus, rules: &RuleConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    let total_cost = basket_total(lines);
    if total_cost > rules.total_cost.max + COST_EPSILON {
        violations.push(Violation::OverMax {
            total_cost,
            max: rules.total_cost.max,
        });
    }

    let mut item_counts: HashMap<(&TargetId, &MenuItemId), u32> = HashMap::new();
    for line in lines {
        if line.quantity == 0 {
            violations.push(Violation::ZeroQuantity {
                name: line.name.clone(),
            });
        }
        let count = item_counts
            .entry((&line.target_id, &line.menu_item_id))
            .or_insert(0);
        *count = count.saturating_add(line.quantity);
    }

    let mut item_keys: Vec<_> = item_counts.keys().copied().collect();
    item_keys.sort();

    let mut category_counts: HashMap<(&TargetId, &str), (u32, Option<u32>)> = HashMap::new();
    for (target_id, menu_item_id) in item_keys {
        let count = item_counts[&(target_id, menu_item_id)];
        let Some(item) = menus
            .get(target_id)
            .and_then(|items| items.iter().find(|item| item.id == *menu_item_id))
        else {
            violations.push(Violation::UnknownItem {
                target_id: target_id.clone(),
                menu_item_id: menu_item_id.clone(),
            });
            continue;
        };
        if !item.enabled {
            violations.push(Violation::DisabledItem {
                target_id: target_id.clone(),
                menu_item_id: menu_item_id.clone(),
            });
        }

        let limits = item_limits(rules, item);
        let category = category_limits(rules, item);
        if count > 0 && (limits.excluded() || category.excluded()) {
            violations.push(Violation::ExcludedItem {
                target_id: target_id.clone(),
                menu_item_id: menu_item_id.clone(),
            });
        }
        if let Some(cap) = limits.max.filter(|cap| count > *cap) {
            violations.push(Violation::ItemCapExceeded {
                target_id: target_id.clone(),
                menu_item_id: menu_item_id.clone(),
                count,
                cap,
            });
        }

        let entry = category_counts
            .entry((target_id, item.category.as_str()))
            .or_insert((0, category.max));
        entry.0 = entry.0.saturating_add(count);
    }

    let mut category_keys: Vec<_> = category_counts.keys().copied().collect();
    category_keys.sort();
    for (target_id, category) in category_keys {
        let (count, cap) = category_counts[&(target_id, category)];
        if let Some(cap) = cap.filter(|cap| count > *cap) {
            violations.push(Violation::CategoryCapExceeded {
                target_id: target_id.clone(),
                category: category.to_string(),
                count,
                cap,
            });
        }
    }

    violations
}
