//! Rule resolution: turns optional per-target item/category rules into
//! concrete weights and count limits.

use crate::{ItemRule, MenuItem, RuleConfig, TargetRules};

/// A rule with its defaults applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub weight: f64,
    /// Units that must be selected before weighted fill. Never above `max`.
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl Limits {
    pub const UNBOUNDED: Limits = Limits {
        weight: 1.0,
        min: 0,
        max: None,
    };

    /// When `maxItems < minItems` the cap wins and the minimum shrinks to it.
    pub fn from_rule(rule: Option<&ItemRule>) -> Self {
        let Some(rule) = rule else {
            return Self::UNBOUNDED;
        };
        let max = rule.max_items;
        let requested_min = rule.min_items.unwrap_or(0);
        let min = max.map_or(requested_min, |cap| requested_min.min(cap));
        Self {
            weight: rule.weight,
            min,
            max,
        }
    }

    /// Weight 0 (or below) and a zero cap both blacklist.
    pub fn excluded(&self) -> bool {
        self.weight <= 0.0 || self.max == Some(0)
    }

    /// True while one more unit stays within the cap.
    pub fn has_room(&self, count: u32) -> bool {
        self.max.is_none_or(|cap| count < cap)
    }

    pub fn shortfall(&self, count: u32) -> u32 {
        self.min.saturating_sub(count)
    }
}

fn target_rules<'r>(rules: &'r RuleConfig, item: &MenuItem) -> Option<&'r TargetRules> {
    rules.targets_data.get(&item.target_id)
}

pub fn item_limits(rules: &RuleConfig, item: &MenuItem) -> Limits {
    Limits::from_rule(target_rules(rules, item).and_then(|t| t.items.get(&item.id)))
}

pub fn category_limits(rules: &RuleConfig, item: &MenuItem) -> Limits {
    Limits::from_rule(target_rules(rules, item).and_then(|t| t.categories.get(&item.category)))
}

/// Largest rule weight a loaded rule file may carry.
pub const MAX_WEIGHT: f64 = 1_000.0;

/// Pool slots a single item can take, whatever its weight product.
pub const MAX_POOL_SLOTS: usize = 1_000;

/// Number of pool slots an item gets during weighted fill.
/// Any positive weight product rounds up to at least one slot; products past
/// `MAX_POOL_SLOTS` (infinity included) get exactly that many.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pool_slots(item: &Limits, category: &Limits) -> usize {
    let product = category.weight * item.weight;
    if product.is_nan() || product <= 0.0 {
        0
    } else if product >= MAX_POOL_SLOTS as f64 {
        MAX_POOL_SLOTS
    } else {
        product.ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(weight: f64, min_items: Option<u32>, max_items: Option<u32>) -> ItemRule {
        ItemRule {
            weight,
            min_items,
            max_items,
        }
    }

    #[test]
    fn missing_rule_is_unbounded_weight_one() {
        let limits = Limits::from_rule(None);
        assert_eq!(limits, Limits::UNBOUNDED);
        assert!(!limits.excluded());
        assert!(limits.has_room(u32::MAX - 1));
    }

    #[test]
    fn zero_weight_or_zero_cap_excludes() {
        assert!(Limits::from_rule(Some(&rule(0.0, None, None))).excluded());
        assert!(Limits::from_rule(Some(&rule(2.0, None, Some(0)))).excluded());
        assert!(!Limits::from_rule(Some(&rule(0.1, None, Some(1)))).excluded());
    }

    #[test]
    fn cap_below_minimum_wins() {
        let limits = Limits::from_rule(Some(&rule(1.0, Some(5), Some(2))));
        assert_eq!(limits.max, Some(2));
        assert_eq!(limits.min, 2);
        assert_eq!(limits.shortfall(1), 1);
        assert!(!limits.has_room(2));
    }

    #[test]
    fn minimum_without_cap_is_kept() {
        let limits = Limits::from_rule(Some(&rule(1.0, Some(3), None)));
        assert_eq!(limits.min, 3);
        assert_eq!(limits.shortfall(0), 3);
        assert_eq!(limits.shortfall(4), 0);
    }

    #[test]
    fn pool_slots_round_up() {
        let item = Limits::from_rule(Some(&rule(0.2, None, None)));
        let category = Limits::from_rule(Some(&rule(1.5, None, None)));
        assert_eq!(pool_slots(&item, &category), 1);

        let heavy = Limits::from_rule(Some(&rule(2.5, None, None)));
        assert_eq!(pool_slots(&heavy, &category), 4);
        assert_eq!(pool_slots(&heavy, &Limits::UNBOUNDED), 3);
    }

    #[test]
    fn pool_slots_zero_for_zero_weight() {
        let item = Limits::from_rule(Some(&rule(0.0, None, None)));
        assert_eq!(pool_slots(&item, &Limits::UNBOUNDED), 0);
    }

    #[test]
    fn pool_slots_are_capped_for_huge_weights() {
        let huge = Limits::from_rule(Some(&rule(1e300, None, None)));
        assert_eq!(pool_slots(&huge, &Limits::UNBOUNDED), MAX_POOL_SLOTS);
        // 1e300 * 1e300 overflows to infinity.
        assert_eq!(pool_slots(&huge, &huge), MAX_POOL_SLOTS);

        let nan = Limits::from_rule(Some(&rule(f64::NAN, None, None)));
        assert_eq!(pool_slots(&nan, &Limits::UNBOUNDED), 0);
    }
}
