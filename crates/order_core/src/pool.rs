//! Candidate catalog and per-phase pool construction.
//!
//! A pool is a list of catalog indices; weighting is expressed by repeating
//! an index, so every draw is uniform over the pool.

use std::collections::HashSet;

use crate::rules::{category_limits, item_limits, pool_slots, Limits};
use crate::state::SelectionState;
use crate::{MenuItem, Menus, RuleConfig, TargetId};

/// A selectable menu item with its resolved rules.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub item: &'a MenuItem,
    pub limits: Limits,
    pub category: Limits,
}

pub(crate) type Pool = Vec<usize>;

/// Every enabled, non-excluded item of the selected targets, in target order
/// then menu order.
#[derive(Debug)]
pub(crate) struct Catalog<'a> {
    pub candidates: Vec<Candidate<'a>>,
    pub skipped_targets: Vec<TargetId>,
}

impl<'a> Catalog<'a> {
    pub fn build(menus: &'a Menus, rules: &RuleConfig) -> Self {
        let mut candidates = Vec::new();
        let mut skipped_targets = Vec::new();
        let mut seen: HashSet<&TargetId> = HashSet::new();

        for target_id in &rules.select_from_targets {
            if !seen.insert(target_id) {
                continue;
            }
            let Some(items) = menus.get(target_id) else {
                skipped_targets.push(target_id.clone());
                continue;
            };
            for item in items {
                // Items filed under another target belong to that target's rules.
                if !item.enabled || item.target_id != *target_id {
                    continue;
                }
                let limits = item_limits(rules, item);
                let category = category_limits(rules, item);
                if limits.excluded() || category.excluded() {
                    continue;
                }
                candidates.push(Candidate {
                    item,
                    limits,
                    category,
                });
            }
        }

        Self {
            candidates,
            skipped_targets,
        }
    }

    pub fn get(&self, index: usize) -> &Candidate<'a> {
        &self.candidates[index]
    }

    fn fitting<'s>(
        &'s self,
        state: &'s SelectionState,
        max_cost: f64,
    ) -> impl Iterator<Item = (usize, &'s Candidate<'a>)> + 's {
        self.candidates
            .iter()
            .enumerate()
            .filter(move |(_, candidate)| state.fits(candidate, max_cost))
    }

    /// Required items, each repeated by its remaining need, split into items
    /// whose category also still needs units and the rest.
    pub fn required_item_pools(&self, state: &SelectionState, max_cost: f64) -> (Pool, Pool) {
        let mut synergistic = Pool::new();
        let mut rest = Pool::new();
        for (index, candidate) in self.fitting(state, max_cost) {
            let needed = state.item_shortfall(candidate) as usize;
            if needed == 0 {
                continue;
            }
            let group = if state.category_shortfall(candidate) > 0 {
                &mut synergistic
            } else {
                &mut rest
            };
            group.extend(std::iter::repeat_n(index, needed));
        }
        (synergistic, rest)
    }

    /// One entry per item of a category still under its minimum.
    pub fn required_category_pool(&self, state: &SelectionState, max_cost: f64) -> Pool {
        self.fitting(state, max_cost)
            .filter(|(_, candidate)| state.category_shortfall(candidate) > 0)
            .map(|(index, _)| index)
            .collect()
    }

    /// Every fitting item repeated `ceil(category weight * item weight)` times.
    pub fn weighted_pool(&self, state: &SelectionState, max_cost: f64) -> Pool {
        let mut pool = Pool::new();
        for (index, candidate) in self.fitting(state, max_cost) {
            let slots = pool_slots(&candidate.limits, &candidate.category);
            pool.extend(std::iter::repeat_n(index, slots));
        }
        pool
    }
}
