use rand::Rng;

use crate::phases::{required_categories, required_items, weighted_fill, FillOutcome};
use crate::pool::Catalog;
use crate::state::SelectionState;
use crate::{
    FailedAttempt, Menus, OrderLine, RuleConfig, Selection, SelectionOptions, Strategy,
};

/// Build a basket, or extend `existing` by one unit when it is given.
///
/// Never fails: an empty, unchanged or under-priced basket is how the
/// engine reports that nothing better was possible.
pub fn select(
    menus: &Menus,
    rules: &RuleConfig,
    existing: Option<&[OrderLine]>,
    rng: &mut impl Rng,
) -> Vec<OrderLine> {
    match existing {
        Some(lines) => add_one_item(menus, rules, lines, rng).lines,
        None => build_basket(menus, rules, &SelectionOptions::default(), rng).lines,
    }
}

/// Build a basket from scratch.
///
/// Order of operations (constrained strategy):
/// 1. Commit required items, category-synergistic ones first.
/// 2. Commit items of categories still under their minimum.
/// 3. Weighted fill until `mid`. If the pool runs dry below `min`, roll back
///    to the state after step 2 and try again, up to `max_attempts` times,
///    then keep the most expensive attempt.
pub fn build_basket(
    menus: &Menus,
    rules: &RuleConfig,
    options: &SelectionOptions,
    rng: &mut impl Rng,
) -> Selection {
    let catalog = Catalog::build(menus, rules);
    let bounds = &rules.total_cost;

    let mut base = SelectionState::default();
    let attempts_allowed = match options.strategy {
        Strategy::Constrained => {
            required_items(&catalog, bounds, &mut base, false, rng);
            required_categories(&catalog, bounds, &mut base, false, rng);
            options.max_attempts.max(1)
        }
        Strategy::SinglePass => 1,
    };

    let mut failed: Vec<SelectionState> = Vec::new();
    for _ in 0..attempts_allowed {
        let mut attempt = base.clone();
        let outcome = weighted_fill(&catalog, bounds, &mut attempt, false, rng);
        if outcome == FillOutcome::Exhausted && attempt.total_cost < bounds.min {
            failed.push(attempt);
            continue;
        }
        return finish(attempt, &failed, &catalog);
    }

    let summaries: Vec<FailedAttempt> = failed.iter().map(attempt_summary).collect();
    // Earliest attempt wins ties.
    let best = failed
        .into_iter()
        .reduce(|best, next| {
            if next.total_cost > best.total_cost {
                next
            } else {
                best
            }
        })
        .unwrap_or(base);
    into_selection(best, summaries, &catalog)
}

/// Extend `existing` by exactly one unit, reusing the same pools and phases
/// so the addition honors the rules. Returns `existing` unchanged when no
/// legal addition exists.
pub fn add_one_item(
    menus: &Menus,
    rules: &RuleConfig,
    existing: &[OrderLine],
    rng: &mut impl Rng,
) -> Selection {
    let catalog = Catalog::build(menus, rules);
    let bounds = &rules.total_cost;
    let mut state = SelectionState::seeded(existing, menus);

    let added = required_items(&catalog, bounds, &mut state, true, rng)
        || required_categories(&catalog, bounds, &mut state, true, rng)
        || weighted_fill(&catalog, bounds, &mut state, true, rng) == FillOutcome::Added;

    if !added {
        return Selection {
            lines: existing.to_vec(),
            total_cost: state.total_cost,
            steps: Vec::new(),
            failed_attempts: Vec::new(),
            skipped_targets: catalog.skipped_targets,
        };
    }
    into_selection(state, Vec::new(), &catalog)
}

fn finish(state: SelectionState, failed: &[SelectionState], catalog: &Catalog<'_>) -> Selection {
    into_selection(state, failed.iter().map(attempt_summary).collect(), catalog)
}

fn attempt_summary(state: &SelectionState) -> FailedAttempt {
    FailedAttempt {
        total_cost: state.total_cost,
        units: state.units,
    }
}

fn into_selection(
    state: SelectionState,
    failed_attempts: Vec<FailedAttempt>,
    catalog: &Catalog<'_>,
) -> Selection {
    Selection {
        lines: state.lines,
        total_cost: state.total_cost,
        steps: state.steps,
        failed_attempts,
        skipped_targets: catalog.skipped_targets.clone(),
    }
}
