//! The three selection phases. Each reads the catalog, mutates the state in
//! place and reports whether it committed anything.
//!
//! In incremental mode every phase returns right after its first commit.

use rand::Rng;

use crate::pool::{Catalog, Pool};
use crate::state::SelectionState;
use crate::{CostBounds, StepKind};

/// How a weighted-fill pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FillOutcome {
    /// Nothing was eligible to begin with.
    NoCandidates,
    /// Stopped after the first commit (incremental mode).
    Added,
    /// Reached `mid`.
    Reached,
    /// Ran out of candidates below `mid`.
    Exhausted,
}

/// Whether a drawn pool entry goes back into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Draw {
    /// Item pools repeat an index once per missing unit.
    Consume,
    /// Category pools list each item once; `keep` ends the loop.
    Replace,
}

/// Draws uniformly from `pool` until it empties or the total passes `mid`.
/// After each commit `keep` re-filters the pool.
#[allow(clippy::too_many_arguments)]
fn drain(
    catalog: &Catalog<'_>,
    bounds: &CostBounds,
    state: &mut SelectionState,
    pool: &mut Pool,
    (kind, draw): (StepKind, Draw),
    incremental: bool,
    rng: &mut impl Rng,
    keep: impl Fn(&SelectionState, usize) -> bool,
) -> bool {
    pool.retain(|&index| keep(&*state, index));
    while !pool.is_empty() && state.total_cost <= bounds.mid {
        let slot = rng.gen_range(0..pool.len());
        let index = match draw {
            Draw::Consume => pool.remove(slot),
            Draw::Replace => pool[slot],
        };
        state.commit(catalog.get(index), kind, rng);
        if incremental {
            return true;
        }
        pool.retain(|&index| keep(&*state, index));
    }
    false
}

/// Phase 1: items with a minimum count. Items whose category also needs units
/// go first since each pick then serves both requirements.
pub(crate) fn required_items(
    catalog: &Catalog<'_>,
    bounds: &CostBounds,
    state: &mut SelectionState,
    incremental: bool,
    rng: &mut impl Rng,
) -> bool {
    let (mut synergistic, mut rest) = catalog.required_item_pools(state, bounds.max);
    let keep = |state: &SelectionState, index: usize| {
        let candidate = catalog.get(index);
        state.fits(candidate, bounds.max) && state.item_shortfall(candidate) > 0
    };
    for pool in [&mut synergistic, &mut rest] {
        if drain(
            catalog,
            bounds,
            state,
            pool,
            (StepKind::MinItem, Draw::Consume),
            incremental,
            rng,
            keep,
        ) {
            return true;
        }
    }
    false
}

/// Phase 2: categories still under their minimum after phase 1. An item may
/// be drawn again until its category's minimum is met.
pub(crate) fn required_categories(
    catalog: &Catalog<'_>,
    bounds: &CostBounds,
    state: &mut SelectionState,
    incremental: bool,
    rng: &mut impl Rng,
) -> bool {
    let mut pool = catalog.required_category_pool(state, bounds.max);
    drain(
        catalog,
        bounds,
        state,
        &mut pool,
        (StepKind::MinCategory, Draw::Replace),
        incremental,
        rng,
        |state, index| {
            let candidate = catalog.get(index);
            state.fits(candidate, bounds.max) && state.category_shortfall(candidate) > 0
        },
    )
}

/// Phase 3: weighted random fill. Always commits once if anything is
/// eligible, then continues while the total stays below `mid`.
pub(crate) fn weighted_fill(
    catalog: &Catalog<'_>,
    bounds: &CostBounds,
    state: &mut SelectionState,
    incremental: bool,
    rng: &mut impl Rng,
) -> FillOutcome {
    let mut pool = catalog.weighted_pool(state, bounds.max);
    if pool.is_empty() {
        return FillOutcome::NoCandidates;
    }
    loop {
        let index = pool[rng.gen_range(0..pool.len())];
        state.commit(catalog.get(index), StepKind::Regular, rng);
        if incremental {
            return FillOutcome::Added;
        }
        pool.retain(|&index| state.fits(catalog.get(index), bounds.max));
        if pool.is_empty() {
            return FillOutcome::Exhausted;
        }
        if state.total_cost >= bounds.mid {
            return FillOutcome::Reached;
        }
    }
}
