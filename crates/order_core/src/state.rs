use ahash::AHashMap;
use rand::Rng;

use crate::pool::Candidate;
use crate::{MenuItem, MenuItemId, Menus, OrderLine, SelectionStep, StepKind, TargetId};

/// Mutable bookkeeping for one selector run.
///
/// Cloned to snapshot the basket before weighted fill so a failed attempt
/// can be rolled back.
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionState {
    pub total_cost: f64,
    pub units: u32,
    /// Identity is the display name: two items sharing a name share a line.
    pub lines: Vec<OrderLine>,
    pub item_counts: AHashMap<TargetId, AHashMap<MenuItemId, u32>>,
    pub category_counts: AHashMap<TargetId, AHashMap<String, u32>>,
    pub steps: Vec<SelectionStep>,
}

impl SelectionState {
    /// Hydrates from a basket built elsewhere. Counters saturate at `u32::MAX`. Categories come from the
    /// referenced menu item; lines whose item is no longer on the menu still
    /// count toward cost and their own item cap.
    pub fn seeded(existing: &[OrderLine], menus: &Menus) -> Self {
        let mut state = Self::default();
        for line in existing.iter().filter(|line| line.quantity > 0) {
            state.total_cost += line.price * f64::from(line.quantity);
            state.units = state.units.saturating_add(line.quantity);
            let count = state
                .item_counts
                .entry(line.target_id.clone())
                .or_default()
                .entry(line.menu_item_id.clone())
                .or_insert(0);
            *count = count.saturating_add(line.quantity);

            let category = menus
                .get(&line.target_id)
                .and_then(|items| items.iter().find(|item| item.id == line.menu_item_id))
                .map(|item| item.category.clone());
            if let Some(category) = category {
                let count = state
                    .category_counts
                    .entry(line.target_id.clone())
                    .or_default()
                    .entry(category)
                    .or_insert(0);
                *count = count.saturating_add(line.quantity);
            }
            state.lines.push(line.clone());
        }
        state
    }

    pub fn item_count(&self, item: &MenuItem) -> u32 {
        self.item_counts
            .get(&item.target_id)
            .and_then(|counts| counts.get(&item.id))
            .copied()
            .unwrap_or(0)
    }

    pub fn category_count(&self, item: &MenuItem) -> u32 {
        self.category_counts
            .get(&item.target_id)
            .and_then(|counts| counts.get(&item.category))
            .copied()
            .unwrap_or(0)
    }

    /// Whether one more unit of `candidate` keeps every cap and the cost
    /// ceiling intact.
    pub fn fits(&self, candidate: &Candidate<'_>, max_cost: f64) -> bool {
        candidate.limits.has_room(self.item_count(candidate.item))
            && candidate.category.has_room(self.category_count(candidate.item))
            && self.total_cost + candidate.item.price <= max_cost
    }

    pub fn item_shortfall(&self, candidate: &Candidate<'_>) -> u32 {
        candidate.limits.shortfall(self.item_count(candidate.item))
    }

    pub fn category_shortfall(&self, candidate: &Candidate<'_>) -> u32 {
        candidate
            .category
            .shortfall(self.category_count(candidate.item))
    }

    /// Adds one unit of `candidate`. Callers check `fits` first.
    pub fn commit(&mut self, candidate: &Candidate<'_>, kind: StepKind, rng: &mut impl Rng) {
        let item = candidate.item;
        self.total_cost += item.price;
        self.units = self.units.saturating_add(1);
        let count = self
            .item_counts
            .entry(item.target_id.clone())
            .or_default()
            .entry(item.id.clone())
            .or_insert(0);
        *count = count.saturating_add(1);
        let count = self
            .category_counts
            .entry(item.target_id.clone())
            .or_default()
            .entry(item.category.clone())
            .or_insert(0);
        *count = count.saturating_add(1);

        if let Some(line) = self.lines.iter_mut().find(|line| line.name == item.name) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(OrderLine {
                id: new_line_id(rng),
                name: item.name.clone(),
                price: item.price,
                quantity: 1,
                target_id: item.target_id.clone(),
                menu_item_id: item.id.clone(),
            });
        }

        self.steps.push(SelectionStep {
            kind,
            target_id: item.target_id.clone(),
            menu_item_id: item.id.clone(),
            price: item.price,
            total_cost: self.total_cost,
        });
    }
}

/// v4-format UUID drawn from the run's RNG, so seeded runs repeat exactly.
fn new_line_id(rng: &mut impl Rng) -> String {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}
