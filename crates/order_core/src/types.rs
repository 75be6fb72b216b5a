//! Type definitions for `order_core`.
//!
//! Menu snapshots and rule configs are handed in by the surrounding system;
//! their JSON shapes use camelCase field names to match those collaborators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(TargetId);
string_id!(MenuItemId);

/// Menu snapshot for one day: every target's items, in menu order.
pub type Menus = HashMap<TargetId, Vec<MenuItem>>;

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub target_id: TargetId,
    pub name: String,
    pub category: String,
    pub price: f64,
    /// Disabled items are never selectable.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Soft `min`/`mid` thresholds and the hard `max` ceiling on basket cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBounds {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRule {
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ItemRule {
    fn default() -> Self {
        Self {
            weight: default_weight(),
            min_items: None,
            max_items: None,
        }
    }
}

/// Per-target rules. Categories are keyed by name, items by menu item id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRules {
    #[serde(default)]
    pub categories: HashMap<String, ItemRule>,
    #[serde(default)]
    pub items: HashMap<MenuItemId, ItemRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub total_cost: CostBounds,
    pub select_from_targets: Vec<TargetId>,
    #[serde(default)]
    pub targets_data: HashMap<TargetId, TargetRules>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub target_id: TargetId,
    pub menu_item_id: MenuItemId,
}

/// Which phase committed a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    MinItem,
    MinCategory,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStep {
    pub kind: StepKind,
    pub target_id: TargetId,
    pub menu_item_id: MenuItemId,
    pub price: f64,
    /// Basket total after this commit.
    pub total_cost: f64,
}

/// A weighted-fill attempt that ran out of candidates below `min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedAttempt {
    pub total_cost: f64,
    pub units: u32,
}

/// Everything a selector run produced. `lines` is the basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub lines: Vec<OrderLine>,
    pub total_cost: f64,
    /// Commits of the kept attempt, in order. Seeded lines are not steps.
    pub steps: Vec<SelectionStep>,
    pub failed_attempts: Vec<FailedAttempt>,
    pub skipped_targets: Vec<TargetId>,
}

impl Selection {
    pub fn units(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |units: u32, line| units.saturating_add(line.quantity))
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Required items, required categories, then weighted fill with retries.
    #[default]
    Constrained,
    /// Weighted fill only, a single attempt.
    SinglePass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOptions {
    /// Weighted-fill attempts before settling for the most expensive one.
    pub max_attempts: usize,
    pub strategy: Strategy,
}

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            strategy: Strategy::Constrained,
        }
    }
}
