use anyhow::{bail, Result};
use order_core::{RuleConfig, SelectionOptions};
use std::collections::HashMap;

const VALID_KEYS: &[&str] = &[
    "total_cost.min",
    "total_cost.mid",
    "total_cost.max",
    "max_attempts",
];

/// Applies scenario overrides on top of the loaded rule config and options.
/// Run `order_world::validate_rules` afterwards: overrides can break bound
/// ordering.
pub fn apply_overrides(
    rules: &mut RuleConfig,
    options: &mut SelectionOptions,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "total_cost.min" => rules.total_cost.min = as_f64(key, value)?,
            "total_cost.mid" => rules.total_cost.mid = as_f64(key, value)?,
            "total_cost.max" => rules.total_cost.max = as_f64(key, value)?,
            "max_attempts" => options.max_attempts = as_usize(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_usize(key: &str, value: &serde_json::Value) -> Result<usize> {
    let val = value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })?;
    usize::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds usize range"))
}
