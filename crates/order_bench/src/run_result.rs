use crate::runner::SeedResult;
use crate::summary::SummaryStats;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// One row of `baskets.csv`.
#[derive(Debug, Serialize)]
pub struct BasketRow {
    pub seed: u64,
    pub total_cost: f64,
    pub line_count: usize,
    pub units: u32,
    pub within_window: bool,
    pub below_min: bool,
    pub failed_attempts: usize,
    pub violations: usize,
    pub wall_time_us: u64,
    /// `target/item x qty` entries joined by `;`.
    pub items: String,
}

impl BasketRow {
    pub fn from_seed(result: &SeedResult) -> Self {
        let items = result
            .selection
            .lines
            .iter()
            .map(|line| format!("{}/{} x{}", line.target_id, line.menu_item_id, line.quantity))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            seed: result.seed,
            total_cost: result.summary.total_cost,
            line_count: result.summary.line_count,
            units: result.summary.units,
            within_window: result.summary.within_window,
            below_min: result.summary.below_min,
            failed_attempts: result.selection.failed_attempts.len(),
            violations: result.violations.len(),
            wall_time_us: result.wall_time_us,
            items,
        }
    }
}

pub fn write_baskets_csv(path: &Path, rows: &[BasketRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing row for seed {}", row.seed))?;
    }
    writer.flush().context("flushing baskets.csv")?;
    Ok(())
}

/// Batch-level result written next to the per-seed CSV.
#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub batch_schema_version: u32,
    pub batch_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub violating_seeds: Vec<u64>,
    pub stats: SummaryStats,
}

impl BatchResult {
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        order_world::write_json_atomic(path, self)
    }
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}
