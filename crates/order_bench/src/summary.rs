use crate::runner::SeedResult;
use serde::Serialize;
use std::collections::BTreeMap;

type Extractor = (&'static str, fn(&SeedResult) -> f64);

const EXTRACTORS: &[Extractor] = &[
    ("total_cost", |r: &SeedResult| r.summary.total_cost),
    ("units", |r: &SeedResult| f64::from(r.summary.units)),
    ("line_count", |r: &SeedResult| r.summary.line_count as f64),
    ("failed_attempts", |r: &SeedResult| {
        r.selection.failed_attempts.len() as f64
    }),
    ("wall_time_us", |r: &SeedResult| r.wall_time_us as f64),
];

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seed_count: usize,
    pub within_window_count: usize,
    pub window_hit_rate: f64,
    pub below_min_count: usize,
    pub violation_count: usize,
    pub metrics: Vec<MetricSummary>,
    /// Keyed by `target/item`.
    pub item_frequency: BTreeMap<String, ItemFrequency>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct ItemFrequency {
    /// Units across all baskets.
    pub units: u64,
    /// Baskets containing the item at least once.
    pub baskets: usize,
    pub basket_share: f64,
}

pub fn compute_summary(results: &[SeedResult]) -> SummaryStats {
    let seed_count = results.len();
    let within_window_count = results.iter().filter(|r| r.summary.within_window).count();
    let below_min_count = results.iter().filter(|r| r.summary.below_min).count();
    let violation_count = results.iter().map(|r| r.violations.len()).sum();

    let metrics = EXTRACTORS
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = results.iter().map(extract).collect();
            compute_metric_summary(name, &values)
        })
        .collect();

    let mut item_frequency: BTreeMap<String, ItemFrequency> = BTreeMap::new();
    for result in results {
        for line in &result.selection.lines {
            let entry = item_frequency
                .entry(format!("{}/{}", line.target_id, line.menu_item_id))
                .or_default();
            entry.units += u64::from(line.quantity);
            entry.baskets += 1;
        }
    }
    for entry in item_frequency.values_mut() {
        entry.basket_share = ratio(entry.baskets, seed_count);
    }

    SummaryStats {
        seed_count,
        within_window_count,
        window_hit_rate: ratio(within_window_count, seed_count),
        below_min_count,
        violation_count,
        metrics,
        item_frequency,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    if values.is_empty() {
        return MetricSummary {
            name: name.to_string(),
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            stddev: 0.0,
        };
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev: variance.sqrt(),
    }
}

pub fn print_summary(scenario_name: &str, stats: &SummaryStats) {
    println!(
        "\n=== {} ({} seeds) ===\n",
        scenario_name, stats.seed_count
    );
    println!(
        "{:<30} {:>8} {:>8} {:>8} {:>8}",
        "Metric", "Mean", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(70));
    for metric in &stats.metrics {
        println!(
            "{:<30} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            metric.name, metric.mean, metric.min, metric.max, metric.stddev
        );
    }
    println!(
        "{:<30} {}/{} ({:.1}%)",
        "window_hits",
        stats.within_window_count,
        stats.seed_count,
        stats.window_hit_rate * 100.0
    );
    println!(
        "{:<30} {}/{}",
        "below_min", stats.below_min_count, stats.seed_count
    );
    println!("{:<30} {}", "violations", stats.violation_count);

    println!("\n{:<30} {:>8} {:>8}", "Item", "Units", "Share");
    println!("{}", "-".repeat(48));
    for (item, freq) in &stats.item_frequency {
        println!(
            "{:<30} {:>8} {:>7.1}%",
            item,
            freq.units,
            freq.basket_share * 100.0
        );
    }
}
