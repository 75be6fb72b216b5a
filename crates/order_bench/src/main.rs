use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use order_core::SelectionOptions;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod overrides;
mod run_result;
mod runner;
mod scenario;
mod summary;

#[derive(Parser)]
#[command(
    name = "order_bench",
    about = "Scenario runner for selector benchmarking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file across multiple seeds.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: PathBuf,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,
    },
}

fn run(scenario_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let scenario = scenario::load_scenario(scenario_path)?;
    let seeds = scenario.seeds.expand();
    info!(
        scenario = %scenario.name,
        seeds = seeds.len(),
        date = %scenario.date,
        "loading scenario"
    );

    // Load menu and rules, then apply overrides.
    let menus = order_world::load_menus(&scenario.content_dir, scenario.date)?;
    let store = order_world::load_rule_store(&scenario.content_dir)?;
    let (rules_name, rules) = store.get(scenario.rules.as_deref())?;
    let mut rules = rules.clone();
    let mut options = SelectionOptions {
        strategy: scenario.strategy,
        ..SelectionOptions::default()
    };
    overrides::apply_overrides(&mut rules, &mut options, &scenario.overrides)?;
    order_world::validate_rules(&rules).context("rules after overrides")?;
    for warning in order_world::rule_warnings(&rules, &menus) {
        warn!(rules = rules_name, "{warning}");
    }

    let scenario_params = serde_json::json!({
        "date": scenario.date,
        "rules": rules_name,
        "content_dir": scenario.content_dir,
        "strategy": options.strategy,
        "max_attempts": options.max_attempts,
        "overrides": scenario.overrides,
    });

    // Create timestamped output directory.
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = output_dir.join(format!("{}_{}", scenario.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;
    std::fs::copy(scenario_path, run_dir.join("scenario.json")).context("copying scenario file")?;
    let batch_id = Uuid::new_v4().to_string();
    order_world::write_run_info(
        &run_dir,
        &batch_id,
        seeds.first().copied().unwrap_or_default(),
        rules_name,
        scenario.date,
        scenario_params.clone(),
    )?;

    info!(output = %run_dir.display(), "running {} seeds in parallel", seeds.len());
    let results: Vec<runner::SeedResult> = seeds
        .par_iter()
        .map(|&seed| runner::run_seed(&menus, &rules, &options, seed))
        .collect();

    let mut violating_seeds = Vec::new();
    for result in &results {
        if !result.violations.is_empty() {
            error!(
                seed = result.seed,
                violations = ?result.violations,
                "basket breaks hard rules"
            );
            violating_seeds.push(result.seed);
        }
        for target_id in &result.selection.skipped_targets {
            warn!(seed = result.seed, %target_id, "target has no menu, skipped");
        }
    }

    let rows: Vec<run_result::BasketRow> =
        results.iter().map(run_result::BasketRow::from_seed).collect();
    run_result::write_baskets_csv(&run_dir.join("baskets.csv"), &rows)?;

    let stats = summary::compute_summary(&results);
    summary::print_summary(&scenario.name, &stats);
    order_world::write_json_atomic(&run_dir.join("summary.json"), &stats)
        .context("writing summary.json")?;

    let batch = run_result::BatchResult {
        batch_schema_version: 1,
        batch_id,
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        scenario_name: scenario.name.clone(),
        scenario_params,
        violating_seeds,
        stats,
    };
    batch
        .write_atomic(&run_dir.join("batch_summary.json"))
        .context("writing batch_summary.json")?;

    if !batch.violating_seeds.is_empty() {
        bail!(
            "{} of {} seeds produced rule violations",
            batch.violating_seeds.len(),
            seeds.len()
        );
    }
    Ok(run_dir)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            output_dir,
        } => {
            let run_dir = run(&scenario, &output_dir)?;
            println!("Results written to {}", run_dir.display());
        }
    }
    Ok(())
}
