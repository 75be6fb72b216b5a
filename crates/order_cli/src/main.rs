use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use order_core::{
    add_one_item, audit_basket, build_basket, summarize_basket, Menus, RuleConfig, Selection,
    SelectionOptions, Strategy, DEFAULT_MAX_ATTEMPTS,
};
use order_world::{
    load_menus, load_rule_store, parse_date, read_basket, rule_warnings, write_basket,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "order_cli", about = "Random meal-order selector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Menu day and rule config shared by every subcommand.
#[derive(clap::Args)]
struct Source {
    /// Menu day, YYYY-MM-DD.
    #[arg(long)]
    date: String,
    /// Rule config name from rules.json. Defaults to the store's default.
    #[arg(long)]
    rules: Option<String>,
    #[arg(long, default_value = "./content")]
    content_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Constrained,
    SinglePass,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Constrained => Strategy::Constrained,
            StrategyArg::SinglePass => Strategy::SinglePass,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a fresh basket.
    Select {
        #[command(flatten)]
        source: Source,
        /// RNG seed. A random seed is drawn and printed when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value = "constrained")]
        strategy: StrategyArg,
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: usize,
        /// Write the basket as JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Add exactly one unit to a saved basket.
    Add {
        /// Basket JSON written by `select --out` or a previous `add`.
        #[arg(long)]
        basket: PathBuf,
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        seed: Option<u64>,
        /// Where to write the extended basket. Defaults to overwriting --basket.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a rule config against a menu day without selecting anything.
    Validate {
        #[command(flatten)]
        source: Source,
    },
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

struct Loaded {
    rules_name: String,
    rules: RuleConfig,
    menus: Menus,
}

fn load(source: &Source) -> Result<Loaded> {
    let date = parse_date(&source.date)?;
    let store = load_rule_store(&source.content_dir)?;
    let (rules_name, rules) = store.get(source.rules.as_deref())?;
    let menus = load_menus(&source.content_dir, date)?;
    for warning in rule_warnings(rules, &menus) {
        warn!(rules = rules_name, "{warning}");
    }
    Ok(Loaded {
        rules_name: rules_name.to_string(),
        rules: rules.clone(),
        menus,
    })
}

fn seeded_rng(seed: Option<u64>) -> (u64, ChaCha8Rng) {
    let resolved = seed.unwrap_or_else(rand::random);
    (resolved, ChaCha8Rng::seed_from_u64(resolved))
}

fn select(
    source: &Source,
    seed: Option<u64>,
    options: &SelectionOptions,
    out: Option<&Path>,
) -> Result<()> {
    let loaded = load(source)?;
    let (seed, mut rng) = seeded_rng(seed);
    info!(
        date = %source.date,
        rules = %loaded.rules_name,
        seed,
        max_attempts = options.max_attempts,
        "selecting basket"
    );

    let selection = build_basket(&loaded.menus, &loaded.rules, options, &mut rng);
    for failed in &selection.failed_attempts {
        info!(
            total_cost = failed.total_cost,
            units = failed.units,
            "weighted fill ran dry below min, retried"
        );
    }
    report(&selection, &loaded);
    println!("seed: {seed}");

    if let Some(path) = out {
        write_basket(path, &selection.lines)?;
        println!("Basket written to {}", path.display());
    }
    Ok(())
}

fn add(basket: &Path, source: &Source, seed: Option<u64>, out: Option<&Path>) -> Result<()> {
    let loaded = load(source)?;
    let existing = read_basket(basket)?;
    let (seed, mut rng) = seeded_rng(seed);
    info!(
        basket = %basket.display(),
        lines = existing.len(),
        seed,
        "adding one item"
    );

    let selection = add_one_item(&loaded.menus, &loaded.rules, &existing, &mut rng);
    match selection.steps.first() {
        Some(step) => println!(
            "Added {}/{} at {:.2} ({:?})",
            step.target_id, step.menu_item_id, step.price, step.kind
        ),
        None => println!("Nothing fits: basket unchanged."),
    }
    report(&selection, &loaded);

    let path = out.unwrap_or(basket);
    write_basket(path, &selection.lines)?;
    println!("Basket written to {}", path.display());
    Ok(())
}

fn validate(source: &Source) -> Result<()> {
    let loaded = load(source)?;
    let warnings = rule_warnings(&loaded.rules, &loaded.menus);
    let items: usize = loaded.menus.values().map(Vec::len).sum();
    println!(
        "rules '{}' on {}: {} targets, {items} items, {} warnings",
        loaded.rules_name,
        source.date,
        loaded.menus.len(),
        warnings.len(),
    );
    if !warnings.is_empty() {
        bail!("rule config '{}' has {} warnings", loaded.rules_name, warnings.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn report(selection: &Selection, loaded: &Loaded) {
    for target_id in &selection.skipped_targets {
        warn!(%target_id, "target has no menu for this day, skipped");
    }
    print!("{}", basket_table(selection));

    let bounds = &loaded.rules.total_cost;
    let summary = summarize_basket(&selection.lines, bounds);
    let window = if summary.within_window {
        "in window"
    } else if summary.below_min {
        "BELOW MIN"
    } else {
        "OVER MAX"
    };
    println!(
        "total={:.2}  window=[{:.2}, {:.2}] mid={:.2}  {window}  units={}  attempts={}",
        summary.total_cost,
        bounds.min,
        bounds.max,
        bounds.mid,
        summary.units,
        selection.failed_attempts.len() + 1,
    );
    for violation in audit_basket(&selection.lines, &loaded.menus, &loaded.rules) {
        warn!("rule violation: {violation}");
    }
}

fn basket_table(selection: &Selection) -> String {
    let name_width = selection
        .lines
        .iter()
        .map(|line| line.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("item".len());
    let mut out = format!(
        "{:<name_width$}  {:<12}  {:>3}  {:>8}\n",
        "item", "target", "qty", "price"
    );
    out.push_str(&"-".repeat(name_width + 31));
    out.push('\n');
    for line in &selection.lines {
        out.push_str(&format!(
            "{:<name_width$}  {:<12}  {:>3}  {:>8.2}\n",
            line.name,
            line.target_id.to_string(),
            line.quantity,
            line.price * f64::from(line.quantity),
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Select {
            source,
            seed,
            strategy,
            max_attempts,
            out,
        } => {
            let options = SelectionOptions {
                max_attempts,
                strategy: strategy.into(),
            };
            select(&source, seed, &options, out.as_deref())
        }
        Commands::Add {
            basket,
            source,
            seed,
            out,
        } => add(&basket, &source, seed, out.as_deref())
            .with_context(|| format!("extending basket {}", basket.display())),
        Commands::Validate { source } => validate(&source),
    }
}
