//! lfsim — lifeform amortization planner.
//!
//! Builds one entity catalog per requested lifeform, runs the greedy
//! amortization simulation against a spend budget and prints the resulting
//! upgrade plan. Trajectories can be written as JSON for plotting; the tool
//! itself stays headless.
//!
//! Usage:
//!   cargo run -p lfsim-cli -- --budget 1e12
//!   cargo run -p lfsim-cli -- --lifeform kaelesh --class discoverer --debug

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;
use tracing::info;

use lfsim_logic::dataset::{build_catalog, parse_entries};
use lfsim_logic::lifeform::{Lifeform, PlayerClass};
use lfsim_logic::simulate::{Simulator, TrajectoryPoint};
use lfsim_logic::units::EconomyConfig;

/// Default entity dataset; the same rows the upstream spreadsheet carries.
const BUNDLED_CATALOG: &str = include_str!("../../../data/lifeform_catalog.json");

#[derive(Parser, Debug)]
#[command(author, version, about = "Greedy lifeform upgrade planner", long_about = None)]
struct Cli {
    /// Spend budget in deuterium standard units (DSE).
    #[arg(long, default_value_t = 1e15)]
    budget: f64,

    /// Simulate a single lifeform instead of all four.
    #[arg(long)]
    lifeform: Option<Lifeform>,

    /// Account class; selects the technology slot layout and whether the
    /// expedition income model applies.
    #[arg(long, default_value = "collector")]
    class: PlayerClass,

    /// Log every purchase as it happens.
    #[arg(long)]
    debug: bool,

    /// Subtract the starting bonus from every recorded trajectory point.
    #[arg(long)]
    rebase: bool,

    /// JSON file mapping entity names to starting levels.
    #[arg(long)]
    start_levels: Option<PathBuf>,

    /// Catalog dataset to load instead of the bundled one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write all runs' trajectories and level tables to this JSON file.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Everything one run produces, in the shape downstream plotting reads.
#[derive(Debug, Serialize)]
struct RunReport {
    lifeform: String,
    class: String,
    points: Vec<TrajectoryPoint>,
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Serialize)]
struct LevelEntry {
    name: String,
    level: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .compact()
        .init();

    let dataset = match &cli.catalog {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("reading catalog dataset {}", path.display()))?,
        None => BUNDLED_CATALOG.to_string(),
    };
    let rows = parse_entries(&dataset)?;

    let start_levels: HashMap<String, u32> = match &cli.start_levels {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading start levels {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("parsing start levels {}", path.display()))?
        }
        None => HashMap::new(),
    };

    let econ = match cli.class {
        PlayerClass::Collector => EconomyConfig::collector(),
        PlayerClass::Discoverer => EconomyConfig::discoverer(),
    };

    let lifeforms: Vec<Lifeform> = match cli.lifeform {
        Some(lifeform) => vec![lifeform],
        None => Lifeform::ALL.to_vec(),
    };

    let mut reports = Vec::new();
    for lifeform in lifeforms {
        let catalog = build_catalog(&rows, lifeform, cli.class, &start_levels, &econ)?;
        info!(%lifeform, entities = catalog.len(), "catalog built");

        let mut sim = Simulator::new(catalog, econ.clone());
        let baseline = sim.total_bonus();
        let mut points = sim.simulate(cli.budget)?;
        if cli.rebase {
            for point in points.iter_mut().skip(1) {
                point.total_bonus -= baseline;
            }
        }

        print_summary(lifeform, cli.class, &points, &sim);
        reports.push(RunReport {
            lifeform: lifeform.to_string(),
            class: cli.class.to_string(),
            points,
            levels: sim
                .catalog()
                .levels()
                .into_iter()
                .map(|(name, level)| LevelEntry { name, level })
                .collect(),
        });
    }

    if let Some(path) = &cli.out {
        let file = fs::File::create(path)
            .wrap_err_with(|| format!("creating output file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &reports)?;
        info!(path = %path.display(), runs = reports.len(), "trajectories written");
    }

    Ok(())
}

fn print_summary(
    lifeform: Lifeform,
    class: PlayerClass,
    points: &[TrajectoryPoint],
    sim: &Simulator,
) {
    let purchases = points.len().saturating_sub(1);
    let spent = points.last().map(|p| p.cumulative_cost).unwrap_or(0.0);
    let bonus = points.last().map(|p| p.total_bonus).unwrap_or(0.0);

    println!("=== {lifeform} ({class}) ===");
    println!("{purchases} purchases, {spent:.3e} DSE spent, +{bonus:.4} DSE production bonus");
    for (name, level) in sim.catalog().levels() {
        println!("  {name:<34} {level:>4}");
    }
    println!();
}
