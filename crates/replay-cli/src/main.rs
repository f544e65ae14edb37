use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use netsim_replay_config::{ReplayConfig, SortOrder};
use netsim_replay_engine::{catalog, DrainReport, ReplayEngine};
use netsim_replay_shared::Trace;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "netsim-replay")]
#[command(about = "Scrub through recorded NetSim chart traces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Move the cursor through a list of times, reporting each drain
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,

        /// Cursor times in nanoseconds (comma-separated, may go backwards)
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        times: Vec<i64>,

        /// Print the full state after the last step
        #[arg(short, long)]
        snapshot: bool,
    },
    /// List the selectable series of a trace
    Catalog {
        /// Trace file (JSON)
        trace: PathBuf,

        /// Override the configured sort order
        #[arg(short, long)]
        sort: Option<SortArg>,
    },
    /// Load a trace and check it for integrity violations
    Validate {
        /// Trace file (JSON)
        trace: PathBuf,
    },
    /// Write the active configuration (defaults plus --config) to a file
    InitConfig {
        /// Output path, format chosen by extension (yaml, json or toml)
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Alphabetical,
    Type,
    Id,
    None,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alphabetical => SortOrder::Alphabetical,
            SortArg::Type => SortOrder::Type,
            SortArg::Id => SortOrder::Id,
            SortArg::None => SortOrder::None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReplayConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ReplayConfig::default(),
    };

    // RUST_LOG wins over the configured level
    let level = if cli.debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Replay {
            trace,
            times,
            snapshot,
        } => replay(&config, &trace, &times, snapshot, cli.json),
        Commands::Catalog { trace, sort } => {
            let order = sort.map(SortOrder::from).unwrap_or(config.catalog.sort_order);
            list_catalog(&config, &trace, order, cli.json)
        }
        Commands::Validate { trace } => validate(&config, &trace),
        Commands::InitConfig { output } => {
            config
                .save(&output)
                .with_context(|| format!("failed to write config {}", output.display()))?;
            info!("Wrote config to {}", output.display());
            Ok(())
        }
    }
}

fn load_engine(config: &ReplayConfig, path: &Path) -> Result<ReplayEngine> {
    let trace = Trace::from_file(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    let engine = ReplayEngine::load(trace, config.engine.clone())
        .with_context(|| format!("trace {} cannot be replayed", path.display()))?;
    Ok(engine)
}

fn replay(
    config: &ReplayConfig,
    path: &Path,
    times: &[i64],
    snapshot: bool,
    json: bool,
) -> Result<()> {
    let mut engine = load_engine(config, path)?;
    let mut reports = Vec::with_capacity(times.len());

    for &time in times {
        let report = engine
            .set_time(time)
            .inspect_err(|err| error!("Replay stopped at {}: {}", time, err))?;
        if !json {
            print_report(&report, &engine);
        }
        reports.push(report);
    }

    if json {
        let output = serde_json::json!({
            "reports": reports,
            "snapshot": snapshot.then(|| engine.snapshot()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if snapshot {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    }

    info!(
        "Replay finished at {}: {}/{} events applied",
        engine.current_time(),
        engine.applied_events(),
        engine.total_events()
    );
    Ok(())
}

fn print_report(report: &DrainReport, engine: &ReplayEngine) {
    let next = match engine.forward_queue().front() {
        Some(event) => format!("next {} @ {}", event.entity_id(), event.time()),
        None => "end of trace".to_string(),
    };
    println!(
        "{:>12} -> {:<12} {:?}: applied {}, synthesized {}, inverted {}, discarded {} (pending {}, {})",
        report.from,
        report.to,
        report.direction,
        report.applied,
        report.synthesized,
        report.inverted,
        report.discarded_synthetic,
        engine.pending_events(),
        next
    );
}

fn list_catalog(config: &ReplayConfig, path: &Path, order: SortOrder, json: bool) -> Result<()> {
    let engine = load_engine(config, path)?;
    let listings = catalog(engine.registry(), order);

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    println!("Series ({} sort):", order);
    for listing in &listings {
        println!("  {:>6}  {:<16} {}", listing.id, listing.kind.to_string(), listing.name);
    }
    Ok(())
}

fn validate(config: &ReplayConfig, path: &Path) -> Result<()> {
    let engine = load_engine(config, path)?;
    println!(
        "{}: {} entities, {} events, ok",
        path.display(),
        engine.registry().len(),
        engine.total_events()
    );
    Ok(())
}
