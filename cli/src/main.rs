//! Trinode CLI
//!
//! Runs batches of the three-computer message network simulation and writes
//! per-run statistics plus a cross-run summary.
//!
//! # Example
//!
//! ```bash
//! # Five runs of 100 simulated seconds with the default seed
//! trinode
//!
//! # Watch a single run event by event
//! trinode --runs 1 --horizon 60 --slow
//!
//! # Ten long runs, summary also dumped as JSON
//! trinode --runs 10 --horizon 1000 --json results.json
//! ```

mod console;
mod report;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use console::ConsoleObserver;
use trinode_core::{
    summarize, BatchSummary, RunConfig, RunStats, SentCounting, SimResult, Simulation,
    DEFAULT_HORIZON, DEFAULT_RUNS,
};

/// Pause between events in slow mode.
const SLOW_PACE_MS: u64 = 500;

/// Three-computer network simulator
///
/// Single-threaded and reproducible: the same seed, horizon and run count
/// always produce the same results.
#[derive(Parser, Debug)]
#[command(name = "trinode")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of independent runs [default: 5]
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    runs: Option<i64>,

    /// Simulated seconds per run [default: 100, or the config file's horizon]
    #[arg(short = 't', long, allow_negative_numbers = true)]
    horizon: Option<f64>,

    /// Base generator seed. Run k uses a stream derived from it.
    #[arg(long)]
    seed: Option<u32>,

    /// Pause between events and print the system state after each one
    #[arg(long)]
    slow: bool,

    /// Print the system state after every event
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print detailed statistics after each run
    #[arg(long)]
    show_stats: bool,

    /// JSON run configuration; command-line values override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Text results file
    #[arg(short = 'o', long, default_value = "simulation_results.txt")]
    output: PathBuf,

    /// Also write runs and summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Count a C1 completion twice when the message leaves the system
    #[arg(long)]
    legacy_sent_count: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Serialize)]
struct BatchReport<'a> {
    config: &'a RunConfig,
    runs: &'a [RunStats],
    summary: &'a BatchSummary,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = SimpleLogger::new().with_level(args.log_level).init() {
        eprintln!("failed to initialize logger: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Positive run count, or the default with a warning.
fn run_count(requested: i64) -> u32 {
    match u32::try_from(requested) {
        Ok(n) if n > 0 => n,
        _ => {
            warn!("invalid run count {}, using {}", requested, DEFAULT_RUNS);
            DEFAULT_RUNS
        }
    }
}

/// Positive finite horizon, or the default with a warning.
fn horizon(requested: f64) -> f64 {
    if requested.is_finite() && requested > 0.0 {
        requested
    } else {
        warn!("invalid horizon {}, using {}", requested, DEFAULT_HORIZON);
        DEFAULT_HORIZON
    }
}

/// Validation runs after fallbacks, so a bad horizon from either source
/// degrades to the default instead of aborting.
fn base_config(args: &Args) -> SimResult<RunConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<RunConfig>(&raw)?
        }
        None => RunConfig::default(),
    };

    config.horizon = horizon(args.horizon.unwrap_or(config.horizon));
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.slow {
        config.pace_ms = Some(SLOW_PACE_MS);
    }
    if args.legacy_sent_count {
        config.sent_counting = SentCounting::Legacy;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> SimResult<()> {
    let runs = args.runs.map_or(DEFAULT_RUNS, run_count);
    let config = base_config(args)?;
    let watch = args.verbose || args.slow;

    info!(
        "starting {} run(s): horizon={} seed={} counting={:?}",
        runs, config.horizon, config.seed, config.sent_counting
    );

    let mut all_stats = Vec::with_capacity(runs as usize);
    for k in 0..runs {
        println!("\n--- Starting Run {}/{} ---", k + 1, runs);
        let mut sim = Simulation::new(config.for_run(k))?;
        if watch {
            sim.run_with(&mut ConsoleObserver);
        } else {
            sim.run();
        }
        println!(
            "Run {} complete at t = {:.2} s, {} messages created",
            k + 1,
            sim.time,
            sim.messages().len()
        );

        let stats = sim.collect_stats()?;
        if args.show_stats {
            let mut out = io::stdout().lock();
            writeln!(out)?;
            writeln!(out, "STATISTICS FOR RUN #{}", stats.run_index)?;
            report::write_run(&mut out, &stats)?;
        }
        all_stats.push(stats);
    }

    let summary = summarize(&all_stats);
    {
        let mut out = io::stdout().lock();
        writeln!(out)?;
        report::write_run_summaries(&mut out, &all_stats)?;
        report::write_summary(&mut out, &summary)?;
    }

    let mut file = BufWriter::new(File::create(&args.output)?);
    report::write_results(&mut file, &all_stats, &summary)?;
    file.flush()?;
    info!("results saved to {}", args.output.display());

    if let Some(path) = &args.json {
        let doc = BatchReport {
            config: &config,
            runs: &all_stats,
            summary: &summary,
        };
        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut file, &doc)?;
        file.flush()?;
        info!("JSON report saved to {}", path.display());
    }

    Ok(())
}
