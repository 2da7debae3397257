mod output;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use collbench_runtime::{
    save_report_to_file, BenchObserver, BenchReport, BenchmarkConfig, BenchmarkRunner,
    FileSceneProvider, JsonObserver, StdinGoAhead, TracingObserver,
};
use progress::RunProgress;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LOG_FILTER: &str = "info";

/// Measure how many collision checks per second N threads sustain against
/// one shared scene.
#[derive(Parser, Debug)]
#[command(name = "collbench", version, about)]
struct Cli {
    /// Number of worker threads
    #[arg(short = 'n', long = "nthreads")]
    nthreads: Option<usize>,

    /// Collision checks per worker
    #[arg(short, long)]
    trials: Option<u64>,

    /// Accept live scene updates until Enter is pressed
    #[arg(short, long)]
    wait: bool,

    /// Scene description file (TOML)
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Config file to use instead of ./collbench.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for input sampling, for reproducible inputs
    #[arg(long)]
    seed: Option<u64>,

    /// Draws allowed per input before giving up (0 = unbounded)
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Checks performed by the uncounted warm-up run
    #[arg(long)]
    warmup_trials: Option<u64>,

    /// Pause before sampling when not waiting (milliseconds)
    #[arg(long = "settle-ms")]
    settle_ms: Option<u64>,

    /// Pin each worker to its own physical core
    #[arg(long)]
    pin: bool,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit run events as JSON lines on stderr instead of log lines
    #[arg(long)]
    json_events: bool,

    /// Only print results
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn apply(&self, config: &mut BenchmarkConfig) {
        if let Some(threads) = self.nthreads {
            config.run.threads = threads;
        }
        if let Some(trials) = self.trials {
            config.run.trials = trials;
        }
        if self.wait {
            config.run.wait = true;
        }
        if let Some(scene) = &self.scene {
            config.scene.path = Some(scene.clone());
        }
        if let Some(seed) = self.seed {
            config.sampling.seed = Some(seed);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.sampling.max_attempts = max_attempts;
        }
        if let Some(warmup_trials) = self.warmup_trials {
            config.run.warmup_trials = Some(warmup_trials);
        }
        if let Some(settle_ms) = self.settle_ms {
            config.run.settle_delay_ms = settle_ms;
        }
        if self.pin {
            config.run.pin_threads = true;
        }
    }
}

/// Log to stderr, filtered by COLLBENCH_LOG, then RUST_LOG.
fn init_logging(quiet: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter_expr = std::env::var("COLLBENCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let builder = fmt().with_writer(std::io::stderr).with_target(false);

    let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
        Some(filter) => builder.with_env_filter(filter),
        None if quiet => builder.with_env_filter("warn"),
        None => builder.with_env_filter(DEFAULT_LOG_FILTER),
    };

    let _ = builder.try_init();
}

fn load_config(cli: &Cli) -> Result<BenchmarkConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = BenchmarkConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => BenchmarkConfig::load().context("Failed to load collbench.toml")?,
    };
    cli.apply(&mut config);
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = load_config(&cli)?;
    if !cli.quiet {
        output::print_run_header(&config);
    }

    let provider = FileSceneProvider::new(
        config.scene.path.clone(),
        Duration::from_millis(config.scene.update_poll_ms),
    );

    let events: &dyn BenchObserver = if cli.json_events {
        &JsonObserver
    } else {
        &TracingObserver
    };
    let observer = RunProgress::new(events, cli.quiet);

    let mut runner = BenchmarkRunner::new(&config, provider, &observer);
    let outcome = match runner.run(&mut StdinGoAhead) {
        Ok(outcome) => outcome,
        Err(e) => {
            output::print_partial_results(e.completed_results());
            return Err(e).context("Benchmark failed");
        }
    };

    output::print_outcome(&outcome);

    if let Some(path) = &cli.output {
        let report = BenchReport::new(&config, &outcome);
        save_report_to_file(&report, path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
