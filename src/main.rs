use std::process;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use opbench::config;
use opbench::display;
use opbench::errors::BenchError;
use opbench::suite;
use opbench::types::OutputFormat;

#[derive(Parser)]
#[command(name = "opbench", version, about = "Measure and rank operation latency")]
struct Cli {
    /// Suite to run: hashing, sources, or all
    suite: Option<String>,

    /// Timed attempts per benchmark
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Untimed warmup attempts before measurement
    #[arg(short, long)]
    warmup: Option<u32>,

    /// Wall-clock budget for each measured phase, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Capture a resident-set sample with each result
    #[arg(long)]
    memory: bool,

    #[arg(long, default_value = "default")]
    format: OutputFormat,

    #[arg(long)]
    json: bool,

    /// Log per-source timings and other diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opbench=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    // CLI flags win over the config file, the file wins over defaults.
    let mut config = config::load_default()?;
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(warmup) = cli.warmup {
        config.warmup_iterations = warmup;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    if cli.memory {
        config.memory_tracking = true;
    }
    config.validate()?;

    let reports = match cli.suite.as_deref() {
        None | Some("all") => suite::run_all_benchmarks(&config).await?,
        Some("hashing") => vec![suite::hashing_report(&config).await?],
        Some("sources") => vec![suite::sources_report(&config).await?],
        Some(other) => {
            return Err(BenchError::UnknownSuite {
                name: other.to_string(),
            }
            .into());
        }
    };

    let now = Utc::now();
    let output = if cli.json {
        display::format_json(&reports, now)
    } else {
        match cli.format {
            OutputFormat::Short => display::format_short(&reports),
            OutputFormat::Default => display::format_default(&reports),
        }
    };

    print!("{}", output);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{}", err);
        process::exit(1);
    }
}
