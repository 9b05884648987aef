//! Proxim simulation binary.
//!
//! # Usage
//!
//! ```bash
//! # Ten participants over a simulated month
//! proxim-sim --entities 10 --days 30
//!
//! # Reproduce a specific trace
//! proxim-sim --entities 50 --days 14 --seed 42
//! ```

use clap::Parser;
use proxim_harness::{Session, SessionConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Professional api key from the reference trace.
const DEFAULT_API_KEY: &str = "c3b9b61b687b895aff09eb072fb07d33";

/// Proxim proximity-exposure protocol simulator
#[derive(Parser, Debug)]
#[command(name = "proxim-sim")]
#[command(about = "Simulate the Proxim exposure-notification workflow")]
#[command(version)]
struct Args {
    /// Number of simulated participants
    #[arg(short, long, default_value = "10")]
    entities: usize,

    /// Days to simulate
    #[arg(short, long, default_value = "30")]
    days: u32,

    /// RNG seed (equal seeds give identical runs)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Professional api key, hex-encoded
    #[arg(long, default_value = DEFAULT_API_KEY)]
    api_key: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let api_key = hex::decode(&args.api_key)?;

    let config = SessionConfig {
        entities: args.entities,
        days: args.days,
        seed: args.seed,
        api_key,
        ..SessionConfig::default()
    };

    let mut session = Session::new(config);
    let report = session.run()?;

    tracing::info!(
        tested = report.tested,
        diagnosed = report.diagnosed,
        exposed = report.exposed,
        disclosures = report.disclosures,
        observations = report.observations,
        "simulation finished"
    );

    Ok(())
}
