//! Command-line interface for kafka-producer-perf
//!
//! # Usage Examples
//!
//! ```bash
//! # 100k random 1 KiB messages through the async producer
//! kafka-producer-perf --brokers localhost:9092 --topic perf \
//!   --message-load 100000 --message-size 1024
//!
//! # Four synchronous senders, each capped at 500 messages per second
//! kafka-producer-perf --brokers localhost:9092 --topic perf --sync --routines 4 \
//!   --message-load 20000 --message-size 256 --throughput 500
//!
//! # Replay hex-encoded payloads from a file, creating the topic first
//! kafka-producer-perf --brokers localhost:9092 --topic perf --create-topic \
//!   --topic-partitions 6 --message-load 50000 \
//!   --message-file payloads.hex --message-decoder hex
//!
//! # Exercise the harness without a broker
//! kafka-producer-perf --dry-run --topic perf --message-load 1000 --message-size 64
//! ```

use clap::Parser;
use kafka_producer_perf::cli::Args;
use kafka_producer_perf::execute;
use producer_perf_core::{PerfError, EXIT_FAILURE, EXIT_USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also end up here.
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(args).await {
        match e.downcast_ref::<PerfError>() {
            Some(perf) => {
                eprintln!("ERROR: {perf}");
                if perf.is_usage_error() {
                    eprintln!("\nRun with --help for the list of flags.");
                }
                std::process::exit(perf.exit_code());
            }
            None => {
                eprintln!("ERROR: {e:#}");
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Initialize tracing
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    let (summary, _) = execute(&args, std::io::stdout()).await?;
    tracing::info!("{summary}");
    Ok(())
}
