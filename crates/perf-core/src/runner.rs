//! One benchmark run from start to finish.

use crate::client::ProducerClient;
use crate::config::{DispatchMode, RunConfig};
use crate::dispatch::{dispatch, DispatchOutcome};
use crate::error::PerfError;
use crate::generators::build_generator;
use crate::reporter::MetricsReporter;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: DispatchMode,
    /// Messages produced by the generator(s)
    pub generated: u64,
    /// Messages handed to the producer client
    pub sent: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(mode: DispatchMode, outcome: DispatchOutcome, elapsed: Duration) -> Self {
        Self {
            mode,
            generated: outcome.generated,
            sent: outcome.sent,
            elapsed,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dispatch finished: {} messages generated, {} sent in {:.2}s",
            self.mode,
            self.generated,
            self.sent,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Run the benchmark against `client`, writing metrics lines to `sink`.
///
/// Starts the periodic reporter, builds the generator, dispatches the whole load, then
/// prints the final metrics snapshot and closes the client, in that order. On failure
/// the reporter is stopped without a final snapshot and the client is left open.
/// Returns the summary together with the sink.
pub async fn run_benchmark<W>(
    config: &RunConfig,
    client: Arc<dyn ProducerClient>,
    sink: W,
) -> Result<(RunSummary, W), PerfError>
where
    W: Write + Send + 'static,
{
    let reporter = MetricsReporter::new(
        client.registry(),
        config.message_size,
        config.report_interval,
        sink,
    )
    .start();

    let started = Instant::now();
    let dispatched = match build_generator(config) {
        Ok(generator) => dispatch(config, generator, Arc::clone(&client)).await,
        Err(e) => Err(e),
    };
    let outcome = match dispatched {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Benchmark aborted: {}", e);
            reporter.abort();
            return Err(e);
        }
    };
    let summary = RunSummary::new(config.mode, outcome, started.elapsed());

    let sink = reporter.finish().await?;
    client.close().await?;

    info!("{}", summary);
    Ok((summary, sink))
}
