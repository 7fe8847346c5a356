//! Periodic metrics line.
//!
//! The reporter runs as a background task for the whole benchmark. Every interval it
//! snapshots the producer client's registry and writes one line. Ticks on which the
//! metrics are not registered yet are skipped. Stopping it through
//! [`ReporterHandle::finish`] writes one final snapshot after the loop has exited.

use crate::error::PerfError;
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

pub struct MetricsReporter<W> {
    registry: Arc<MetricsRegistry>,
    message_size: usize,
    interval: Duration,
    writer: W,
}

impl<W: Write + Send + 'static> MetricsReporter<W> {
    /// `message_size` is the configured size, used for the ingress estimate.
    pub fn new(
        registry: Arc<MetricsRegistry>,
        message_size: usize,
        interval: Duration,
        writer: W,
    ) -> Self {
        Self {
            registry,
            message_size,
            interval,
            writer,
        }
    }

    /// Write one snapshot line. Returns `false` when the metrics are not registered yet.
    pub fn report_once(&mut self) -> io::Result<bool> {
        let Some(snapshot) = MetricsSnapshot::capture(&self.registry) else {
            return Ok(false);
        };
        writeln!(self.writer, "{}", snapshot.render(self.message_size))?;
        self.writer.flush()?;
        Ok(true)
    }

    /// Spawn the ticking loop. Must be called within a tokio runtime.
    pub fn start(self) -> ReporterHandle<W> {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(self.run(token));
        ReporterHandle { cancel, task }
    }

    async fn run(mut self, cancel: CancellationToken) -> io::Result<Self> {
        let Some(first_tick) = Instant::now().checked_add(self.interval) else {
            // Interval beyond the clock's range: only the final snapshot is printed.
            cancel.cancelled().await;
            debug!("metrics reporter stopped");
            return Ok(self);
        };
        let mut ticker = interval_at(first_tick, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("metrics reporter stopped");
                    return Ok(self);
                }
                _ = ticker.tick() => {
                    if !self.report_once()? {
                        trace!("producer metrics not registered yet, skipping report");
                    }
                }
            }
        }
    }
}

/// Control handle for a running reporter.
pub struct ReporterHandle<W> {
    cancel: CancellationToken,
    task: JoinHandle<io::Result<MetricsReporter<W>>>,
}

impl<W: Write + Send + 'static> ReporterHandle<W> {
    /// Stop the loop, print the final snapshot and hand back the writer.
    pub async fn finish(self) -> Result<W, PerfError> {
        self.cancel.cancel();
        let mut reporter = self.task.await.map_err(io::Error::other)??;
        if !reporter.report_once()? {
            warn!("producer metrics were never registered, no final report");
        }
        Ok(reporter.writer)
    }

    /// Stop the loop without printing a final snapshot.
    pub fn abort(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
