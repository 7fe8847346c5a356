//! Synchronous dispatch: several workers, one blocking send at a time each.
//!
//! The load is split by [`DispatchPlan`]; every worker gets its own message stream and
//! its own pacer, so the aggregate rate scales with the worker count. With pacing
//! enabled a worker sends each message `throughput` times in a row and then waits for
//! its next tick.

use super::DispatchOutcome;
use crate::client::ProducerClient;
use crate::config::RunConfig;
use crate::error::{DeliveryError, PerfError};
use crate::generator::{MessageGenerator, MessageStream};
use crate::message::GenerationJob;
use crate::pacer::ThroughputPacer;
use crate::plan::DispatchPlan;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

pub async fn run_sync(
    config: &RunConfig,
    generator: Arc<dyn MessageGenerator>,
    client: Arc<dyn ProducerClient>,
) -> Result<DispatchOutcome, PerfError> {
    let plan = DispatchPlan::new(config.message_load, config.workers)?;
    info!(
        "Producing {} messages synchronously to topic {} with {} workers ({})",
        plan.total(),
        config.topic,
        plan.workers(),
        plan.describe()
    );

    let mut workers = JoinSet::new();
    for (index, &chunk) in plan.chunks().iter().enumerate() {
        let stream = generator.generate(GenerationJob::new(
            config.topic.clone(),
            config.partition,
            chunk,
        ));
        workers.spawn(run_worker(
            index + 1,
            stream,
            Arc::clone(&client),
            config.throughput,
        ));
    }

    // Returning early drops the set, which aborts the remaining workers.
    let mut outcome = DispatchOutcome::default();
    while let Some(joined) = workers.join_next().await {
        let worker = joined.map_err(|e| DeliveryError::Task(e.to_string()))??;
        outcome.merge(worker);
    }

    Ok(outcome)
}

async fn run_worker(
    worker: usize,
    mut stream: MessageStream,
    client: Arc<dyn ProducerClient>,
    throughput: u32,
) -> Result<DispatchOutcome, PerfError> {
    let mut pacer = ThroughputPacer::new(throughput);
    let repeats = if pacer.is_enabled() { throughput } else { 1 };

    let mut sent = 0u64;
    while let Some(message) = stream.recv().await {
        for _ in 0..repeats {
            client.send(&message).await?;
            sent += 1;
        }
        pacer.wait_tick().await;
    }

    let generated = stream.finish().await?;
    debug!(worker, generated, sent, "sync worker finished");
    Ok(DispatchOutcome { generated, sent })
}
