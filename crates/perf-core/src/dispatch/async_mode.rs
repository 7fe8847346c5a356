//! Asynchronous dispatch: one generator feeding one producer session.
//!
//! The pump forwards generated messages into the session input and paces after each
//! one. The collector drains completion notifications until it has seen one per
//! message of the load. Both are polled concurrently; the dispatch returns only after
//! the collector is done, so nothing is still in flight when the caller prints the
//! final metrics or closes the client.

use super::DispatchOutcome;
use crate::client::{AsyncProducer, Completion, ProducerClient};
use crate::config::RunConfig;
use crate::error::{DeliveryError, PerfError};
use crate::generator::MessageGenerator;
use crate::message::GenerationJob;
use crate::pacer::ThroughputPacer;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub async fn run_async(
    config: &RunConfig,
    generator: &dyn MessageGenerator,
    client: &dyn ProducerClient,
) -> Result<DispatchOutcome, PerfError> {
    let load = config.message_load;
    info!(
        "Producing {} messages asynchronously to topic {}",
        load, config.topic
    );

    let AsyncProducer { input, completions } = client.open_async();
    let mut stream = generator.generate(GenerationJob::new(
        config.topic.clone(),
        config.partition,
        load,
    ));
    let mut pacer = ThroughputPacer::new(config.throughput);

    let pump = async move {
        let mut sent = 0u64;
        while let Some(message) = stream.recv().await {
            input
                .send(message)
                .await
                .map_err(|_| DeliveryError::InputClosed)?;
            sent += 1;
            pacer.pace().await;
        }
        // End of input for the session.
        drop(input);

        let generated = stream.finish().await?;
        debug!(generated, sent, "async pump drained the generator");
        Ok::<_, PerfError>(DispatchOutcome { generated, sent })
    };

    let collect = async {
        collect_completions(completions, load)
            .await
            .map_err(PerfError::from)
    };

    let (outcome, observed) = tokio::try_join!(pump, collect)?;
    if observed < load {
        return Err(DeliveryError::CompletionsClosed {
            observed,
            expected: load,
        }
        .into());
    }

    Ok(outcome)
}

/// Wait for `expected` notifications. The first failure is returned at once; a closed
/// channel ends the wait early and the count seen so far is returned.
async fn collect_completions(
    mut completions: mpsc::Receiver<Completion>,
    expected: u64,
) -> Result<u64, DeliveryError> {
    let mut observed = 0u64;
    while observed < expected {
        match completions.recv().await {
            Some(Ok(_)) => observed += 1,
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }
    Ok(observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Delivery, InMemoryProducer};
    use crate::config::RunSettings;
    use crate::generators::RandomMessageGenerator;
    use std::time::Duration;
    use tokio::time::{self, Instant};

    fn config(load: u64, throughput: u32) -> RunConfig {
        RunSettings {
            message_load: load,
            message_size: 8,
            throughput,
            topic: "bench".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_collector_counts_until_expected() {
        let (tx, rx) = mpsc::channel(8);
        for offset in 0..5 {
            tx.send(Ok(Delivery {
                partition: 0,
                offset,
            }))
            .await
            .unwrap();
        }
        assert_eq!(collect_completions(rx, 5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_collector_stops_on_first_error() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok(Delivery {
            partition: 0,
            offset: 0,
        }))
        .await
        .unwrap();
        tx.send(Err(DeliveryError::Send("broker down".to_string())))
            .await
            .unwrap();
        let err = collect_completions(rx, 10).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Send(_)));
    }

    #[tokio::test]
    async fn test_collector_returns_early_on_close() {
        let (tx, rx) = mpsc::channel::<Completion>(1);
        drop(tx);
        assert_eq!(collect_completions(rx, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_all_messages_acknowledged() {
        let client = InMemoryProducer::new();
        let generator = RandomMessageGenerator::new(8);

        let outcome = run_async(&config(50, 0), &generator, &client).await.unwrap();

        assert_eq!(outcome, DispatchOutcome { generated: 50, sent: 50 });
        assert_eq!(client.delivered(), 50);
        assert_eq!(client.delivered_bytes(), 400);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_fatal() {
        let client = InMemoryProducer::new().failing_at(3);
        let generator = RandomMessageGenerator::new(8);

        let err = run_async(&config(20, 0), &generator, &client)
            .await
            .unwrap_err();
        assert!(matches!(err, PerfError::Delivery(DeliveryError::Send(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_paced_run_takes_one_window_per_batch() {
        time::pause();
        let start = Instant::now();
        let client = InMemoryProducer::new();
        let generator = RandomMessageGenerator::new(8);

        // Waits after messages 2, 4 and 6.
        run_async(&config(6, 2), &generator, &client).await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert_eq!(client.delivered(), 6);
    }
}
