//! Kafka producer benchmark.
//!
//! Wires the command-line flags to the benchmark engine in `producer-perf-core` and the
//! Kafka client in `producer-perf-kafka`.

pub mod cli;
pub mod duration;

use cli::Args;
use producer_perf_core::{run_benchmark, InMemoryProducer, PerfError, ProducerClient, RunSummary};
use producer_perf_kafka::{create_topic_if_not_exists, KafkaProducer};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Validate `args`, build the producer client and run the benchmark.
///
/// Metrics lines go to `sink`. With `--dry-run` no broker is contacted: messages are
/// acknowledged in memory and the broker flags are only checked for unknown schemes.
pub async fn execute<W>(args: &Args, sink: W) -> Result<(RunSummary, W), PerfError>
where
    W: Write + Send + 'static,
{
    let config = args.run_settings().validate()?;
    let kafka = args.kafka_config()?;

    let client: Arc<dyn ProducerClient> = if args.dry_run {
        info!("Dry run: messages are acknowledged in memory, no broker is contacted");
        Arc::new(InMemoryProducer::new().with_channel_buffer(kafka.channel_buffer_size))
    } else {
        kafka.validate(config.partition)?;
        if args.create_topic {
            create_topic_if_not_exists(&kafka, &config.topic, args.topic_partitions).await?;
        }
        Arc::new(KafkaProducer::new(&kafka)?)
    };

    run_benchmark(&config, client, sink).await
}
