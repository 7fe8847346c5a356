//! [`ProducerClient`] implementation on top of rdkafka's `FutureProducer`.

use crate::config::KafkaProducerConfig;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use producer_perf_core::client::{AsyncProducer, Completion, Delivery, ProducerClient};
use producer_perf_core::{
    ClientError, DeliveryError, MetricsRegistry, OutboundMessage, ProducerMetrics,
};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Pause before retrying an enqueue rejected because the local queue is full.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(1);

/// Upper bound on waiting for outstanding messages at close.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct KafkaProducer {
    producer: FutureProducer,
    metrics: ProducerMetrics,
    channel_buffer_size: usize,
}

impl KafkaProducer {
    /// Create the producer. Does not contact the brokers yet.
    pub fn new(config: &KafkaProducerConfig) -> Result<Self, ClientError> {
        let producer: FutureProducer = config
            .to_client_config()
            .create()
            .map_err(|e| ClientError::Create(e.to_string()))?;

        info!(
            "Created Kafka producer for brokers {}",
            config.brokers.join(",")
        );

        Ok(Self {
            producer,
            metrics: ProducerMetrics::new(Arc::new(MetricsRegistry::new())),
            channel_buffer_size: config.channel_buffer_size.max(1),
        })
    }
}

fn record(message: &OutboundMessage) -> FutureRecord<'_, (), [u8]> {
    let record = FutureRecord::to(&message.topic).payload(message.payload.as_ref());
    match message.target_partition() {
        Some(partition) => record.partition(partition),
        None => record,
    }
}

/// Hand one message to librdkafka, waiting while its local queue is full.
async fn enqueue(
    producer: &FutureProducer,
    message: &OutboundMessage,
) -> Result<DeliveryFuture, DeliveryError> {
    loop {
        match producer.send_result(record(message)) {
            Ok(delivery) => return Ok(delivery),
            Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), _)) => {
                tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
            }
            Err((e, _)) => return Err(DeliveryError::Send(e.to_string())),
        }
    }
}

/// Drive one async session: enqueue everything from `inbox`, report every delivery.
async fn pump_session(
    producer: FutureProducer,
    metrics: ProducerMetrics,
    mut inbox: mpsc::Receiver<OutboundMessage>,
    outbox: mpsc::Sender<Completion>,
) {
    let mut in_flight = FuturesUnordered::new();
    let mut input_open = true;

    loop {
        tokio::select! {
            message = inbox.recv(), if input_open => {
                let Some(message) = message else {
                    input_open = false;
                    continue;
                };
                let started = Instant::now();
                let bytes = message.len();
                metrics.on_enqueue();
                match enqueue(&producer, &message).await {
                    Ok(delivery) => {
                        in_flight.push(async move { (delivery.await, started, bytes) });
                    }
                    Err(e) => {
                        metrics.on_complete(started.elapsed(), bytes, false);
                        if outbox.send(Err(e)).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Some((result, started, bytes)) = in_flight.next(), if !in_flight.is_empty() => {
                let completion = match result {
                    Ok(Ok((partition, offset))) => Ok(Delivery { partition, offset }),
                    Ok(Err((e, _))) => Err(DeliveryError::Send(e.to_string())),
                    Err(_) => Err(DeliveryError::Send("delivery report was dropped".to_string())),
                };
                metrics.on_complete(started.elapsed(), bytes, completion.is_ok());
                if outbox.send(completion).await.is_err() {
                    break;
                }
            }
            else => break,
        }
    }

    debug!("Kafka async session finished");
}

#[async_trait]
impl ProducerClient for KafkaProducer {
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, DeliveryError> {
        let started = Instant::now();
        self.metrics.on_enqueue();

        let result = self.producer.send(record(message), Timeout::Never).await;

        self.metrics.on_complete(started.elapsed(), message.len(), result.is_ok());
        result
            .map(|(partition, offset)| Delivery { partition, offset })
            .map_err(|(e, _)| DeliveryError::Send(e.to_string()))
    }

    fn open_async(&self) -> AsyncProducer {
        let (input, inbox) = mpsc::channel(self.channel_buffer_size);
        let (outbox, completions) = mpsc::channel(self.channel_buffer_size);

        tokio::spawn(pump_session(
            self.producer.clone(),
            self.metrics.clone(),
            inbox,
            outbox,
        ));

        AsyncProducer { input, completions }
    }

    fn registry(&self) -> Arc<MetricsRegistry> {
        Arc::clone(self.metrics.registry())
    }

    async fn close(&self) -> Result<(), ClientError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(CLOSE_TIMEOUT)))
            .await
            .map_err(|e| ClientError::Close(e.to_string()))?
            .map_err(|e| ClientError::Close(e.to_string()))?;

        info!("Kafka producer flushed and closed");
        Ok(())
    }
}
