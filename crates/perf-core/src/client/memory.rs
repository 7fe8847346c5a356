//! Producer client that acknowledges messages locally.
//!
//! Used for dry runs and tests: it exercises the whole harness (generation, pacing,
//! dispatch, metrics) without a broker.

use super::{AsyncProducer, Completion, Delivery, ProducerClient};
use crate::error::{ClientError, DeliveryError};
use crate::message::OutboundMessage;
use crate::metrics::{MetricsRegistry, ProducerMetrics};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// Default capacity of the async input and completion channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

#[derive(Debug)]
struct Shared {
    metrics: ProducerMetrics,
    latency: Duration,
    fail_at: Option<u64>,
    record: bool,
    accepted: AtomicU64,
    delivered: AtomicU64,
    delivered_bytes: AtomicU64,
    sent: Mutex<Vec<OutboundMessage>>,
    closed: AtomicBool,
}

impl Shared {
    /// Acknowledge one message, honouring the simulated latency and injected failure.
    async fn deliver(&self, message: &OutboundMessage) -> Completion {
        if self.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::Send("producer is closed".to_string()));
        }

        let index = self.accepted.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        self.metrics.on_enqueue();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_at == Some(index) {
            self.metrics.on_complete(started.elapsed(), message.len(), false);
            return Err(DeliveryError::Send(format!(
                "injected failure for message {index}"
            )));
        }

        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.delivered_bytes.fetch_add(message.len() as u64, Ordering::Relaxed);
        if self.record {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.clone());
        }
        self.metrics.on_complete(started.elapsed(), message.len(), true);

        Ok(Delivery {
            partition: message.target_partition().unwrap_or(0),
            offset: i64::try_from(index).unwrap_or(i64::MAX),
        })
    }
}

/// In-process producer client.
#[derive(Debug, Clone)]
pub struct InMemoryProducer {
    shared: Arc<Shared>,
    channel_buffer: usize,
}

impl Default for InMemoryProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProducer {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                metrics: ProducerMetrics::new(Arc::new(MetricsRegistry::new())),
                latency: Duration::ZERO,
                fail_at: None,
                record: false,
                accepted: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                delivered_bytes: AtomicU64::new(0),
                sent: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }

    /// Delay every acknowledgement by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.configure(|shared| shared.latency = latency)
    }

    /// Fail the message with 0-based send index `index`.
    pub fn failing_at(self, index: u64) -> Self {
        self.configure(|shared| shared.fail_at = Some(index))
    }

    /// Keep a copy of every acknowledged message.
    pub fn recording(self) -> Self {
        self.configure(|shared| shared.record = true)
    }

    pub fn with_channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size.max(1);
        self
    }

    fn configure(self, apply: impl FnOnce(&mut Shared)) -> Self {
        let mut shared = Arc::try_unwrap(self.shared).unwrap_or_else(|arc| Shared {
            metrics: arc.metrics.clone(),
            latency: arc.latency,
            fail_at: arc.fail_at,
            record: arc.record,
            accepted: AtomicU64::new(arc.accepted.load(Ordering::Relaxed)),
            delivered: AtomicU64::new(arc.delivered.load(Ordering::Relaxed)),
            delivered_bytes: AtomicU64::new(arc.delivered_bytes.load(Ordering::Relaxed)),
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(arc.closed.load(Ordering::Relaxed)),
        });
        apply(&mut shared);
        Self {
            shared: Arc::new(shared),
            channel_buffer: self.channel_buffer,
        }
    }

    /// Number of messages handed to the client, including failed ones.
    pub fn accepted(&self) -> u64 {
        self.shared.accepted.load(Ordering::Relaxed)
    }

    /// Number of acknowledged messages.
    pub fn delivered(&self) -> u64 {
        self.shared.delivered.load(Ordering::Relaxed)
    }

    pub fn delivered_bytes(&self) -> u64 {
        self.shared.delivered_bytes.load(Ordering::Relaxed)
    }

    /// Acknowledged messages in acknowledgement order (only when recording).
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.shared
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ProducerClient for InMemoryProducer {
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, DeliveryError> {
        self.shared.deliver(message).await
    }

    fn open_async(&self) -> AsyncProducer {
        let (input, mut inbox) = mpsc::channel::<OutboundMessage>(self.channel_buffer);
        let (outbox, completions) = mpsc::channel::<Completion>(self.channel_buffer);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            while let Some(message) = inbox.recv().await {
                let completion = shared.deliver(&message).await;
                if outbox.send(completion).await.is_err() {
                    debug!("completion receiver dropped, stopping in-memory producer");
                    break;
                }
            }
        });

        AsyncProducer { input, completions }
    }

    fn registry(&self) -> Arc<MetricsRegistry> {
        Arc::clone(self.shared.metrics.registry())
    }

    async fn close(&self) -> Result<(), ClientError> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Close("producer already closed".to_string()));
        }
        debug!(delivered = self.delivered(), "in-memory producer closed");
        Ok(())
    }
}
