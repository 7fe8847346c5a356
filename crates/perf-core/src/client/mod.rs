//! Boundary to the producer client that talks to the broker.
//!
//! The benchmark only needs four capabilities from a client: a blocking send, an
//! asynchronous session (input plus completion notifications), the client's metrics
//! registry, and close. Implementations must be safe to share between concurrent
//! senders.

pub mod memory;

pub use memory::InMemoryProducer;

use crate::error::{ClientError, DeliveryError};
use crate::message::OutboundMessage;
use crate::metrics::MetricsRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Where the broker stored an acknowledged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// One notification per accepted message: `Ok` on success, `Err` on failure.
pub type Completion = Result<Delivery, DeliveryError>;

/// An open asynchronous producer session.
///
/// Messages pushed into `input` are sent in the background; `completions` yields exactly
/// one notification for every message the client accepted. Dropping `input` tells the
/// client no more messages will follow.
pub struct AsyncProducer {
    pub input: mpsc::Sender<OutboundMessage>,
    pub completions: mpsc::Receiver<Completion>,
}

#[async_trait]
pub trait ProducerClient: Send + Sync {
    /// Send one message and wait for the broker's acknowledgement.
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, DeliveryError>;

    /// Start an asynchronous session. Must be called within a tokio runtime.
    fn open_async(&self) -> AsyncProducer;

    /// The registry this client records its metrics into.
    fn registry(&self) -> Arc<MetricsRegistry>;

    /// Flush outstanding work and shut the client down.
    async fn close(&self) -> Result<(), ClientError>;
}
