//! Outbound message and generation job types.

use bytes::Bytes;

/// Partition index meaning "let the producer client choose".
pub const ANY_PARTITION: i32 = -1;

/// A message ready to be handed to the producer client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination topic
    pub topic: String,
    /// Destination partition, or [`ANY_PARTITION`]
    pub partition: i32,
    /// Message value
    pub payload: Bytes,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, partition: i32, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            payload: payload.into(),
        }
    }

    /// Explicit partition, if one was requested.
    pub fn target_partition(&self) -> Option<i32> {
        (self.partition >= 0).then_some(self.partition)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// How many messages a single generator instance must emit, and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub count: u64,
    pub topic: String,
    pub partition: i32,
}

impl GenerationJob {
    pub fn new(topic: impl Into<String>, partition: i32, count: u64) -> Self {
        Self {
            count,
            topic: topic.into(),
            partition,
        }
    }

    pub(crate) fn message(&self, payload: impl Into<Bytes>) -> OutboundMessage {
        OutboundMessage::new(self.topic.clone(), self.partition, payload)
    }
}
