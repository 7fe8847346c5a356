//! Message generator contract and the bounded stream it produces.

use crate::error::GeneratorError;
use crate::message::{GenerationJob, OutboundMessage};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Upper bound on the generator-to-dispatcher buffer.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Buffer size for a stream of `count` messages: a quarter of the load, capped.
///
/// Never zero, since a zero-capacity bounded channel cannot be created.
pub fn channel_capacity(count: u64) -> usize {
    let quarter = usize::try_from(count / 4).unwrap_or(usize::MAX);
    quarter.clamp(1, MAX_CHANNEL_CAPACITY)
}

/// Produces a bounded stream of outbound messages for one benchmark job.
///
/// Implementations spawn a background task that writes exactly `job.count` messages
/// and then closes the stream. Must be called from within a tokio runtime.
pub trait MessageGenerator: Send + Sync {
    fn generate(&self, job: GenerationJob) -> MessageStream;
}

/// Receiving side of a generator run.
///
/// `recv` yields messages in index order and returns `None` once the generator closed
/// the channel. `finish` reports whether the generator stopped because it was done or
/// because it failed.
pub struct MessageStream {
    receiver: mpsc::Receiver<OutboundMessage>,
    task: JoinHandle<Result<u64, GeneratorError>>,
}

impl MessageStream {
    /// Spawn `producer` with the sending half of a channel sized for `count` messages.
    pub(crate) fn spawn<F, Fut>(count: u64, producer: F) -> Self
    where
        F: FnOnce(mpsc::Sender<OutboundMessage>) -> Fut,
        Fut: Future<Output = Result<u64, GeneratorError>> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(channel_capacity(count));
        let task = tokio::spawn(producer(sender));
        Self { receiver, task }
    }

    /// Next message, or `None` when the generator closed its stream.
    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        self.receiver.recv().await
    }

    /// Wait for the generator task and return how many messages it emitted.
    pub async fn finish(self) -> Result<u64, GeneratorError> {
        drop(self.receiver);
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(GeneratorError::Task(e.to_string())),
        }
    }
}
