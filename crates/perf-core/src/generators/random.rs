//! Fixed-size payloads filled from the operating system's random source.

use crate::error::GeneratorError;
use crate::generator::{MessageGenerator, MessageStream};
use crate::message::GenerationJob;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;

/// Generates `message_size` bytes of fresh random data per message.
#[derive(Debug, Clone)]
pub struct RandomMessageGenerator {
    message_size: usize,
}

impl RandomMessageGenerator {
    pub fn new(message_size: usize) -> Self {
        Self { message_size }
    }
}

impl MessageGenerator for RandomMessageGenerator {
    fn generate(&self, job: GenerationJob) -> MessageStream {
        let size = self.message_size;
        MessageStream::spawn(job.count, move |tx| async move {
            info!(
                "RandomMessageGenerator is generating {} messages of {} bytes",
                job.count, size
            );
            let mut emitted = 0u64;
            while emitted < job.count {
                let mut payload = vec![0u8; size];
                // Random source failures abort the run.
                OsRng.try_fill_bytes(&mut payload)?;
                if tx.send(job.message(payload)).await.is_err() {
                    // Dispatcher went away.
                    break;
                }
                emitted += 1;
            }
            Ok::<_, GeneratorError>(emitted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emits_exactly_count_messages() {
        let generator = RandomMessageGenerator::new(16);
        let mut stream = generator.generate(GenerationJob::new("bench", -1, 100));

        let mut received = 0;
        while let Some(message) = stream.recv().await {
            assert_eq!(message.topic, "bench");
            assert_eq!(message.partition, -1);
            assert_eq!(message.len(), 16);
            received += 1;
        }

        assert_eq!(received, 100);
        assert_eq!(stream.finish().await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_single_message_load() {
        let generator = RandomMessageGenerator::new(8);
        let mut stream = generator.generate(GenerationJob::new("bench", 2, 1));

        let message = stream.recv().await.expect("one message");
        assert_eq!(message.partition, 2);
        assert!(stream.recv().await.is_none());
        assert_eq!(stream.finish().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_payloads_differ() {
        let generator = RandomMessageGenerator::new(32);
        let mut stream = generator.generate(GenerationJob::new("bench", -1, 2));

        let first = stream.recv().await.unwrap();
        let second = stream.recv().await.unwrap();
        assert_ne!(first.payload, second.payload);
    }

    #[tokio::test]
    async fn test_dropped_consumer_stops_generation() {
        let generator = RandomMessageGenerator::new(4);
        let mut stream = generator.generate(GenerationJob::new("bench", -1, 10_000));

        assert!(stream.recv().await.is_some());
        let emitted = stream.finish().await.unwrap();
        assert!(emitted < 10_000);
    }
}
