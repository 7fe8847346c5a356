//! Kafka producer client for the producer benchmark.
//!
//! Binds the benchmark's [`ProducerClient`](producer_perf_core::ProducerClient) boundary to
//! librdkafka through `rdkafka`:
//!
//! - **Configuration**: the tool's client flags translated into librdkafka properties
//! - **Producer**: blocking sends and asynchronous sessions, instrumented with the four
//!   producer metrics the reporter prints
//! - **Topic management**: optional creation of the destination topic before a run
//!
//! ## Usage
//!
//! ```rust,no_run
//! use producer_perf_kafka::{create_topic_if_not_exists, KafkaProducer, KafkaProducerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KafkaProducerConfig {
//!     brokers: vec!["localhost:9092".to_string()],
//!     ..Default::default()
//! };
//! config.validate(-1)?;
//! create_topic_if_not_exists(&config, "perf-test", 3).await?;
//! let producer = KafkaProducer::new(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod producer;
mod topic;

pub use config::{
    Compression, KafkaProducerConfig, Partitioner, RequiredAcks, SecurityProtocol, TlsFiles,
};
pub use producer::KafkaProducer;
pub use topic::create_topic_if_not_exists;
