//! Load generation and dispatch engine for the producer benchmark.
//!
//! A run generates a stream of payloads (random bytes or records cycled from a file),
//! pushes them through a [`ProducerClient`] in synchronous or asynchronous mode,
//! optionally paced to a target throughput, and prints a metrics line every report
//! interval plus once at the end.

pub mod client;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod generators;
pub mod message;
pub mod metrics;
pub mod pacer;
pub mod plan;
pub mod reporter;
pub mod runner;

pub use client::{AsyncProducer, Completion, Delivery, InMemoryProducer, ProducerClient};
pub use config::{DispatchMode, PayloadSource, RunConfig, RunSettings};
pub use decoder::DecoderScheme;
pub use error::{
    ClientError, ConfigError, DecodeError, DeliveryError, GeneratorError, PerfError,
    EXIT_FAILURE, EXIT_USAGE,
};
pub use generator::{MessageGenerator, MessageStream};
pub use message::{GenerationJob, OutboundMessage, ANY_PARTITION};
pub use metrics::{MetricsRegistry, MetricsSnapshot, ProducerMetrics};
pub use runner::{run_benchmark, RunSummary};
