//! Command-line flags.

use crate::duration::parse_duration;
use clap::Parser;
use producer_perf_core::{ConfigError, RunSettings, ANY_PARTITION};
use producer_perf_kafka::{KafkaProducerConfig, RequiredAcks, TlsFiles};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kafka-producer-perf",
    version,
    about = "Load generator and benchmark for the Kafka producer",
    long_about = "Produces a configurable number of messages to a topic, either synchronously \
                  from several workers or through one asynchronous pipeline, optionally capped \
                  to a target throughput, and prints producer metrics every report interval."
)]
pub struct Args {
    /// Use a synchronous producer
    #[arg(long)]
    pub sync: bool,

    /// REQUIRED: the number of messages to produce to --topic
    #[arg(long, default_value_t = 0)]
    pub message_load: u64,

    /// (OR --message-file) the size in bytes of each message
    #[arg(long, default_value_t = 0)]
    pub message_size: usize,

    /// (OR --message-size) file holding the message payloads, one per line
    #[arg(long, value_name = "PATH")]
    pub message_file: Option<PathBuf>,

    /// Decoder for the lines of --message-file (raw, hex, base64)
    #[arg(long, default_value = "raw")]
    pub message_decoder: String,

    /// REQUIRED: comma separated list of broker addresses
    #[arg(long, env = "KAFKA_BROKERS", default_value = "")]
    pub brokers: String,

    /// Security protocol towards the brokers (PLAINTEXT, SSL)
    #[arg(long, default_value = "PLAINTEXT")]
    pub security_protocol: String,

    /// PEM file with the root CAs to trust with SSL (system roots when unset)
    #[arg(long, value_name = "PATH")]
    pub tls_ca_certs: Option<PathBuf>,

    /// PEM client certificate for SSL client authentication
    #[arg(long, value_name = "PATH")]
    pub tls_client_cert: Option<PathBuf>,

    /// PEM private key for --tls-client-cert (required with it)
    #[arg(long, value_name = "PATH")]
    pub tls_client_key: Option<PathBuf>,

    /// REQUIRED: the topic to run the benchmark on
    #[arg(long, default_value = "")]
    pub topic: String,

    /// Partition of --topic to produce to, -1 to let the partitioner choose
    #[arg(long, default_value_t = ANY_PARTITION, allow_negative_numbers = true)]
    pub partition: i32,

    /// Maximum messages per second per sender (0 for no limit)
    #[arg(long, default_value_t = 0)]
    pub throughput: u32,

    /// Unacknowledged requests per connection before the client blocks
    #[arg(long, default_value_t = 5)]
    pub max_open_requests: u32,

    /// Largest permitted message size
    #[arg(long, default_value_t = 1_000_000)]
    pub max_message_bytes: u32,

    /// Acks required from the broker (-1: all, 0: none, 1: leader)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub required_acks: i32,

    /// How long the broker may take to collect --required-acks
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Partitioning scheme (hash, manual, random, roundrobin)
    #[arg(long, default_value = "roundrobin")]
    pub partitioner: String,

    /// Compression codec (none, gzip, snappy, lz4)
    #[arg(long, default_value = "none")]
    pub compression: String,

    /// Best-effort time between flushes
    #[arg(long, default_value = "0", value_parser = parse_duration)]
    pub flush_frequency: Duration,

    /// Best-effort number of bytes that triggers a flush
    #[arg(long, default_value_t = 0)]
    pub flush_bytes: u32,

    /// Best-effort number of messages that triggers a flush
    #[arg(long, default_value_t = 0)]
    pub flush_messages: u32,

    /// Maximum number of messages in a single request
    #[arg(long, default_value_t = 0)]
    pub flush_max_messages: u32,

    /// Client id sent with every request
    #[arg(long, default_value = "kafka-producer-perf")]
    pub client_id: String,

    /// Number of messages buffered between the benchmark and the client
    #[arg(long, default_value_t = 256)]
    pub channel_buffer_size: usize,

    /// Number of concurrent senders (--sync only)
    #[arg(long, default_value_t = 1)]
    pub routines: usize,

    /// Assumed broker version
    #[arg(long, value_name = "VERSION")]
    pub kafka_version: Option<String>,

    /// Debug logging, including the Kafka client's own
    #[arg(long)]
    pub verbose: bool,

    /// Interval between metrics lines
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub report_interval: Duration,

    /// Create --topic before producing if it does not exist
    #[arg(long)]
    pub create_topic: bool,

    /// Partition count for --create-topic
    #[arg(long, default_value_t = 1)]
    pub topic_partitions: i32,

    /// Acknowledge messages in memory instead of sending them to Kafka
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Run parameters for the benchmark engine.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            sync: self.sync,
            message_load: self.message_load,
            message_size: self.message_size,
            message_file: self.message_file.clone(),
            message_decoder: self.message_decoder.clone(),
            workers: self.routines,
            throughput: self.throughput,
            topic: self.topic.clone(),
            partition: self.partition,
            report_interval: self.report_interval,
        }
    }

    /// Kafka client settings. Parses the scheme names but does not validate the
    /// combination; see [`KafkaProducerConfig::validate`].
    pub fn kafka_config(&self) -> Result<KafkaProducerConfig, ConfigError> {
        Ok(KafkaProducerConfig {
            brokers: KafkaProducerConfig::parse_brokers(&self.brokers),
            security_protocol: self.security_protocol.parse()?,
            tls: TlsFiles {
                ca_certs: self.tls_ca_certs.clone(),
                client_cert: self.tls_client_cert.clone(),
                client_key: self.tls_client_key.clone(),
            },
            max_open_requests: self.max_open_requests,
            max_message_bytes: self.max_message_bytes,
            required_acks: RequiredAcks::try_from(self.required_acks)?,
            timeout: self.timeout,
            partitioner: self.partitioner.parse()?,
            compression: self.compression.parse()?,
            flush_frequency: self.flush_frequency,
            flush_bytes: self.flush_bytes,
            flush_messages: self.flush_messages,
            flush_max_messages: self.flush_max_messages,
            client_id: self.client_id.clone(),
            channel_buffer_size: self.channel_buffer_size,
            version: self.kafka_version.clone(),
            verbose: self.verbose,
        })
    }
}
