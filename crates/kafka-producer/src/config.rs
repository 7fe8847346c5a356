//! Kafka client tunables and their translation into librdkafka properties.

use producer_perf_core::ConfigError;
use rdkafka::ClientConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Transport security towards the brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityProtocol {
    #[default]
    Plaintext,
    Ssl,
}

impl FromStr for SecurityProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAINTEXT" => Ok(SecurityProtocol::Plaintext),
            "SSL" => Ok(SecurityProtocol::Ssl),
            other => Err(ConfigError::UnknownScheme {
                kind: "security-protocol",
                value: other.to_string(),
            }),
        }
    }
}

/// How the client picks a partition for messages without an explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partitioner {
    /// Hash of the message key
    Hash,
    /// Use the partition set on each message
    Manual,
    Random,
    #[default]
    RoundRobin,
}

impl FromStr for Partitioner {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hash" => Ok(Partitioner::Hash),
            "manual" => Ok(Partitioner::Manual),
            "random" => Ok(Partitioner::Random),
            "roundrobin" => Ok(Partitioner::RoundRobin),
            other => Err(ConfigError::UnknownScheme {
                kind: "partitioner",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Snappy,
    Lz4,
}

impl Compression {
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Snappy => "snappy",
            Compression::Lz4 => "lz4",
        }
    }
}

impl FromStr for Compression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "snappy" => Ok(Compression::Snappy),
            "lz4" => Ok(Compression::Lz4),
            other => Err(ConfigError::UnknownScheme {
                kind: "compression",
                value: other.to_string(),
            }),
        }
    }
}

/// Acknowledgements the broker must collect before answering a produce request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredAcks {
    /// Every in-sync replica (-1)
    All,
    /// No acknowledgement at all (0)
    None,
    /// The partition leader only (1)
    #[default]
    Leader,
}

impl RequiredAcks {
    pub fn as_i32(self) -> i32 {
        match self {
            RequiredAcks::All => -1,
            RequiredAcks::None => 0,
            RequiredAcks::Leader => 1,
        }
    }
}

impl TryFrom<i32> for RequiredAcks {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(RequiredAcks::All),
            0 => Ok(RequiredAcks::None),
            1 => Ok(RequiredAcks::Leader),
            other => Err(ConfigError::invalid(
                "required-acks",
                format!("must be -1, 0 or 1, got {other}"),
            )),
        }
    }
}

impl fmt::Display for RequiredAcks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// PEM files used when the security protocol is SSL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsFiles {
    /// Root CAs to trust; the system store when unset
    pub ca_certs: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

/// Configuration of the Kafka producer client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaProducerConfig {
    pub brokers: Vec<String>,
    pub security_protocol: SecurityProtocol,
    pub tls: TlsFiles,
    /// Unacknowledged requests per connection before the client blocks
    pub max_open_requests: u32,
    pub max_message_bytes: u32,
    pub required_acks: RequiredAcks,
    /// How long the broker may take to collect the required acks
    pub timeout: Duration,
    pub partitioner: Partitioner,
    pub compression: Compression,
    /// Best-effort time between flushes, zero for the client default
    pub flush_frequency: Duration,
    pub flush_bytes: u32,
    pub flush_messages: u32,
    /// Largest number of messages in one produce request, zero for the client default
    pub flush_max_messages: u32,
    pub client_id: String,
    /// Capacity of the async input and completion channels
    pub channel_buffer_size: usize,
    /// Assumed broker version, used until the broker reports its own
    pub version: Option<String>,
    pub verbose: bool,
}

impl Default for KafkaProducerConfig {
    fn default() -> Self {
        Self {
            brokers: Vec::new(),
            security_protocol: SecurityProtocol::default(),
            tls: TlsFiles::default(),
            max_open_requests: 5,
            max_message_bytes: 1_000_000,
            required_acks: RequiredAcks::default(),
            timeout: Duration::from_secs(10),
            partitioner: Partitioner::default(),
            compression: Compression::default(),
            flush_frequency: Duration::ZERO,
            flush_bytes: 0,
            flush_messages: 0,
            flush_max_messages: 0,
            client_id: "kafka-producer-perf".to_string(),
            channel_buffer_size: 256,
            version: None,
            verbose: false,
        }
    }
}

impl KafkaProducerConfig {
    /// Parse a comma separated broker list, dropping blank entries.
    pub fn parse_brokers(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check the settings against the destination `partition` of the run.
    pub fn validate(&self, partition: i32) -> Result<(), ConfigError> {
        if self.brokers.is_empty() {
            return Err(ConfigError::Missing("brokers"));
        }
        if self.partitioner == Partitioner::Manual && partition < 0 {
            return Err(ConfigError::invalid("partition", "must not be -1 for partitioner=manual"));
        }
        if self.tls.client_cert.is_some() && self.tls.client_key.is_none() {
            return Err(ConfigError::Missing("tls-client-key"));
        }
        if self.max_open_requests == 0 {
            return Err(ConfigError::invalid("max-open-requests", "must be greater than 0"));
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::invalid("max-message-bytes", "must be greater than 0"));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::invalid("timeout", "must be greater than 0"));
        }
        if self.channel_buffer_size == 0 {
            return Err(ConfigError::invalid("channel-buffer-size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Connection settings shared by the producer and the admin client.
    pub fn connection_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.brokers.join(","))
            .set("client.id", &self.client_id);

        if self.security_protocol == SecurityProtocol::Ssl {
            config.set("security.protocol", "ssl");
            if let Some(path) = &self.tls.ca_certs {
                config.set("ssl.ca.location", path.to_string_lossy());
            }
            if let Some(path) = &self.tls.client_cert {
                config.set("ssl.certificate.location", path.to_string_lossy());
            }
            if let Some(path) = &self.tls.client_key {
                config.set("ssl.key.location", path.to_string_lossy());
            }
        }

        if let Some(version) = &self.version {
            config
                .set("api.version.request", "false")
                .set("broker.version.fallback", version);
        }
        if self.verbose {
            config.set("debug", "broker,topic,msg");
        }
        config
    }

    /// Full producer configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = self.connection_config();
        config
            .set("acks", self.required_acks.to_string())
            .set("request.timeout.ms", millis(self.timeout))
            .set("message.max.bytes", self.max_message_bytes.to_string())
            .set(
                "max.in.flight.requests.per.connection",
                self.max_open_requests.to_string(),
            )
            .set("compression.codec", self.compression.as_str());

        match self.partitioner {
            Partitioner::Hash => {
                config.set("partitioner", "fnv1a_random");
            }
            Partitioner::Random => {
                config.set("partitioner", "random");
            }
            Partitioner::RoundRobin => {
                // Per-message random choice spreads keyless messages evenly.
                config
                    .set("partitioner", "random")
                    .set("sticky.partitioning.linger.ms", "0");
            }
            // Every message carries its partition.
            Partitioner::Manual => {}
        }

        if !self.flush_frequency.is_zero() {
            config.set("linger.ms", millis(self.flush_frequency));
        }
        if self.flush_bytes > 0 {
            config.set("batch.size", self.flush_bytes.to_string());
        }
        if self.flush_max_messages > 0 {
            config.set("batch.num.messages", self.flush_max_messages.to_string());
        }
        if self.flush_messages > 0 {
            warn!(
                "flush-messages={} has no librdkafka equivalent and is ignored",
                self.flush_messages
            );
        }

        config
    }
}

fn millis(duration: Duration) -> String {
    duration.as_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KafkaProducerConfig {
        KafkaProducerConfig {
            brokers: vec!["localhost:9092".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_brokers() {
        assert_eq!(
            KafkaProducerConfig::parse_brokers("a:9092, b:9092,,"),
            vec!["a:9092".to_string(), "b:9092".to_string()]
        );
        assert!(KafkaProducerConfig::parse_brokers("").is_empty());
    }

    #[test]
    fn test_defaults_translate_to_producer_properties() {
        let client = config().to_client_config();
        assert_eq!(client.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(client.get("acks"), Some("1"));
        assert_eq!(client.get("request.timeout.ms"), Some("10000"));
        assert_eq!(client.get("message.max.bytes"), Some("1000000"));
        assert_eq!(
            client.get("max.in.flight.requests.per.connection"),
            Some("5")
        );
        assert_eq!(client.get("compression.codec"), Some("none"));
        assert_eq!(client.get("partitioner"), Some("random"));
        assert_eq!(client.get("sticky.partitioning.linger.ms"), Some("0"));
        assert_eq!(client.get("linger.ms"), None);
        assert_eq!(client.get("security.protocol"), None);
        assert_eq!(client.get("debug"), None);
    }

    #[test]
    fn test_flush_and_tls_settings() {
        let client = KafkaProducerConfig {
            security_protocol: SecurityProtocol::Ssl,
            tls: TlsFiles {
                ca_certs: Some("/etc/ca.pem".into()),
                client_cert: Some("/etc/client.pem".into()),
                client_key: Some("/etc/client.key".into()),
            },
            flush_frequency: Duration::from_millis(250),
            flush_bytes: 65_536,
            flush_max_messages: 500,
            required_acks: RequiredAcks::All,
            compression: Compression::Lz4,
            partitioner: Partitioner::Hash,
            version: Some("2.8.0".to_string()),
            verbose: true,
            ..config()
        }
        .to_client_config();

        assert_eq!(client.get("security.protocol"), Some("ssl"));
        assert_eq!(client.get("ssl.ca.location"), Some("/etc/ca.pem"));
        assert_eq!(client.get("ssl.certificate.location"), Some("/etc/client.pem"));
        assert_eq!(client.get("ssl.key.location"), Some("/etc/client.key"));
        assert_eq!(client.get("linger.ms"), Some("250"));
        assert_eq!(client.get("batch.size"), Some("65536"));
        assert_eq!(client.get("batch.num.messages"), Some("500"));
        assert_eq!(client.get("acks"), Some("-1"));
        assert_eq!(client.get("compression.codec"), Some("lz4"));
        assert_eq!(client.get("partitioner"), Some("fnv1a_random"));
        assert_eq!(client.get("broker.version.fallback"), Some("2.8.0"));
        assert_eq!(client.get("debug"), Some("broker,topic,msg"));
    }

    #[test]
    fn test_manual_partitioner_needs_partition() {
        let manual = KafkaProducerConfig {
            partitioner: Partitioner::Manual,
            ..config()
        };
        assert!(manual.validate(-1).is_err());
        assert!(manual.validate(2).is_ok());
        assert_eq!(manual.to_client_config().get("partitioner"), None);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            KafkaProducerConfig::default().validate(-1),
            Err(ConfigError::Missing("brokers"))
        ));

        let cert_without_key = KafkaProducerConfig {
            tls: TlsFiles {
                client_cert: Some("/etc/client.pem".into()),
                ..Default::default()
            },
            ..config()
        };
        assert!(matches!(
            cert_without_key.validate(-1),
            Err(ConfigError::Missing("tls-client-key"))
        ));

        let zero_timeout = KafkaProducerConfig {
            timeout: Duration::ZERO,
            ..config()
        };
        assert!(zero_timeout.validate(-1).is_err());
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("SSL".parse::<SecurityProtocol>().unwrap(), SecurityProtocol::Ssl);
        assert!("TLS".parse::<SecurityProtocol>().is_err());
        assert_eq!("snappy".parse::<Compression>().unwrap(), Compression::Snappy);
        assert!(matches!(
            "zstd".parse::<Compression>(),
            Err(ConfigError::UnknownScheme {
                kind: "compression",
                ..
            })
        ));
        assert_eq!("roundrobin".parse::<Partitioner>().unwrap(), Partitioner::RoundRobin);
        assert!("sticky".parse::<Partitioner>().is_err());
        assert_eq!(RequiredAcks::try_from(-1).unwrap(), RequiredAcks::All);
        assert!(RequiredAcks::try_from(2).is_err());
    }
}
