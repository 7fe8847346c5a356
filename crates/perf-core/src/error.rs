//! Error types for the producer benchmark.
//!
//! Errors are grouped by the phase they can occur in. Configuration errors are raised
//! before any message is generated; everything else means the run itself failed.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for an invalid invocation (bad flags, unknown schemes, unusable inputs).
pub const EXIT_USAGE: i32 = 64;

/// Exit status for a failure that happened while the benchmark was running.
pub const EXIT_FAILURE: i32 = 69;

/// Invalid or unusable configuration, detected before dispatch starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("unknown {kind}: {value}")]
    UnknownScheme { kind: &'static str, value: String },

    #[error("failed to open message file {path:?}: {source}")]
    OpenMessageFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan message file {path:?}: {source}")]
    ReadMessageFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("message file {0:?} contains no non-empty lines")]
    EmptyRecordPool(PathBuf),
}

impl ConfigError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// A line of the message file could not be decoded with the selected scheme.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Failures while producing the message stream.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("failed to generate message payload: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("failed to decode message data on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error("generator task failed: {0}")]
    Task(String),
}

/// The producer client could not deliver a message.
#[derive(Error, Debug, Clone)]
pub enum DeliveryError {
    #[error("failed to send message: {0}")]
    Send(String),

    #[error("completion stream closed after {observed} of {expected} notifications")]
    CompletionsClosed { observed: u64, expected: u64 },

    #[error("producer input closed before all messages were accepted")]
    InputClosed,

    #[error("dispatch task failed: {0}")]
    Task(String),
}

/// Failures of the producer client itself (construction, shutdown).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to create producer: {0}")]
    Create(String),

    #[error("failed to close producer: {0}")]
    Close(String),

    #[error("failed to create topic: {0}")]
    Topic(String),
}

/// Top-level error returned by a benchmark run.
#[derive(Error, Debug)]
pub enum PerfError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to write metrics: {0}")]
    Report(#[from] std::io::Error),
}

impl PerfError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PerfError::Config(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_usage_error(&self) -> bool {
        matches!(self, PerfError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, PerfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config: PerfError = ConfigError::Missing("topic").into();
        assert_eq!(config.exit_code(), EXIT_USAGE);
        assert!(config.is_usage_error());

        let delivery: PerfError = DeliveryError::Send("broker down".to_string()).into();
        assert_eq!(delivery.exit_code(), EXIT_FAILURE);
        assert!(!delivery.is_usage_error());

        let empty: PerfError = ConfigError::EmptyRecordPool(PathBuf::from("m.txt")).into();
        assert_eq!(empty.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ConfigError::Missing("topic").to_string(), "topic is required");
        assert_eq!(
            ConfigError::UnknownScheme {
                kind: "message decoder",
                value: "zlib".to_string()
            }
            .to_string(),
            "unknown message decoder: zlib"
        );
        assert_eq!(
            DeliveryError::CompletionsClosed {
                observed: 3,
                expected: 5
            }
            .to_string(),
            "completion stream closed after 3 of 5 notifications"
        );
    }
}
