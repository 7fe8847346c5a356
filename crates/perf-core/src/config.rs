//! Run configuration.
//!
//! [`RunSettings`] holds values exactly as the operator supplied them. Validating it
//! yields a [`RunConfig`], which is built once at startup and passed by reference to
//! every component of the run.

use crate::decoder::DecoderScheme;
use crate::error::ConfigError;
use crate::message::ANY_PARTITION;
use std::path::PathBuf;
use std::time::Duration;

/// Default cadence of the periodic metrics line.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Delivery model used to push messages through the producer client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One blocking round trip per message, spread over several workers
    Sync,
    /// Single pipeline with a background completion collector
    Async,
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchMode::Sync => write!(f, "sync"),
            DispatchMode::Async => write!(f, "async"),
        }
    }
}

/// Where message payloads come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Random { size: usize },
    File { path: PathBuf, scheme: DecoderScheme },
}

/// Unvalidated run parameters.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub sync: bool,
    pub message_load: u64,
    pub message_size: usize,
    pub message_file: Option<PathBuf>,
    pub message_decoder: String,
    pub workers: usize,
    pub throughput: u32,
    pub topic: String,
    pub partition: i32,
    pub report_interval: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            sync: false,
            message_load: 0,
            message_size: 0,
            message_file: None,
            message_decoder: DecoderScheme::Raw.to_string(),
            workers: 1,
            throughput: 0,
            topic: String::new(),
            partition: ANY_PARTITION,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl RunSettings {
    /// Check every parameter and build the immutable run configuration.
    ///
    /// Performs no I/O: the message file is only opened later, when the generator
    /// is built.
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        if self.topic.is_empty() {
            return Err(ConfigError::Missing("topic"));
        }
        if self.message_load == 0 {
            return Err(ConfigError::invalid("message-load", "must be greater than 0"));
        }
        if self.message_size == 0 && self.message_file.is_none() {
            return Err(ConfigError::invalid("message-size", "or message-file must be set"));
        }
        let workers_in_range =
            self.workers >= 1 && u64::try_from(self.workers).is_ok_and(|w| w <= self.message_load);
        if !workers_in_range {
            return Err(ConfigError::invalid(
                "routines",
                "must be greater than 0 and less than or equal to message-load",
            ));
        }
        if self.report_interval.is_zero() {
            return Err(ConfigError::invalid("report-interval", "must be greater than 0"));
        }

        let payload = match self.message_file {
            Some(path) => PayloadSource::File {
                path,
                scheme: self.message_decoder.parse()?,
            },
            None => PayloadSource::Random {
                size: self.message_size,
            },
        };

        Ok(RunConfig {
            mode: if self.sync {
                DispatchMode::Sync
            } else {
                DispatchMode::Async
            },
            message_load: self.message_load,
            payload,
            message_size: self.message_size,
            workers: self.workers,
            throughput: self.throughput,
            topic: self.topic,
            partition: self.partition,
            report_interval: self.report_interval,
        })
    }
}

/// Validated, immutable configuration of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: DispatchMode,
    /// Total number of messages to produce
    pub message_load: u64,
    pub payload: PayloadSource,
    /// Configured message size, used for the ingress estimate even for file payloads
    pub message_size: usize,
    /// Number of concurrent senders (sync mode only)
    pub workers: usize,
    /// Messages per second per sender, 0 for unlimited
    pub throughput: u32,
    pub topic: String,
    pub partition: i32,
    pub report_interval: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RunSettings {
        RunSettings {
            message_load: 10,
            message_size: 16,
            topic: "bench".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_to_async_random() {
        let config = valid().validate().unwrap();
        assert_eq!(config.mode, DispatchMode::Async);
        assert_eq!(config.payload, PayloadSource::Random { size: 16 });
        assert_eq!(config.partition, ANY_PARTITION);
        assert_eq!(config.report_interval, DEFAULT_REPORT_INTERVAL);
    }

    #[test]
    fn test_requires_topic() {
        let settings = RunSettings {
            topic: String::new(),
            ..valid()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing("topic"))
        ));
    }

    #[test]
    fn test_requires_positive_load() {
        let settings = RunSettings {
            message_load: 0,
            ..valid()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                name: "message-load",
                ..
            })
        ));
    }

    #[test]
    fn test_requires_size_or_file() {
        let settings = RunSettings {
            message_size: 0,
            ..valid()
        };
        assert!(settings.validate().is_err());

        let settings = RunSettings {
            message_size: 0,
            message_file: Some(PathBuf::from("messages.txt")),
            ..valid()
        };
        let config = settings.validate().unwrap();
        assert_eq!(
            config.payload,
            PayloadSource::File {
                path: PathBuf::from("messages.txt"),
                scheme: DecoderScheme::Raw
            }
        );
    }

    #[test]
    fn test_file_wins_over_size() {
        let settings = RunSettings {
            message_file: Some(PathBuf::from("messages.txt")),
            message_decoder: "base64".to_string(),
            ..valid()
        };
        let config = settings.validate().unwrap();
        assert!(matches!(
            config.payload,
            PayloadSource::File {
                scheme: DecoderScheme::Base64,
                ..
            }
        ));
        assert_eq!(config.message_size, 16);
    }

    #[test]
    fn test_worker_bounds() {
        for workers in [0, 11] {
            let settings = RunSettings {
                workers,
                ..valid()
            };
            assert!(
                settings.validate().is_err(),
                "workers={workers} should be rejected"
            );
        }
        let settings = RunSettings {
            workers: 10,
            sync: true,
            ..valid()
        };
        assert_eq!(settings.validate().unwrap().workers, 10);
    }

    #[test]
    fn test_unknown_decoder_rejected_without_io() {
        let settings = RunSettings {
            message_file: Some(PathBuf::from("/definitely/not/here.txt")),
            message_decoder: "zlib".to_string(),
            ..valid()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::UnknownScheme { value, .. }) if value == "zlib"
        ));
    }

    #[test]
    fn test_decoder_ignored_for_random_payloads() {
        let settings = RunSettings {
            message_decoder: "zlib".to_string(),
            ..valid()
        };
        let config = settings.validate().unwrap();
        assert_eq!(config.payload, PayloadSource::Random { size: 16 });
    }

    #[test]
    fn test_zero_report_interval_rejected() {
        let settings = RunSettings {
            report_interval: Duration::ZERO,
            ..valid()
        };
        assert!(settings.validate().is_err());
    }
}
