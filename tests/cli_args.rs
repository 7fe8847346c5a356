//! Command-line parsing and dry-run execution.

use clap::Parser;
use kafka_producer_perf::cli::Args;
use kafka_producer_perf::execute;
use producer_perf_core::{ConfigError, DispatchMode, PerfError, EXIT_USAGE};
use producer_perf_kafka::{Compression, Partitioner, RequiredAcks, SecurityProtocol};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn parse(extra: &[&str]) -> Args {
    let mut argv = vec!["kafka-producer-perf"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_defaults() {
    let args = parse(&["--topic", "perf", "--message-load", "10", "--message-size", "8"]);
    let settings = args.run_settings();
    assert!(!settings.sync);
    assert_eq!(settings.partition, -1);
    assert_eq!(settings.workers, 1);
    assert_eq!(settings.report_interval, Duration::from_secs(5));

    let kafka = args.kafka_config().unwrap();
    assert_eq!(kafka.security_protocol, SecurityProtocol::Plaintext);
    assert_eq!(kafka.required_acks, RequiredAcks::Leader);
    assert_eq!(kafka.partitioner, Partitioner::RoundRobin);
    assert_eq!(kafka.compression, Compression::None);
    assert_eq!(kafka.timeout, Duration::from_secs(10));
    assert_eq!(kafka.channel_buffer_size, 256);
}

#[test]
fn test_negative_numbers_and_durations() {
    let args = parse(&[
        "--partition",
        "-1",
        "--required-acks",
        "-1",
        "--timeout",
        "1500ms",
        "--flush-frequency",
        "2s",
        "--report-interval",
        "1m",
    ]);
    assert_eq!(args.partition, -1);
    assert_eq!(args.timeout, Duration::from_millis(1500));
    assert_eq!(args.flush_frequency, Duration::from_secs(2));
    assert_eq!(args.report_interval, Duration::from_secs(60));
    assert_eq!(args.kafka_config().unwrap().required_acks, RequiredAcks::All);
}

#[test]
fn test_malformed_duration_is_rejected_by_the_parser() {
    assert!(Args::try_parse_from(["kafka-producer-perf", "--timeout", "soon"]).is_err());
}

#[test]
fn test_oversized_duration_is_a_usage_error() {
    for flag in ["--timeout", "--flush-frequency", "--report-interval"] {
        let err = Args::try_parse_from(["kafka-producer-perf", flag, "6000000000000000h"])
            .unwrap_err();
        assert!(err.use_stderr(), "{flag}");
        assert!(err.to_string().contains("out of range"), "{flag}: {err}");
    }
}

#[test]
fn test_unknown_client_schemes() {
    let args = parse(&["--compression", "zstd"]);
    assert!(matches!(
        args.kafka_config(),
        Err(ConfigError::UnknownScheme {
            kind: "compression",
            ..
        })
    ));

    let args = parse(&["--security-protocol", "SASL_SSL"]);
    assert!(args.kafka_config().is_err());

    let args = parse(&["--required-acks", "3"]);
    assert!(args.kafka_config().is_err());
}

#[test]
fn test_broker_list_and_tls_flags() {
    let args = parse(&[
        "--brokers",
        "k1:9092,k2:9092",
        "--security-protocol",
        "SSL",
        "--tls-client-cert",
        "client.pem",
        "--tls-client-key",
        "client.key",
        "--kafka-version",
        "2.8.0",
    ]);
    let kafka = args.kafka_config().unwrap();
    assert_eq!(kafka.brokers, vec!["k1:9092", "k2:9092"]);
    assert_eq!(kafka.security_protocol, SecurityProtocol::Ssl);
    assert!(kafka.tls.client_key.is_some());
    assert_eq!(kafka.version.as_deref(), Some("2.8.0"));
    assert!(kafka.validate(-1).is_ok());
}

#[tokio::test]
async fn test_dry_run_async() {
    let args = parse(&[
        "--dry-run",
        "--topic",
        "perf",
        "--message-load",
        "100",
        "--message-size",
        "16",
    ]);

    let (summary, sink) = execute(&args, Vec::new()).await.unwrap();

    assert_eq!(summary.mode, DispatchMode::Async);
    assert_eq!(summary.sent, 100);
    let output = String::from_utf8(sink).unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("100 records sent"));
}

#[tokio::test]
async fn test_dry_run_sync_with_message_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "aGVsbG8=").unwrap();
    writeln!(file, "d29ybGQ=").unwrap();
    file.flush().unwrap();
    let path = file.path().to_string_lossy().to_string();

    let args = parse(&[
        "--dry-run",
        "--sync",
        "--routines",
        "3",
        "--topic",
        "perf",
        "--message-load",
        "10",
        "--message-file",
        &path,
        "--message-decoder",
        "base64",
    ]);

    let (summary, _) = execute(&args, Vec::new()).await.unwrap();
    assert_eq!(summary.mode, DispatchMode::Sync);
    assert_eq!(summary.generated, 10);
    assert_eq!(summary.sent, 10);
}

#[tokio::test]
async fn test_configuration_errors_exit_with_usage_status() {
    let cases: Vec<Vec<&str>> = vec![
        // no topic
        vec!["--dry-run", "--message-load", "10", "--message-size", "8"],
        // no load
        vec!["--dry-run", "--topic", "t", "--message-size", "8"],
        // neither size nor file
        vec!["--dry-run", "--topic", "t", "--message-load", "10"],
        // more routines than messages
        vec![
            "--dry-run", "--sync", "--routines", "11", "--topic", "t", "--message-load", "10",
            "--message-size", "8",
        ],
        // unknown decoder
        vec![
            "--dry-run", "--topic", "t", "--message-load", "10", "--message-file", "m.txt",
            "--message-decoder", "zlib",
        ],
        // manual partitioning without a partition
        vec![
            "--brokers", "localhost:9092", "--partitioner", "manual", "--topic", "t",
            "--message-load", "10", "--message-size", "8",
        ],
    ];

    for case in cases {
        let args = parse(&case);
        let err = execute(&args, Vec::new()).await.unwrap_err();
        assert!(matches!(err, PerfError::Config(_)), "{case:?}: {err}");
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }
}

#[tokio::test]
async fn test_missing_brokers_without_dry_run() {
    let args = Args {
        brokers: String::new(),
        ..parse(&["--topic", "t", "--message-load", "10", "--message-size", "8"])
    };
    let err = execute(&args, Vec::new()).await.unwrap_err();
    assert!(matches!(err, PerfError::Config(ConfigError::Missing("brokers"))));
}
