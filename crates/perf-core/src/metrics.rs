//! Producer metrics registry and snapshot rendering.
//!
//! The registry belongs to the producer client: the client records into it and the
//! reporter only reads. Metrics are registered on first use, so a registry that has not
//! seen any traffic yet has no entries and snapshots of it are skipped.

use hdrhistogram::Histogram as HdrHistogram;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Records acknowledged by the broker.
pub const RECORD_SEND_RATE: &str = "record-send-rate";
/// Time from enqueue to acknowledgement.
pub const REQUEST_LATENCY: &str = "request-latency-in-ms";
/// Payload bytes acknowledged by the broker.
pub const OUTGOING_BYTE_RATE: &str = "outgoing-byte-rate";
/// Messages handed to the client and not yet acknowledged.
pub const REQUESTS_IN_FLIGHT: &str = "requests-in-flight";

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

// Latencies are recorded in microseconds, 1us..60s, 3 significant digits.
const LATENCY_LOW_US: u64 = 1;
const LATENCY_HIGH_US: u64 = 60_000_000;
const LATENCY_SIGFIG: u8 = 3;

/// Monotonic event count with a mean rate since registration.
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    started: Instant,
}

impl Meter {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn mark(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Events per second since the meter was registered.
    pub fn rate_mean(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.count() as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Up/down counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn inc(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.value.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Latency distribution backed by an HDR histogram.
#[derive(Debug)]
pub struct Histogram {
    inner: Mutex<HdrHistogram<u64>>,
}

impl Histogram {
    fn new() -> Self {
        let inner = HdrHistogram::new_with_bounds(LATENCY_LOW_US, LATENCY_HIGH_US, LATENCY_SIGFIG)
            .expect("constant latency histogram bounds are valid");
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Record one latency sample; out-of-range values are clamped.
    pub fn record(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        let micros = micros.clamp(LATENCY_LOW_US, LATENCY_HIGH_US);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .saturating_record(micros);
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let h = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if h.is_empty() {
            return LatencySnapshot::default();
        }
        let ms = |us: f64| us / 1000.0;
        let at = |q: f64| ms(h.value_at_quantile(q) as f64);
        LatencySnapshot {
            count: h.len(),
            mean_ms: ms(h.mean()),
            stddev_ms: ms(h.stdev()),
            p50_ms: at(0.5),
            p75_ms: at(0.75),
            p95_ms: at(0.95),
            p99_ms: at(0.99),
            p999_ms: at(0.999),
        }
    }
}

/// Point-in-time view of a latency histogram, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySnapshot {
    pub count: u64,
    pub mean_ms: f64,
    pub stddev_ms: f64,
    pub p50_ms: f64,
    pub p75_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub p999_ms: f64,
}

/// A registered metric.
#[derive(Debug, Clone)]
pub enum Metric {
    Meter(Arc<Meter>),
    Histogram(Arc<Histogram>),
    Counter(Arc<Counter>),
}

/// Named metrics maintained by a producer client.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Meter registered under `name`, registering it if absent.
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        if let Some(Metric::Meter(m)) = self.get(name) {
            return m;
        }
        match self.get_or_register(name, || Metric::Meter(Arc::new(Meter::new()))) {
            Metric::Meter(m) => m,
            // Name taken by another kind: hand out a detached meter.
            _ => Arc::new(Meter::new()),
        }
    }

    /// Histogram registered under `name`, registering it if absent.
    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        if let Some(Metric::Histogram(h)) = self.get(name) {
            return h;
        }
        match self.get_or_register(name, || Metric::Histogram(Arc::new(Histogram::new()))) {
            Metric::Histogram(h) => h,
            _ => Arc::new(Histogram::new()),
        }
    }

    /// Counter registered under `name`, registering it if absent.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        if let Some(Metric::Counter(c)) = self.get(name) {
            return c;
        }
        match self.get_or_register(name, || Metric::Counter(Arc::new(Counter::default()))) {
            Metric::Counter(c) => c,
            _ => Arc::new(Counter::default()),
        }
    }

    fn get_or_register(&self, name: &str, make: impl FnOnce() -> Metric) -> Metric {
        self.metrics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(make)
            .clone()
    }
}

/// Instrumentation shared by producer client implementations.
#[derive(Debug, Clone)]
pub struct ProducerMetrics {
    registry: Arc<MetricsRegistry>,
}

impl ProducerMetrics {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// A message was handed to the client.
    pub fn on_enqueue(&self) {
        self.registry.counter(REQUESTS_IN_FLIGHT).inc(1);
    }

    /// A message was acknowledged (`delivered`) or failed after `latency`.
    pub fn on_complete(&self, latency: Duration, bytes: usize, delivered: bool) {
        self.registry.counter(REQUESTS_IN_FLIGHT).dec(1);
        self.registry.histogram(REQUEST_LATENCY).record(latency);
        if delivered {
            self.registry.meter(RECORD_SEND_RATE).mark(1);
            self.registry
                .meter(OUTGOING_BYTE_RATE)
                .mark(u64::try_from(bytes).unwrap_or(u64::MAX));
        }
    }
}

/// Read-only view over the four producer metrics the reporter prints.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub records_sent: u64,
    pub records_per_sec: f64,
    pub outgoing_bytes_per_sec: f64,
    pub latency: LatencySnapshot,
    pub requests_in_flight: i64,
}

impl MetricsSnapshot {
    /// Capture the current values, or `None` if any of the four metrics is not
    /// registered yet.
    pub fn capture(registry: &MetricsRegistry) -> Option<Self> {
        let Some(Metric::Meter(send_rate)) = registry.get(RECORD_SEND_RATE) else {
            return None;
        };
        let Some(Metric::Histogram(latency)) = registry.get(REQUEST_LATENCY) else {
            return None;
        };
        let Some(Metric::Meter(byte_rate)) = registry.get(OUTGOING_BYTE_RATE) else {
            return None;
        };
        let Some(Metric::Counter(in_flight)) = registry.get(REQUESTS_IN_FLIGHT) else {
            return None;
        };

        Some(Self {
            records_sent: send_rate.count(),
            records_per_sec: send_rate.rate_mean(),
            outgoing_bytes_per_sec: byte_rate.rate_mean(),
            latency: latency.snapshot(),
            requests_in_flight: in_flight.count(),
        })
    }

    /// Estimated ingress, from the configured message size rather than actual payloads.
    pub fn ingress_mib_per_sec(&self, message_size: usize) -> f64 {
        self.records_per_sec * message_size as f64 / BYTES_PER_MIB
    }

    pub fn egress_mib_per_sec(&self) -> f64 {
        self.outgoing_bytes_per_sec / BYTES_PER_MIB
    }

    /// One human-readable report line (without trailing newline).
    pub fn render(&self, message_size: usize) -> String {
        format!(
            "{} records sent, {:.1} records/sec ({:.2} MiB/sec ingress, {:.2} MiB/sec egress), \
             {:.1} ms avg latency, {:.1} ms stddev, {:.1} ms 50th, {:.1} ms 75th, \
             {:.1} ms 95th, {:.1} ms 99th, {:.1} ms 99.9th, {} total req. in flight",
            self.records_sent,
            self.records_per_sec,
            self.ingress_mib_per_sec(message_size),
            self.egress_mib_per_sec(),
            self.latency.mean_ms,
            self.latency.stddev_ms,
            self.latency.p50_ms,
            self.latency.p75_ms,
            self.latency.p95_ms,
            self.latency.p99_ms,
            self.latency.p999_ms,
            self.requests_in_flight,
        )
    }
}
