// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pipeline metrics
//!
//! Counts what happened to each completed record so dropped records are
//! visible without digging through logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Latencies kept for percentile calculation
const MAX_LATENCIES: usize = 10_000;

/// Network logger metrics collector
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed over by the interceptor
    records_captured: AtomicU64,
    /// Records dropped by the filter
    records_filtered: AtomicU64,
    /// Filter evaluations that failed (record forwarded)
    filter_errors: AtomicU64,
    /// Records dropped because the obfuscation handler failed
    obfuscation_failures: AtomicU64,
    /// Records dropped because they could not be encoded
    encode_failures: AtomicU64,
    /// Records sent to the core sink
    records_dispatched: AtomicU64,
    /// Records sent to the APM sink
    apm_dispatched: AtomicU64,
    /// Captured exchanges that failed below HTTP
    failed_exchanges: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
    /// Exchange durations for percentile calculation
    durations: RwLock<Vec<u64>>,
}

/// Metrics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub uptime_secs: u64,
    pub records_captured: u64,
    pub records_filtered: u64,
    pub filter_errors: u64,
    pub obfuscation_failures: u64,
    pub encode_failures: u64,
    pub records_dispatched: u64,
    pub apm_dispatched: u64,
    pub failed_exchanges: u64,
    /// Exchange duration percentiles
    pub duration_p50_ms: u64,
    pub duration_p95_ms: u64,
    pub duration_p99_ms: u64,
}

impl LoggerMetrics {
    pub fn new() -> Self {
        Self {
            records_captured: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            filter_errors: AtomicU64::new(0),
            obfuscation_failures: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            records_dispatched: AtomicU64::new(0),
            apm_dispatched: AtomicU64::new(0),
            failed_exchanges: AtomicU64::new(0),
            start_time: Instant::now(),
            durations: RwLock::new(Vec::new()),
        }
    }

    /// Record a completed exchange
    pub fn record_captured(&self, duration_ms: u64, failed: bool) {
        self.records_captured.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed_exchanges.fetch_add(1, Ordering::Relaxed);
        }

        let mut durations = self.durations.write();
        durations.push(duration_ms);
        if durations.len() > MAX_LATENCIES {
            durations.drain(0..MAX_LATENCIES / 2);
        }
    }

    pub fn record_filtered(&self) {
        self.records_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter_error(&self) {
        self.filter_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_obfuscation_failure(&self) {
        self.obfuscation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode_failure(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self, apm: bool) {
        self.records_dispatched.fetch_add(1, Ordering::Relaxed);
        if apm {
            self.apm_dispatched.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current report
    pub fn report(&self) -> MetricsReport {
        let (p50, p95, p99) = calculate_percentiles(&self.durations.read());

        MetricsReport {
            uptime_secs: self.start_time.elapsed().as_secs(),
            records_captured: self.records_captured.load(Ordering::Relaxed),
            records_filtered: self.records_filtered.load(Ordering::Relaxed),
            filter_errors: self.filter_errors.load(Ordering::Relaxed),
            obfuscation_failures: self.obfuscation_failures.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            records_dispatched: self.records_dispatched.load(Ordering::Relaxed),
            apm_dispatched: self.apm_dispatched.load(Ordering::Relaxed),
            failed_exchanges: self.failed_exchanges.load(Ordering::Relaxed),
            duration_p50_ms: p50,
            duration_p95_ms: p95,
            duration_p99_ms: p99,
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest-rank percentiles
fn calculate_percentiles(values: &[u64]) -> (u64, u64, u64) {
    if values.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let rank = |percent: usize| {
        let idx = (percent * sorted.len()).div_ceil(100);
        sorted[idx.clamp(1, sorted.len()) - 1]
    };

    (rank(50), rank(95), rank(99))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = LoggerMetrics::new();

        metrics.record_captured(100, false);
        metrics.record_captured(200, true);
        metrics.record_filtered();
        metrics.record_dispatched(true);

        let report = metrics.report();
        assert_eq!(report.records_captured, 2);
        assert_eq!(report.failed_exchanges, 1);
        assert_eq!(report.records_filtered, 1);
        assert_eq!(report.records_dispatched, 1);
        assert_eq!(report.apm_dispatched, 1);
    }

    #[test]
    fn test_percentiles() {
        let latencies: Vec<u64> = (1..=100).collect();
        assert_eq!(calculate_percentiles(&latencies), (50, 95, 99));
        assert_eq!(calculate_percentiles(&[7]), (7, 7, 7));
        assert_eq!(calculate_percentiles(&[]), (0, 0, 0));
    }
}
