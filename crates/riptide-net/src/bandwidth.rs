//! Bandwidth statistics relayed from the transport worker.
//!
//! The worker periodically reports its up/down byte counts through an
//! out-of-band `"bandwidth"` option; the interface feeds them into this
//! accumulator. Atomics keep the accumulator shareable with whatever
//! diagnostics surface the server hangs it on.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

/// Accumulated transport throughput totals in bytes.
#[derive(Debug, Default)]
pub struct NetworkStats {
    upload: AtomicU64,
    download: AtomicU64,
}

impl NetworkStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reporting period's worth of throughput.
    pub fn add_throughput(&self, up: u64, down: u64) {
        self.upload.fetch_add(up, Ordering::Relaxed);
        self.download.fetch_add(down, Ordering::Relaxed);
        tracing::debug!("transport throughput: up={up} B, down={down} B");
    }

    /// Total bytes sent by the transport since startup (or last reset).
    pub fn upload_total(&self) -> u64 {
        self.upload.load(Ordering::Relaxed)
    }

    /// Total bytes received by the transport since startup (or last reset).
    pub fn download_total(&self) -> u64 {
        self.download.load(Ordering::Relaxed)
    }

    /// Snapshot both totals and reset them to zero.
    pub fn snapshot_and_reset(&self) -> (u64, u64) {
        (
            self.upload.swap(0, Ordering::Relaxed),
            self.download.swap(0, Ordering::Relaxed),
        )
    }
}

/// Shape of the worker's serialized `"bandwidth"` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BandwidthReport {
    /// Bytes sent during the reporting period.
    pub up: u64,
    /// Bytes received during the reporting period.
    pub down: u64,
}

/// Parse a `"bandwidth"` option payload.
pub fn parse_report(text: &str) -> Result<BandwidthReport, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_accumulates() {
        let stats = NetworkStats::new();
        stats.add_throughput(100, 250);
        stats.add_throughput(50, 0);
        assert_eq!(stats.upload_total(), 150);
        assert_eq!(stats.download_total(), 250);
    }

    #[test]
    fn test_snapshot_resets_totals() {
        let stats = NetworkStats::new();
        stats.add_throughput(10, 20);
        assert_eq!(stats.snapshot_and_reset(), (10, 20));
        assert_eq!(stats.snapshot_and_reset(), (0, 0));
    }

    #[test]
    fn test_report_parses_up_and_down() {
        let report = parse_report(r#"{"up":1024,"down":4096}"#).unwrap();
        assert_eq!(report, BandwidthReport { up: 1024, down: 4096 });
    }

    #[test]
    fn test_garbage_report_is_an_error() {
        assert!(parse_report("not json").is_err());
        assert!(parse_report(r#"{"up":1}"#).is_err(), "missing field");
    }
}
