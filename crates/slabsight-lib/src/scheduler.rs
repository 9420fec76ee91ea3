//! Periodic sampling loop
//!
//! Drives collect → derive rates → ingest → render on a fixed interval
//! until shutdown fires, then hands the monitor back so the caller can
//! produce the final report from whatever history was collected.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{info, warn};

use crate::collector::SnapshotCollector;
use crate::models::{DerivedRates, Snapshot};
use crate::monitor::{CycleReport, Monitor};

/// KiB per page, for the allocation-rate derivation
const PAGE_KB: u64 = 4;

/// Configuration for the sampling loop
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Base sampling interval (default: 5 seconds)
    pub interval: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Receives each cycle's report; the binary renders it, tests record it.
pub trait CycleSink: Send {
    fn on_cycle(&mut self, report: &CycleReport);
}

/// A sink that drops every report.
pub struct NullSink;

impl CycleSink for NullSink {
    fn on_cycle(&mut self, _report: &CycleReport) {}
}

/// Periodic sampling loop over one collector and one monitor
pub struct SamplingLoop<S: CycleSink> {
    collector: Arc<dyn SnapshotCollector>,
    monitor: Monitor,
    config: SamplingConfig,
    sink: S,
}

impl<S: CycleSink> SamplingLoop<S> {
    pub fn new(
        collector: Arc<dyn SnapshotCollector>,
        monitor: Monitor,
        config: SamplingConfig,
        sink: S,
    ) -> Self {
        Self {
            collector,
            monitor,
            config,
            sink,
        }
    }

    /// Run until the shutdown channel fires, then return the monitor so
    /// the final report covers everything collected so far. The first
    /// cycle runs immediately; later ones follow the configured interval.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Monitor {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "starting sampling loop"
        );

        let mut ticker = interval(self.config.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.cycle().await;
                }
                _ = shutdown.recv() => {
                    info!("shutting down sampling loop");
                    break;
                }
            }
        }

        self.monitor
    }

    async fn cycle(&mut self) {
        let mut snapshot = match self.collector.collect().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "snapshot collection failed");
                return;
            }
        };

        if let Some(previous) = self.monitor.store().last() {
            snapshot.rates = derive_rates(previous, &snapshot);
        }

        match self.monitor.ingest(snapshot) {
            Ok(report) => self.sink.on_cycle(&report),
            Err(e) => warn!(error = %e, "snapshot rejected"),
        }
    }
}

/// Per-interval rates from counter deltas between consecutive snapshots.
/// Counter resets and repeated timestamps yield zero rates rather than
/// negative or divided-by-zero ones.
pub fn derive_rates(previous: &Snapshot, current: &Snapshot) -> DerivedRates {
    let dt = current.timestamp - previous.timestamp;
    if dt <= 0 {
        return DerivedRates::default();
    }

    let delta = |name: &str| -> u64 {
        let prev = previous.vmstat.get(name).copied().unwrap_or(0);
        let curr = current.vmstat.get(name).copied().unwrap_or(0);
        curr.saturating_sub(prev)
    };

    DerivedRates {
        slabs_scanned_per_sec: delta("slabs_scanned") as f64 / dt as f64,
        allocation_rate_kb_per_sec: (delta("pgalloc_dma") * PAGE_KB) as f64 / dt as f64,
    }
}
