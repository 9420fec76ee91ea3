//! Analysis context
//!
//! `Monitor` owns all per-run state: the snapshot history, the per-metric
//! trend series, the classifier and the fragmentation scorer. One call to
//! `ingest` runs a full cycle; `final_report` summarizes the retained
//! history for the shutdown report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alert::{self, AlertClassifier, PressureAlert, Severity};
use crate::config::MonitorConfig;
use crate::correlation::{self, CorrelationResult};
use crate::fragmentation::FragmentationIndex;
use crate::models::{metric, Snapshot};
use crate::store::{SnapshotStore, StoreError};
use crate::trend::{TrendResult, TrendTracker};

/// Everything one sampling cycle produced
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: i64,
    /// Trend figures for every metric present in the cycle's snapshot
    pub trends: BTreeMap<String, TrendResult>,
    /// Severity tier per metric
    pub severities: BTreeMap<String, Severity>,
    /// Fastest-growing metrics, ranked
    pub top: Vec<(String, TrendResult)>,
    /// Fragmentation score of this cycle's free-page histogram
    pub fragmentation: f64,
    /// Composite pressure alert, if the cycle tripped it
    pub pressure: Option<PressureAlert>,
}

/// How strongly the JVM and kernel series move together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        if r > 0.7 {
            CorrelationStrength::Strong
        } else if r > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl std::fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationStrength::Strong => write!(f, "STRONG"),
            CorrelationStrength::Moderate => write!(f, "MODERATE"),
            CorrelationStrength::Weak => write!(f, "WEAK"),
        }
    }
}

/// Stability of the kernel slab series over the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variability {
    Erratic,
    Moderate,
    Stable,
}

impl Variability {
    pub fn from_cov(cov: f64) -> Self {
        if cov > 0.5 {
            Variability::Erratic
        } else if cov > 0.2 {
            Variability::Moderate
        } else {
            Variability::Stable
        }
    }
}

impl std::fmt::Display for Variability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variability::Erratic => write!(f, "ERRATIC"),
            Variability::Moderate => write!(f, "MODERATE"),
            Variability::Stable => write!(f, "STABLE"),
        }
    }
}

/// Shutdown summary over the full retained history
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub samples: usize,
    pub duration_secs: i64,
    /// Metaspace usage correlated against unreclaimable kernel slab
    /// memory; CoV and mean cover the kernel series
    pub correlation: CorrelationResult,
    /// Mean slab-scan rate over the run, the reclaim-pressure indicator
    pub mean_scan_rate: f64,
}

impl AnalysisReport {
    pub fn correlation_strength(&self) -> CorrelationStrength {
        CorrelationStrength::from_r(self.correlation.pearson_correlation)
    }

    pub fn variability(&self) -> Variability {
        Variability::from_cov(self.correlation.coefficient_of_variation)
    }
}

/// Per-run analysis state; the single owner of the history and all
/// trend series.
#[derive(Debug)]
pub struct Monitor {
    store: SnapshotStore,
    tracker: TrendTracker,
    classifier: AlertClassifier,
    fragmentation: FragmentationIndex,
    top_n: usize,
}

impl Monitor {
    pub fn new(config: &MonitorConfig) -> Self {
        let store = match config.max_snapshots {
            Some(max) => SnapshotStore::bounded(max),
            None => SnapshotStore::new(),
        };
        Self {
            store,
            tracker: TrendTracker::new(config.ema_alpha),
            classifier: AlertClassifier::new(config.thresholds),
            fragmentation: FragmentationIndex::new(
                config.fragmentation_min_order,
                config.fragmentation_max_order,
            ),
            top_n: config.top_n,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one full cycle: append, trend update, classify, rank, score.
    ///
    /// A rejected (out-of-order) snapshot leaves every trend series and
    /// the history untouched; the caller logs the error and carries on.
    pub fn ingest(&mut self, snapshot: Snapshot) -> Result<CycleReport, StoreError> {
        let snap = self.store.append(snapshot)?;
        let timestamp = snap.timestamp;
        let fragmentation = self.fragmentation.compute(&snap.free_pages_by_order);
        let trends = self.tracker.observe(snap);

        let severities = self.classifier.classify(&trends);
        let pressure = self.classifier.system_pressure(&trends);
        let top = alert::top_n(&trends, self.top_n);

        Ok(CycleReport {
            timestamp,
            trends,
            severities,
            top,
            fragmentation,
            pressure,
        })
    }

    /// Summarize the retained history for the shutdown report.
    pub fn final_report(&self) -> AnalysisReport {
        let correlation = correlation::analyze(
            &self.store,
            metric::METASPACE_USED,
            metric::NR_SLAB_UNRECLAIMABLE,
        );
        let scan_rates: Vec<f64> = self.store.series_for(metric::SCAN_RATE).collect();

        AnalysisReport {
            samples: self.store.len(),
            duration_secs: self.store.duration_secs(),
            correlation,
            mean_scan_rate: correlation::mean(&scan_rates),
        }
    }
}
