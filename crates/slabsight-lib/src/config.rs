//! Monitor configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::alert::Thresholds;
use crate::fragmentation::{DEFAULT_MAX_ORDER, DEFAULT_MIN_ORDER};
use crate::trend::DEFAULT_ALPHA;

/// Monitor configuration
///
/// Plain deserializable struct; the binary layers environment and CLI
/// sources on top of these defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Sampling interval in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// EMA smoothing factor in (0, 1]
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,

    /// How many fastest-growing metrics to rank each cycle
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Classification thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Maximum retained snapshots; unbounded when unset
    #[serde(default)]
    pub max_snapshots: Option<usize>,

    /// JVM process to sample metaspace figures from
    #[serde(default)]
    pub jvm_pid: Option<u32>,

    /// Export file written on shutdown (.csv or .json)
    #[serde(default)]
    pub export_path: Option<PathBuf>,

    /// Lowest buddy order considered by the fragmentation index
    #[serde(default = "default_min_order")]
    pub fragmentation_min_order: usize,

    /// Highest buddy order considered by the fragmentation index
    #[serde(default = "default_max_order")]
    pub fragmentation_max_order: usize,

    /// Metrics surfaced on the live console line and in the export
    #[serde(default = "default_tracked")]
    pub tracked: Vec<String>,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_ema_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_top_n() -> usize {
    10
}

fn default_min_order() -> usize {
    DEFAULT_MIN_ORDER
}

fn default_max_order() -> usize {
    DEFAULT_MAX_ORDER
}

fn default_tracked() -> Vec<String> {
    vec![
        "slab/kmalloc-1024".to_string(),
        "slab/kmalloc-4096".to_string(),
    ]
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            ema_alpha: default_ema_alpha(),
            top_n: default_top_n(),
            thresholds: Thresholds::default(),
            max_snapshots: None,
            jvm_pid: None,
            export_path: None,
            fragmentation_min_order: default_min_order(),
            fragmentation_max_order: default_max_order(),
            tracked: default_tracked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_knobs() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.ema_alpha, 0.30);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.thresholds.growth_percent, 20.0);
        assert_eq!(config.thresholds.streak, 3);
        assert_eq!(config.thresholds.free_pages_floor, 10_000);
        assert!(config.max_snapshots.is_none());
        assert_eq!(config.tracked.len(), 2);
    }

    #[test]
    fn partial_deserialization_fills_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"interval_secs": 2, "jvm_pid": 4242}"#).unwrap();
        assert_eq!(config.interval_secs, 2);
        assert_eq!(config.jvm_pid, Some(4242));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.thresholds.growth_percent, 20.0);
    }
}
