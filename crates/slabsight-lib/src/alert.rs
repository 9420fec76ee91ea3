//! Alert classification and ranking
//!
//! Turns per-metric trend figures into severity tiers and a top-N
//! ranking by growth. A separate composite rule flags system memory
//! pressure from two metrics read together: free pages under a floor
//! while unreclaimable slab memory keeps climbing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::metric;
use crate::trend::TrendResult;

/// Severity tier for one metric in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Warn,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::None => write!(f, "none"),
            Severity::Warn => write!(f, "warn"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Classification thresholds, overridable through configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Single-cycle growth percentage above which a metric is critical
    #[serde(default = "default_growth_percent")]
    pub growth_percent: f64,
    /// Consecutive increasing cycles at which a metric warns
    #[serde(default = "default_streak")]
    pub streak: u32,
    /// Free-page floor for the composite pressure alert
    #[serde(default = "default_free_pages_floor")]
    pub free_pages_floor: u64,
}

fn default_growth_percent() -> f64 {
    20.0
}

fn default_streak() -> u32 {
    3
}

fn default_free_pages_floor() -> u64 {
    10_000
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            growth_percent: default_growth_percent(),
            streak: default_streak(),
            free_pages_floor: default_free_pages_floor(),
        }
    }
}

/// Composite system-pressure alert, raised when free memory is below the
/// floor while unreclaimable slab memory is still growing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PressureAlert {
    pub free_pages: u64,
    pub floor: u64,
    pub unreclaimable_streak: u32,
}

/// Applies thresholds to trend results.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertClassifier {
    thresholds: Thresholds,
}

impl AlertClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Tier for a single metric's trend. Growth past the threshold is
    /// critical outright; a long enough streak warns even when each
    /// step's growth stays small, which is how slow steady leaks show up.
    pub fn classify_one(&self, trend: &TrendResult) -> Severity {
        if trend.growth.exceeds(self.thresholds.growth_percent) {
            Severity::Critical
        } else if trend.streak >= self.thresholds.streak {
            Severity::Warn
        } else {
            Severity::None
        }
    }

    /// Tier every metric in a cycle's trend results.
    pub fn classify(
        &self,
        trends: &BTreeMap<String, TrendResult>,
    ) -> BTreeMap<String, Severity> {
        trends
            .iter()
            .map(|(name, trend)| (name.clone(), self.classify_one(trend)))
            .collect()
    }

    /// Composite pressure check over two independently tracked metrics.
    pub fn system_pressure(
        &self,
        trends: &BTreeMap<String, TrendResult>,
    ) -> Option<PressureAlert> {
        let free = trends.get(metric::NR_FREE_PAGES)?;
        let unreclaimable = trends.get(metric::NR_SLAB_UNRECLAIMABLE)?;

        if free.value < self.thresholds.free_pages_floor && unreclaimable.streak > 0 {
            Some(PressureAlert {
                free_pages: free.value,
                floor: self.thresholds.free_pages_floor,
                unreclaimable_streak: unreclaimable.streak,
            })
        } else {
            None
        }
    }
}

/// The `n` fastest-growing metrics, descending by growth; ties broken by
/// higher current value, then metric name, so the ranking is
/// deterministic.
pub fn top_n(trends: &BTreeMap<String, TrendResult>, n: usize) -> Vec<(String, TrendResult)> {
    let mut ranked: Vec<(String, TrendResult)> = trends
        .iter()
        .map(|(name, trend)| (name.clone(), *trend))
        .collect();

    ranked.sort_by(|(name_a, a), (name_b, b)| {
        b.growth
            .partial_cmp(&a.growth)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.value.cmp(&a.value))
            .then_with(|| name_a.cmp(name_b))
    });
    ranked.truncate(n);
    ranked
}
