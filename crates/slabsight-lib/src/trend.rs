//! Per-metric trend tracking
//!
//! Maintains, for every observed metric, an exponential moving average,
//! the growth since the previous cycle and a monotonic-increase streak.
//! Sustained streaks and large single-cycle growth are the two leak
//! signals the classifier consumes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Snapshot;

/// Default EMA smoothing factor
pub const DEFAULT_ALPHA: f64 = 0.30;

/// Growth signal for one metric over one sampling interval.
///
/// Growth against a zero baseline has no finite percentage; it is carried
/// as the explicit `FromZero` variant instead of dividing, and it orders
/// above every finite percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// Percentage change against the previous observation
    Percent(f64),
    /// Previous observation was zero, current one is not
    FromZero,
}

impl Growth {
    pub const ZERO: Growth = Growth::Percent(0.0);

    /// Finite percentage, if there is one.
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Growth::Percent(p) => Some(*p),
            Growth::FromZero => None,
        }
    }

    /// Whether this growth is above the given percentage threshold.
    /// `FromZero` exceeds any threshold.
    pub fn exceeds(&self, threshold: f64) -> bool {
        match self {
            Growth::Percent(p) => *p > threshold,
            Growth::FromZero => true,
        }
    }
}

impl PartialOrd for Growth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Growth::FromZero, Growth::FromZero) => Some(Ordering::Equal),
            (Growth::FromZero, Growth::Percent(_)) => Some(Ordering::Greater),
            (Growth::Percent(_), Growth::FromZero) => Some(Ordering::Less),
            (Growth::Percent(a), Growth::Percent(b)) => a.partial_cmp(b),
        }
    }
}

impl std::fmt::Display for Growth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Growth::Percent(p) => write!(f, "{:+.1}%", p),
            Growth::FromZero => write!(f, "new"),
        }
    }
}

/// Trend figures for one metric after one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    /// Current raw value
    pub value: u64,
    /// Growth since the previous cycle
    pub growth: Growth,
    /// Smoothed value
    pub ema: f64,
    /// Consecutive cycles of strict increase
    pub streak: u32,
}

/// Mutable trend state for a single metric name.
#[derive(Debug, Clone, Default)]
pub struct MetricSeries {
    previous: Option<u64>,
    ema: Option<f64>,
    streak: u32,
}

impl MetricSeries {
    /// Fold one raw observation into the series state.
    ///
    /// The first observation seeds the EMA and previous value and reports
    /// zero growth. Later observations report the relative change, update
    /// the EMA as `alpha * raw + (1 - alpha) * ema` and extend or reset
    /// the streak.
    pub fn update(&mut self, raw: u64, alpha: f64) -> TrendResult {
        debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha must be in (0, 1]");

        let growth = match self.previous {
            None => Growth::ZERO,
            Some(0) if raw > 0 => Growth::FromZero,
            Some(0) => Growth::ZERO,
            Some(prev) => {
                Growth::Percent((raw as f64 - prev as f64) / prev as f64 * 100.0)
            }
        };

        let ema = match self.ema {
            None => raw as f64,
            Some(ema) => alpha * raw as f64 + (1.0 - alpha) * ema,
        };

        self.streak = match self.previous {
            Some(prev) if raw > prev => self.streak + 1,
            _ => 0,
        };

        self.previous = Some(raw);
        self.ema = Some(ema);

        TrendResult {
            value: raw,
            growth,
            ema,
            streak: self.streak,
        }
    }
}

/// Applies the per-metric update rule across everything a snapshot carries.
///
/// Series are created lazily on first observation and never dropped;
/// metrics absent from a snapshot keep their state frozen for the cycle.
#[derive(Debug)]
pub struct TrendTracker {
    alpha: f64,
    series: BTreeMap<String, MetricSeries>,
}

impl TrendTracker {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            series: BTreeMap::new(),
        }
    }

    /// Fold one snapshot into the tracked series and return this cycle's
    /// trend figures, keyed by namespaced metric name.
    pub fn observe(&mut self, snapshot: &Snapshot) -> BTreeMap<String, TrendResult> {
        let mut results = BTreeMap::new();
        for (name, value) in snapshot.metrics() {
            let series = self.series.entry(name.clone()).or_default();
            results.insert(name, series.update(value, self.alpha));
        }
        results
    }

    /// Number of metric names observed so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlabStats;

    fn run_series(values: &[u64], alpha: f64) -> Vec<TrendResult> {
        let mut series = MetricSeries::default();
        values.iter().map(|v| series.update(*v, alpha)).collect()
    }

    #[test]
    fn first_observation_seeds_state() {
        let results = run_series(&[100], 0.30);
        assert_eq!(results[0].value, 100);
        assert_eq!(results[0].growth, Growth::ZERO);
        assert_eq!(results[0].ema, 100.0);
        assert_eq!(results[0].streak, 0);
    }

    #[test]
    fn slab_growth_scenario() {
        // [100, 100, 120, 150] at alpha 0.30
        let results = run_series(&[100, 100, 120, 150], 0.30);

        let growth: Vec<f64> = results
            .iter()
            .map(|r| r.growth.as_percent().unwrap())
            .collect();
        assert!((growth[0] - 0.0).abs() < 1e-9);
        assert!((growth[1] - 0.0).abs() < 1e-9);
        assert!((growth[2] - 20.0).abs() < 1e-9);
        assert!((growth[3] - 25.0).abs() < 1e-9);

        let streaks: Vec<u32> = results.iter().map(|r| r.streak).collect();
        assert_eq!(streaks, vec![0, 0, 1, 2]);
    }

    #[test]
    fn strictly_increasing_streak_counts_from_second_observation() {
        let values: Vec<u64> = (1..=8).map(|i| i * 10).collect();
        let results = run_series(&values, 0.30);
        for (k, result) in results.iter().enumerate() {
            assert_eq!(result.streak as usize, k);
            if k > 0 {
                assert!(result.growth.exceeds(0.0));
            }
        }
        assert_eq!(results.last().unwrap().streak as usize, values.len() - 1);
    }

    #[test]
    fn non_increase_resets_streak() {
        let results = run_series(&[10, 20, 30, 30, 25, 40], 0.30);
        let streaks: Vec<u32> = results.iter().map(|r| r.streak).collect();
        assert_eq!(streaks, vec![0, 1, 2, 0, 0, 1]);
    }

    #[test]
    fn growth_from_zero_is_a_sentinel_not_a_division() {
        let results = run_series(&[0, 50], 0.30);
        assert_eq!(results[1].growth, Growth::FromZero);
        assert!(results[1].growth.exceeds(f64::MAX));
        assert!(results[1].growth > Growth::Percent(1e12));
    }

    #[test]
    fn zero_to_zero_is_zero_growth() {
        let results = run_series(&[0, 0], 0.30);
        assert_eq!(results[1].growth, Growth::ZERO);
        assert_eq!(results[1].streak, 0);
    }

    #[test]
    fn ema_stays_within_observed_range() {
        let values = [100u64, 40, 250, 90, 180];
        let results = run_series(&values, 0.30);
        let min = *values.iter().min().unwrap() as f64;
        let max = *values.iter().max().unwrap() as f64;
        for result in &results {
            assert!(result.ema >= min && result.ema <= max);
        }
        // convex combination of the first two observations
        assert!((results[1].ema - (0.30 * 40.0 + 0.70 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn tracker_freezes_absent_metrics() {
        let mut tracker = TrendTracker::new(0.30);

        let mut first = Snapshot::new(10);
        first.vmstat.insert("nr_free_pages".to_string(), 100);
        first.slab.insert(
            "dentry".to_string(),
            SlabStats {
                active_objs: 50,
                num_objs: 60,
                obj_size: 192,
            },
        );
        tracker.observe(&first);

        // dentry missing this cycle: its series must not move
        let mut second = Snapshot::new(15);
        second.vmstat.insert("nr_free_pages".to_string(), 120);
        let results = tracker.observe(&second);
        assert!(!results.contains_key("slab/dentry"));
        assert_eq!(tracker.series_count(), 2);

        // dentry returns: growth is measured against the frozen value
        let mut third = Snapshot::new(20);
        third.slab.insert(
            "dentry".to_string(),
            SlabStats {
                active_objs: 100,
                num_objs: 110,
                obj_size: 192,
            },
        );
        let results = tracker.observe(&third);
        let dentry = &results["slab/dentry"];
        assert!((dentry.growth.as_percent().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(dentry.streak, 1);
    }

    #[test]
    fn identical_snapshots_produce_identical_results() {
        let mut snap = Snapshot::new(10);
        snap.vmstat.insert("nr_free_pages".to_string(), 100);
        snap.vmstat.insert("nr_slab_unreclaimable".to_string(), 40);

        let mut a = TrendTracker::new(0.30);
        let mut b = TrendTracker::new(0.30);
        for _ in 0..5 {
            assert_eq!(a.observe(&snap), b.observe(&snap));
        }
    }

    #[test]
    fn growth_display() {
        assert_eq!(Growth::Percent(12.34).to_string(), "+12.3%");
        assert_eq!(Growth::Percent(-5.0).to_string(), "-5.0%");
        assert_eq!(Growth::FromZero.to_string(), "new");
    }
}
