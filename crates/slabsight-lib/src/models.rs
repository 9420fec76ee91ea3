//! Core data models for the leak monitor

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known metric names and namespace prefixes.
///
/// Every value a snapshot carries is addressable under a namespaced name:
/// `slab/<cache>` for active object counts, `vmstat/<counter>` for kernel
/// counters, `metaspace/*` for JVM figures and `derived/*` for rates
/// computed between consecutive snapshots.
pub mod metric {
    pub const SLAB_PREFIX: &str = "slab/";
    pub const VMSTAT_PREFIX: &str = "vmstat/";

    pub const METASPACE_USED: &str = "metaspace/used_kb";
    pub const METASPACE_COMMITTED: &str = "metaspace/committed_kb";

    pub const SCAN_RATE: &str = "derived/slabs_scanned_per_sec";
    pub const ALLOC_RATE: &str = "derived/allocation_rate_kb_per_sec";

    pub const NR_FREE_PAGES: &str = "vmstat/nr_free_pages";
    pub const NR_SLAB_RECLAIMABLE: &str = "vmstat/nr_slab_reclaimable";
    pub const NR_SLAB_UNRECLAIMABLE: &str = "vmstat/nr_slab_unreclaimable";
}

/// Per-cache statistics from /proc/slabinfo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabStats {
    pub active_objs: u64,
    pub num_objs: u64,
    pub obj_size: u64,
}

/// JVM metaspace figures from `jcmd <pid> VM.metaspace`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaspaceStats {
    pub committed_kb: u64,
    pub used_kb: u64,
}

/// Per-interval rates derived from counter deltas between consecutive
/// snapshots. Zero on the first snapshot of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRates {
    pub slabs_scanned_per_sec: f64,
    pub allocation_rate_kb_per_sec: f64,
}

/// One timestamped capture of all monitored sources.
///
/// Each source keeps its own typed group rather than sharing an untyped
/// bag; a snapshot is immutable once appended to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix timestamp in seconds, stamped by the collector
    pub timestamp: i64,
    /// Slab caches by name
    pub slab: BTreeMap<String, SlabStats>,
    /// Virtual-memory counters by name
    pub vmstat: BTreeMap<String, u64>,
    /// Free-page counts indexed by buddy-allocator order, summed across
    /// nodes and zones
    pub free_pages_by_order: Vec<u64>,
    /// JVM metaspace figures, when a target JVM is configured and reachable
    pub metaspace: Option<MetaspaceStats>,
    #[serde(default)]
    pub rates: DerivedRates,
}

impl Snapshot {
    /// Create an empty snapshot for the given timestamp.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            slab: BTreeMap::new(),
            vmstat: BTreeMap::new(),
            free_pages_by_order: Vec::new(),
            metaspace: None,
            rates: DerivedRates::default(),
        }
    }

    /// Iterate every integer metric this snapshot carries, as
    /// `(namespaced name, value)` pairs in a stable order.
    pub fn metrics(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        let slabs = self
            .slab
            .iter()
            .map(|(name, s)| (format!("{}{}", metric::SLAB_PREFIX, name), s.active_objs));
        let vmstat = self
            .vmstat
            .iter()
            .map(|(name, v)| (format!("{}{}", metric::VMSTAT_PREFIX, name), *v));
        let metaspace = self.metaspace.into_iter().flat_map(|m| {
            [
                (metric::METASPACE_COMMITTED.to_string(), m.committed_kb),
                (metric::METASPACE_USED.to_string(), m.used_kb),
            ]
        });
        slabs.chain(vmstat).chain(metaspace)
    }

    /// Point-read one integer metric by namespaced name.
    pub fn metric(&self, name: &str) -> Option<u64> {
        if let Some(cache) = name.strip_prefix(metric::SLAB_PREFIX) {
            return self.slab.get(cache).map(|s| s.active_objs);
        }
        if let Some(counter) = name.strip_prefix(metric::VMSTAT_PREFIX) {
            return self.vmstat.get(counter).copied();
        }
        match name {
            metric::METASPACE_USED => self.metaspace.map(|m| m.used_kb),
            metric::METASPACE_COMMITTED => self.metaspace.map(|m| m.committed_kb),
            _ => None,
        }
    }

    /// Read any metric, including the derived float rates, for use as a
    /// correlation series element.
    pub fn series_value(&self, name: &str) -> Option<f64> {
        match name {
            metric::SCAN_RATE => Some(self.rates.slabs_scanned_per_sec),
            metric::ALLOC_RATE => Some(self.rates.allocation_rate_kb_per_sec),
            _ => self.metric(name).map(|v| v as f64),
        }
    }
}
