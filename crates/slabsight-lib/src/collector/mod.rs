//! Snapshot collection from kernel text interfaces
//!
//! Collectors assemble one `Snapshot` per sampling cycle from
//! /proc/slabinfo, /proc/vmstat and /proc/buddyinfo, plus an optional
//! JVM metaspace probe through `jcmd`. Parsing is split from I/O so the
//! parsers stay testable on captured fixture text.

mod buddyinfo;
mod metaspace;
mod slabinfo;
mod vmstat;

#[cfg(test)]
mod tests;

pub use buddyinfo::parse_buddyinfo;
pub use metaspace::{parse_metaspace, read_metaspace};
pub use slabinfo::parse_slabinfo;
pub use vmstat::parse_vmstat;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, warn};

use crate::models::Snapshot;

pub use async_trait::async_trait;

/// Trait for snapshot collection implementations
#[async_trait]
pub trait SnapshotCollector: Send + Sync {
    /// Assemble one snapshot of all monitored sources.
    async fn collect(&self) -> Result<Snapshot>;
}

/// Production collector reading the kernel's proc interfaces.
///
/// A source that fails to read leaves its metric group empty for the
/// cycle and is warn-logged; the affected series simply freeze until the
/// source comes back.
pub struct ProcCollector {
    proc_root: PathBuf,
    jvm_pid: Option<u32>,
}

impl ProcCollector {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            jvm_pid: None,
        }
    }

    /// Collector with a custom proc root (for testing against a fake tree)
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            jvm_pid: None,
        }
    }

    /// Also probe the given JVM's metaspace each cycle.
    pub fn with_jvm_pid(mut self, pid: u32) -> Self {
        self.jvm_pid = Some(pid);
        self
    }

    async fn read_source(&self, name: &str) -> Result<String> {
        let path = self.proc_root.join(name);
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

impl Default for ProcCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotCollector for ProcCollector {
    async fn collect(&self) -> Result<Snapshot> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut snapshot = Snapshot::new(timestamp);

        match self.read_source("slabinfo").await {
            Ok(content) => snapshot.slab = parse_slabinfo(&content),
            Err(e) => warn!(error = %e, "slabinfo unavailable this cycle"),
        }

        match self.read_source("vmstat").await {
            Ok(content) => snapshot.vmstat = parse_vmstat(&content),
            Err(e) => warn!(error = %e, "vmstat unavailable this cycle"),
        }

        match self.read_source("buddyinfo").await {
            Ok(content) => snapshot.free_pages_by_order = parse_buddyinfo(&content),
            Err(e) => warn!(error = %e, "buddyinfo unavailable this cycle"),
        }

        if let Some(pid) = self.jvm_pid {
            match read_metaspace(pid).await {
                Ok(stats) => snapshot.metaspace = Some(stats),
                Err(e) => debug!(pid, error = %e, "metaspace probe failed"),
            }
        }

        Ok(snapshot)
    }
}
