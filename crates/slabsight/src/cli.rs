//! Command-line interface

use std::path::PathBuf;

use clap::Parser;
use slabsight_lib::MonitorConfig;

/// Kernel and JVM memory leak watchdog
#[derive(Debug, Parser)]
#[command(name = "slabsight")]
#[command(author, version, about = "Watches kernel slab caches, vmstat counters and JVM metaspace for leak-shaped growth", long_about = None)]
pub struct Cli {
    /// JVM process id to sample metaspace figures from
    #[arg(long, env = "SLABSIGHT_JVM_PID")]
    pub pid: Option<u32>,

    /// Sampling interval in seconds
    #[arg(long, short, env = "SLABSIGHT_INTERVAL_SECS")]
    pub interval: Option<u64>,

    /// How many fastest-growing metrics to show each cycle
    #[arg(long, env = "SLABSIGHT_TOP_N")]
    pub top: Option<usize>,

    /// Export file written on shutdown (.csv, or .json for the analysis)
    #[arg(long, env = "SLABSIGHT_EXPORT_PATH")]
    pub export: Option<PathBuf>,

    /// Maximum retained snapshots (unbounded when omitted)
    #[arg(long, env = "SLABSIGHT_MAX_SNAPSHOTS")]
    pub max_snapshots: Option<usize>,

    /// Proc filesystem root, overridable for testing against a fake tree
    #[arg(long, default_value = "/proc", hide = true)]
    pub proc_root: PathBuf,
}

impl Cli {
    /// Layer the flags over an environment-loaded configuration; flags
    /// win. A zero interval falls back to the default.
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(pid) = self.pid {
            config.jvm_pid = Some(pid);
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if let Some(export) = &self.export {
            config.export_path = Some(export.clone());
        }
        if let Some(max) = self.max_snapshots {
            config.max_snapshots = Some(max);
        }
        if config.interval_secs == 0 {
            config.interval_secs = 5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "slabsight",
            "--pid",
            "4242",
            "--interval",
            "2",
            "--top",
            "5",
        ]);
        let mut config = MonitorConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.jvm_pid, Some(4242));
        assert_eq!(config.interval_secs, 2);
        assert_eq!(config.top_n, 5);
        assert!(config.export_path.is_none());
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let cli = Cli::parse_from(["slabsight", "--interval", "0"]);
        let mut config = MonitorConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.interval_secs, 5);
    }

    #[test]
    fn omitted_flags_leave_config_untouched() {
        let cli = Cli::parse_from(["slabsight"]);
        let mut config = MonitorConfig::default();
        config.jvm_pid = Some(1);
        cli.apply(&mut config);
        assert_eq!(config.jvm_pid, Some(1));
        assert_eq!(config.interval_secs, 5);
    }
}
