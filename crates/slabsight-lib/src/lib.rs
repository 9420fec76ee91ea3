//! SlabSight library
//!
//! This crate provides the core functionality for:
//! - Snapshot collection from kernel text interfaces and a target JVM
//! - Per-metric trend tracking (EMA, growth, monotonic streaks)
//! - Cross-metric correlation and fragmentation scoring
//! - Alert classification and top-N ranking
//! - The periodic sampling loop and history export

pub mod alert;
pub mod collector;
pub mod config;
pub mod correlation;
pub mod export;
pub mod fragmentation;
pub mod models;
pub mod monitor;
pub mod scheduler;
pub mod store;
pub mod trend;

pub use alert::{AlertClassifier, PressureAlert, Severity, Thresholds};
pub use collector::{ProcCollector, SnapshotCollector};
pub use config::MonitorConfig;
pub use correlation::CorrelationResult;
pub use fragmentation::FragmentationIndex;
pub use models::{MetaspaceStats, Snapshot};
pub use monitor::{AnalysisReport, CycleReport, Monitor};
pub use scheduler::{CycleSink, SamplingConfig, SamplingLoop};
pub use store::{SnapshotStore, StoreError};
pub use trend::{Growth, TrendResult, TrendTracker};
