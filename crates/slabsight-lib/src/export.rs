//! Row-oriented history export
//!
//! Writes the retained history as CSV, one row per snapshot: timestamp,
//! metaspace usage, scan rate, raw value and growth for each tracked
//! metric, and the fragmentation score. Growth is replayed through the
//! same per-metric update rule the live engine uses, so exported figures
//! match what the console showed. A JSON export of the shutdown analysis
//! is also available.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fragmentation::FragmentationIndex;
use crate::monitor::AnalysisReport;
use crate::store::SnapshotStore;
use crate::trend::{Growth, MetricSeries};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize analysis report")]
    Serialize(#[from] serde_json::Error),
}

/// Short column label for a namespaced metric: the part after the
/// namespace prefix, with non-word characters flattened.
fn column_label(metric: &str) -> String {
    let short = metric.rsplit('/').next().unwrap_or(metric);
    short.replace(|c: char| !c.is_ascii_alphanumeric(), "_")
}

/// Write the history as CSV to any writer.
pub fn write_csv<W: Write>(
    store: &SnapshotStore,
    tracked: &[String],
    fragmentation: &FragmentationIndex,
    alpha: f64,
    mut out: W,
) -> io::Result<()> {
    write!(out, "timestamp,metaspace_kb,slabs_scanned_per_sec")?;
    for metric in tracked {
        let label = column_label(metric);
        write!(out, ",{},{}_growth_pct", label, label)?;
    }
    writeln!(out, ",fragmentation_index")?;

    let mut series: Vec<MetricSeries> = tracked.iter().map(|_| MetricSeries::default()).collect();

    for snap in store.iter() {
        let metaspace_kb = snap.metaspace.map(|m| m.used_kb).unwrap_or(0);
        write!(
            out,
            "{},{},{:.4}",
            snap.timestamp, metaspace_kb, snap.rates.slabs_scanned_per_sec
        )?;

        for (i, metric) in tracked.iter().enumerate() {
            let value = snap.metric(metric).unwrap_or(0);
            let trend = series[i].update(value, alpha);
            match trend.growth {
                Growth::Percent(p) => write!(out, ",{},{:.4}", value, p)?,
                // no finite percentage for growth off a zero baseline
                Growth::FromZero => write!(out, ",{},", value)?,
            }
        }

        writeln!(out, ",{:.6}", fragmentation.compute(&snap.free_pages_by_order))?;
    }

    Ok(())
}

/// Write the history as CSV to a file.
pub fn export_csv(
    store: &SnapshotStore,
    tracked: &[String],
    fragmentation: &FragmentationIndex,
    alpha: f64,
    path: &Path,
) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_csv(store, tracked, fragmentation, alpha, &mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

/// Write the shutdown analysis as pretty JSON to a file.
pub fn export_json(report: &AnalysisReport, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
