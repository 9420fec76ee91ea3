//! JVM metaspace probing through `jcmd <pid> VM.metaspace`

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::models::MetaspaceStats;

/// Run jcmd against the target JVM and extract its metaspace figures.
pub async fn read_metaspace(pid: u32) -> Result<MetaspaceStats> {
    let output = Command::new("jcmd")
        .arg(pid.to_string())
        .arg("VM.metaspace")
        .output()
        .await
        .context("failed to spawn jcmd")?;

    if !output.status.success() {
        anyhow::bail!("jcmd exited with {} for pid {}", output.status, pid);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_metaspace(&stdout)
        .with_context(|| format!("no usable Both: line in jcmd output for pid {}", pid))
}

/// Extract committed/used KiB from the summary `Both:` line.
///
/// The line reads like
/// `Both: 2422 chunks, 40.63 MB capacity, 40.20 MB ( 99%) committed, 39.67 MB ( 98%) used, ...`;
/// the MB figures appear in capacity/committed/used order.
pub fn parse_metaspace(content: &str) -> Option<MetaspaceStats> {
    let line = content
        .lines()
        .find(|line| line.trim_start().starts_with("Both:"))?;

    let mut mb_values: Vec<f64> = Vec::new();
    let fields: Vec<&str> = line.split_whitespace().collect();
    for pair in fields.windows(2) {
        if pair[1].starts_with("MB") {
            if let Ok(value) = pair[0].parse::<f64>() {
                mb_values.push(value);
            }
        }
    }

    if mb_values.len() < 3 {
        return None;
    }

    Some(MetaspaceStats {
        committed_kb: (mb_values[1] * 1024.0) as u64,
        used_kb: (mb_values[2] * 1024.0) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JCMD_OUTPUT: &str = "\
12345:
Total Usage - 1234 loaders, 20567 classes (1451 shared):

  Non-Class: 1855 chunks, 35.12 MB capacity, 34.81 MB ( 99%) committed, 34.39 MB ( 98%) used
      Class: 567 chunks, 5.51 MB capacity, 5.39 MB ( 98%) committed, 5.28 MB ( 96%) used
       Both: 2422 chunks, 40.63 MB capacity, 40.20 MB ( 99%) committed, 39.67 MB ( 98%) used

Virtual space:
";

    #[test]
    fn extracts_committed_and_used_from_both_line() {
        let stats = parse_metaspace(JCMD_OUTPUT).unwrap();
        assert_eq!(stats.committed_kb, (40.20f64 * 1024.0) as u64);
        assert_eq!(stats.used_kb, (39.67f64 * 1024.0) as u64);
    }

    #[test]
    fn missing_both_line_is_none() {
        assert!(parse_metaspace("Total Usage - nothing here\n").is_none());
    }

    #[test]
    fn both_line_with_too_few_figures_is_none() {
        assert!(parse_metaspace("Both: 12 chunks, 1.00 MB capacity\n").is_none());
    }
}
