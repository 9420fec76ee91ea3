//! Console rendering
//!
//! Live per-cycle line, top-N growth table and the shutdown analysis
//! report, color-coded by severity tier.

use colored::Colorize;
use slabsight_lib::models::metric;
use slabsight_lib::monitor::{AnalysisReport, CorrelationStrength, CycleReport, Variability};
use slabsight_lib::scheduler::CycleSink;
use slabsight_lib::{Growth, Severity};
use tabled::{settings::Style, Table, Tabled};

/// Renders each cycle to the terminal.
pub struct ConsoleSink {
    /// Metrics surfaced on the live line, by namespaced name
    tracked: Vec<String>,
}

impl ConsoleSink {
    pub fn new(tracked: Vec<String>) -> Self {
        Self { tracked }
    }

    fn live_line(&self, report: &CycleReport) -> String {
        let mut parts = vec![format!("[{}]", report.timestamp)];

        if let Some(metaspace) = report.trends.get(metric::METASPACE_USED) {
            parts.push(format!("Metaspace: {} KB", metaspace.value));
        }
        for name in &self.tracked {
            if let Some(trend) = report.trends.get(name) {
                parts.push(format!("{}: {}", short_name(name), trend.value));
            }
        }
        parts.push(format!("Frag: {:.3}", report.fragmentation));

        parts.join(" | ")
    }
}

impl CycleSink for ConsoleSink {
    fn on_cycle(&mut self, report: &CycleReport) {
        println!("{}", self.live_line(report));
        print_top_table(report);

        if let Some(pressure) = &report.pressure {
            println!(
                "{} {}",
                "⚠".yellow().bold(),
                format!(
                    "memory pressure: {} free pages (floor {}) while unreclaimable slab grew {} cycle(s)",
                    pressure.free_pages, pressure.floor, pressure.unreclaimable_streak
                )
                .yellow()
            );
        }
    }
}

#[derive(Tabled)]
struct TopRow {
    #[tabled(rename = "metric")]
    metric: String,
    #[tabled(rename = "value")]
    value: u64,
    #[tabled(rename = "growth")]
    growth: String,
    #[tabled(rename = "ema")]
    ema: String,
    #[tabled(rename = "streak")]
    streak: u32,
    #[tabled(rename = "severity")]
    severity: String,
}

/// Print the cycle's fastest growers, skipping the table entirely when
/// nothing moved.
fn print_top_table(report: &CycleReport) {
    let rows: Vec<TopRow> = report
        .top
        .iter()
        .filter(|(_, trend)| trend.growth != Growth::ZERO || trend.streak > 0)
        .map(|(name, trend)| {
            let severity = report
                .severities
                .get(name)
                .copied()
                .unwrap_or(Severity::None);
            TopRow {
                metric: name.clone(),
                value: trend.value,
                growth: trend.growth.to_string(),
                ema: format!("{:.1}", trend.ema),
                streak: trend.streak,
                severity: color_severity(severity),
            }
        })
        .collect();

    if rows.is_empty() {
        return;
    }

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print the shutdown analysis, banded the way the live report is.
pub fn print_report(report: &AnalysisReport) {
    println!("\n=== SLABSIGHT ANALYSIS REPORT ===\n");
    println!("Total samples: {}", report.samples);
    println!("Duration: {} seconds\n", report.duration_secs);

    if report.samples < 2 {
        println!("Not enough samples for analysis.");
        return;
    }

    let strength = report.correlation_strength();
    println!(
        "JVM-kernel correlation: {:.4} ({})",
        report.correlation.pearson_correlation,
        color_strength(strength)
    );

    let variability = report.variability();
    println!(
        "Coefficient of variation: {:.4} ({})",
        report.correlation.coefficient_of_variation,
        color_variability(variability)
    );

    println!("Average slabs scanned/sec: {:.2}", report.mean_scan_rate);
    println!("\n=================================");
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

fn short_name(metric: &str) -> &str {
    metric.rsplit('/').next().unwrap_or(metric)
}

fn color_severity(severity: Severity) -> String {
    match severity {
        Severity::None => severity.to_string(),
        Severity::Warn => severity.to_string().yellow().to_string(),
        Severity::Critical => severity.to_string().red().bold().to_string(),
    }
}

fn color_strength(strength: CorrelationStrength) -> String {
    match strength {
        CorrelationStrength::Strong => strength.to_string().red().bold().to_string(),
        CorrelationStrength::Moderate => strength.to_string().yellow().to_string(),
        CorrelationStrength::Weak => strength.to_string().green().to_string(),
    }
}

fn color_variability(variability: Variability) -> String {
    match variability {
        Variability::Erratic => variability.to_string().red().bold().to_string(),
        Variability::Moderate => variability.to_string().yellow().to_string(),
        Variability::Stable => variability.to_string().green().to_string(),
    }
}
