//! SlabSight - kernel and JVM memory leak watchdog
//!
//! Samples /proc/slabinfo, /proc/vmstat and /proc/buddyinfo (plus an
//! optional JVM metaspace probe) on a fixed interval, tracks growth
//! trends, and prints a correlation analysis and optional export when
//! interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use slabsight_lib::export;
use slabsight_lib::{
    FragmentationIndex, Monitor, ProcCollector, SamplingConfig, SamplingLoop, SnapshotCollector,
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod config;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let args = cli::Cli::parse();
    let mut config = config::load()?;
    args.apply(&mut config);

    info!(
        interval_secs = config.interval_secs,
        jvm_pid = config.jvm_pid,
        "starting slabsight"
    );

    let mut collector = ProcCollector::with_proc_root(&args.proc_root);
    if let Some(pid) = config.jvm_pid {
        collector = collector.with_jvm_pid(pid);
    }
    let collector: Arc<dyn SnapshotCollector> = Arc::new(collector);

    let monitor = Monitor::new(&config);
    let sampling = SamplingConfig {
        interval: Duration::from_secs(config.interval_secs),
    };
    let sink = output::ConsoleSink::new(config.tracked.clone());

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let loop_handle = tokio::spawn(SamplingLoop::new(collector, monitor, sampling, sink).run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    println!("\nReceived interrupt signal. Generating report...");
    let _ = shutdown_tx.send(());

    let monitor = loop_handle.await?;
    let report = monitor.final_report();
    output::print_report(&report);

    if let Some(path) = &config.export_path {
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let result = if is_json {
            export::export_json(&report, path)
        } else {
            export::export_csv(
                monitor.store(),
                &config.tracked,
                &FragmentationIndex::new(
                    config.fragmentation_min_order,
                    config.fragmentation_max_order,
                ),
                config.ema_alpha,
                path,
            )
        };

        match result {
            Ok(()) => output::print_success(&format!("Data exported to {}", path.display())),
            Err(e) => output::print_error(&format!("export failed: {e:#}")),
        }
    }

    Ok(())
}
