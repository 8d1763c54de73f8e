//! `sync` command implementation.

use anyhow::{Context, Result};
use codec::{write_frames, BinaryStream, FileMode, FileStream, FrameOptions};
use contracts::{Acquisition, OptionValue, Severity, SyncReport};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use sync_engine::Synchronizer;
use tracing::{info, warn};

use super::load_session;
use crate::cli::SyncArgs;

/// Execute the `sync` command
pub fn run_sync(args: &SyncArgs) -> Result<()> {
    let session = load_session(args.config.as_deref())?;
    if let Some(port) = session.logging.metrics_port {
        observability::init_metrics_only(port)?;
    }

    info!(input = %args.input.display(), "Loading input");
    let input = config_loader::ConfigLoader::load_input_from_path(&args.input)
        .with_context(|| format!("Failed to load input from {}", args.input.display()))?;

    let report = Synchronizer::new(session.synchronizer.clone())
        .run(input)
        .context("Synchronization failed")?;
    observability::record_sync_report(&report);

    write_json(&report.acquisition, &args.output)?;
    if let Some(ref data) = args.data {
        let bytes = write_data(&report.acquisition, &session.output, data)?;
        info!(path = %data.display(), bytes, "Frame block written");
    }

    print_report(&report);
    Ok(())
}

fn write_json(acquisition: &Acquisition, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), acquisition)
        .with_context(|| format!("Failed to write acquisition to {}", path.display()))
}

/// Resolve the output options through the writer registry and encode the
/// frame block
fn write_data(
    acquisition: &Acquisition,
    output: &BTreeMap<String, OptionValue>,
    path: &Path,
) -> Result<u64> {
    let mut registry = FrameOptions::registry();
    for (name, value) in output {
        // rejected values keep the default, the registry already warned
        if !registry.set(name, value.clone()) {
            warn!(option = %name, value = %value, "output option ignored");
        }
    }
    let options = FrameOptions::from_registry(&registry);
    let codec = options.codec();

    let mut stream = FileStream::open(path, FileMode::Write)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let written = write_frames(acquisition, &codec, &mut stream, &options)
        .with_context(|| format!("Failed to write frame block to {}", path.display()))?;
    stream.close();
    Ok(written)
}

fn print_report(report: &SyncReport) {
    let acquisition = &report.acquisition;
    println!("Synchronized acquisition");
    println!("  Point frequency: {} Hz", acquisition.point_frequency);
    println!("  Analog frequency: {} Hz", acquisition.analog_frequency());
    println!(
        "  Frames: {} (first {}, last {})",
        acquisition.point_frame_count,
        acquisition.first_frame,
        acquisition.last_frame()
    );
    println!("  Markers: {}", acquisition.points.len());
    println!("  Analogs: {}", acquisition.analogs.len());

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            let marker = match warning.severity {
                Severity::Info => "i",
                Severity::Warning => "!",
            };
            println!("  {} {}: {}", marker, warning.kind, warning.message);
        }
    }
}
