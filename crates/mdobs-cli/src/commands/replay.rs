use crate::cli::ReplayArgs;
use crate::config::{IntervalOverrides, RunConfig};
use crate::error::{CliError, Result};
use crate::trajectory;
use crate::utils::progress::ReplayProgress;
use mdobs::engine::error::OutputError;
use mdobs::engine::output::EnergyOutput;
use mdobs::engine::progress::ProgressReporter;
use mdobs::engine::sink::CsvFrameSink;
use mdobs::workflows::replay::{self, ReplaySetup, ReplaySummary};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, warn};

pub fn run(args: ReplayArgs) -> Result<()> {
    let config = RunConfig::from_file(&args.config, IntervalOverrides::from(&args))?;
    let frames = trajectory::load(&args.trajectory)?;

    if let (Some(topology), Some(first)) = (&config.topology, frames.first()) {
        if topology.atom_count() != first.positions.len() {
            return Err(CliError::Config(format!(
                "Topology describes {} atoms but the trajectory has {} per frame",
                topology.atom_count(),
                first.positions.len()
            )));
        }
    } else if config.topology.is_none() {
        warn!("No topology given; mass-weighted observables will keep their previous values.");
    }

    let mut output = EnergyOutput::new(&config.output)?;
    let mut sink = CsvFrameSink::create(&args.output).map_err(OutputError::from)?;
    let mut log_writer = match &args.log {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let setup = ReplaySetup {
        schedule: config.output.schedule,
        topology: config.topology.as_ref(),
        simulation_box: &config.simulation_box,
    };

    let progress_handler = ReplayProgress::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Replaying {} frame(s) with {} observable(s)...",
        frames.len(),
        output.registry().len()
    );
    info!("Invoking the core replay workflow...");

    let summary = replay::run(
        &mut output,
        &frames,
        &setup,
        &mut sink,
        log_writer.as_mut().map(|w| w as &mut dyn Write),
        &reporter,
    )?;
    if let Some(mut writer) = log_writer {
        writer.flush()?;
    }

    print_summary(&summary, &args);
    Ok(())
}

fn print_summary(summary: &ReplaySummary, args: &ReplayArgs) {
    info!(?summary, "Replay finished.");
    println!(
        "✓ {} frame(s) written ({} with energies) to: {}",
        summary.frames_written,
        summary.energy_frames,
        args.output.display()
    );
    if let Some(log) = &args.log {
        println!("  Energy log written to: {}", log.display());
    }
}
