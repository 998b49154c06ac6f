use crate::core::models::Real;
use crate::core::models::topology::MolecularTopology;
use crate::core::utils::geometry::SimulationBox;
use crate::engine::error::OutputError;
use crate::engine::output::EnergyOutput;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::schedule::OutputSchedule;
use crate::engine::sink::FrameSink;
use crate::engine::state::StepState;
use nalgebra::{Point3, Vector3};
use std::io::Write;
use tracing::{info, instrument, warn};

/// One recorded configuration of the system.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryFrame {
    pub step: i64,
    pub time: f64,
    pub positions: Vec<Point3<Real>>,
    pub velocities: Option<Vec<Vector3<Real>>>,
}

/// The static inputs of a replay.
#[derive(Debug, Clone, Copy)]
pub struct ReplaySetup<'a> {
    pub schedule: OutputSchedule,
    pub topology: Option<&'a MolecularTopology>,
    pub simulation_box: &'a SimulationBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub frames_processed: usize,
    /// Frames committed to the sink, with or without energies.
    pub frames_written: usize,
    pub energy_frames: usize,
    /// Total number of lazy observable evaluations.
    pub lazy_evaluations: usize,
}

/// Replays `frames` through `output` as if they were the steps of a live run.
///
/// Each frame is treated as a simulation step: cheap data is collected on
/// calculation steps, and frames and log tables are written as the schedule
/// dictates. The last frame always carries energies. When a log is given, the run
/// averages are printed at the end.
#[instrument(skip_all, name = "replay_workflow", fields(frames = frames.len()))]
pub fn run(
    output: &mut EnergyOutput,
    frames: &[TrajectoryFrame],
    setup: &ReplaySetup<'_>,
    sink: &mut dyn FrameSink,
    mut log: Option<&mut dyn Write>,
    reporter: &ProgressReporter,
) -> Result<ReplaySummary, OutputError> {
    let mut summary = ReplaySummary::default();
    if frames.is_empty() {
        warn!("Trajectory contains no frames; nothing to replay.");
        reporter.report(Progress::Message(
            "Trajectory contains no frames; nothing to replay.".to_string(),
        ));
        return Ok(summary);
    }

    reporter.report(Progress::PhaseStart { name: "Replay" });
    if setup.topology.is_none() {
        warn!("No topology given; mass-weighted observables will not be evaluated.");
        reporter.report(Progress::Message(
            "No topology given; mass-weighted observables keep their previous values."
                .to_string(),
        ));
    }
    reporter.report(Progress::TaskStart {
        total_steps: frames.len() as u64,
    });
    info!(
        frames = frames.len(),
        observables = output.registry().len(),
        "Replaying trajectory through the energy output."
    );

    let schedule = &setup.schedule;
    let last_index = frames.len() - 1;
    for (i, frame) in frames.iter().enumerate() {
        let first = i == 0;
        let last = i == last_index;

        let mut state = StepState::new(frame.step, frame.time, setup.simulation_box)
            .with_positions(&frame.positions);
        if let Some(topology) = setup.topology {
            state = state.with_topology(topology);
        }
        if let Some(velocities) = &frame.velocities {
            state = state.with_velocities(velocities);
        }

        if schedule.is_calculation_step(frame.step, first, last) {
            output.add_data_at_energy_step(
                &state,
                schedule.is_summation_step(frame.step),
                &[],
            )?;
        }

        let flags = schedule.flags_for(frame.step, last);
        let log_step = schedule.is_log_step(frame.step, first, last);
        if flags.any() || log_step {
            let frame_log = match &mut log {
                Some(log) if log_step => Some(&mut **log as &mut dyn Write),
                _ => None,
            };
            let wants_log = frame_log.is_some();
            let outcome = output.write_step(sink, flags, frame_log, &state)?;
            if wants_log && !outcome.logged {
                reporter.report(Progress::Message(format!(
                    "Log table for step {} could not be written.",
                    frame.step
                )));
            }
            summary.lazy_evaluations += outcome.lazy_evaluated;
            if outcome.frame_written {
                summary.frames_written += 1;
                reporter.report(Progress::FrameWritten {
                    step: frame.step,
                    energies: outcome.energies_written,
                });
            }
            if outcome.energies_written {
                summary.energy_frames += 1;
            }
        }

        summary.frames_processed += 1;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    if let Some(log) = log {
        output.print_averages(log)?;
    }
    reporter.report(Progress::PhaseFinish);

    info!(
        frames_written = summary.frames_written,
        energy_frames = summary.energy_frames,
        "Replay complete."
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::builtin::BuiltinObservable;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{MoleculeBlock, MoleculeType};
    use crate::core::observables::registry::ObservableMode;
    use crate::engine::config::{ObservableSpec, OutputConfigBuilder};
    use crate::engine::sink::{CsvFrameSink, FrameRecorder};
    use std::sync::Mutex;

    fn dimer_frames(count: i64, stride: i64) -> Vec<TrajectoryFrame> {
        (0..count)
            .map(|i| {
                let separation = 2.0 + i as Real * 0.5;
                TrajectoryFrame {
                    step: i * stride,
                    time: (i * stride) as f64 * 0.002,
                    positions: vec![Point3::origin(), Point3::new(separation, 0.0, 0.0)],
                    velocities: Some(vec![Vector3::new(1.0, 0.0, 0.0); 2]),
                }
            })
            .collect()
    }

    fn topology() -> MolecularTopology {
        MolecularTopology::new(
            vec![MoleculeType::new(
                "DI",
                vec![Atom::new("A", 1.0), Atom::new("B", 1.0)],
            )],
            vec![MoleculeBlock::new(0, 1)],
        )
        .unwrap()
    }

    fn output() -> EnergyOutput {
        let config = OutputConfigBuilder::new()
            .dt(0.002)
            .observable(ObservableSpec::new(BuiltinObservable::RadiusOfGyration))
            .observable(
                ObservableSpec::new(BuiltinObservable::KineticEnergy)
                    .mode(ObservableMode::SummedAveraged),
            )
            .build()
            .unwrap();
        EnergyOutput::new(&config).unwrap()
    }

    fn schedule() -> OutputSchedule {
        OutputSchedule {
            nstenergy: 20,
            nstcalcenergy: 10,
            nstlog: 0,
            nstdisreout: 0,
            nstorireout: 0,
        }
    }

    #[test]
    fn replay_writes_frames_on_energy_steps() {
        let topology = topology();
        let pbc = SimulationBox::rectangular(10.0, 10.0, 10.0).unwrap();
        let setup = ReplaySetup {
            schedule: schedule(),
            topology: Some(&topology),
            simulation_box: &pbc,
        };
        // Steps 0, 10, 20, 30, 40, 50.
        let frames = dimer_frames(6, 10);
        let mut output = output();
        let mut sink = FrameRecorder::new();

        let summary = run(
            &mut output,
            &frames,
            &setup,
            &mut sink,
            None,
            &ProgressReporter::new(),
        )
        .unwrap();

        // Energy at 0, 20, 40 and the last step 50.
        assert_eq!(summary.frames_processed, 6);
        assert_eq!(summary.energy_frames, 4);
        assert_eq!(summary.frames_written, 4);
        assert_eq!(summary.lazy_evaluations, 4);

        let rg = sink.series("Radius-Gyration");
        assert_eq!(rg.len(), 4);
        // Separation 2.0 at step 0 and 3.0 at step 20.
        assert!((rg[0] - 1.0).abs() < 1e-6);
        assert!((rg[1] - 1.5).abs() < 1e-6);

        let ke = sink.series("Kinetic-Obs");
        assert!(ke.iter().all(|&v| (v - 1.0).abs() < 1e-6));
        let steps: Vec<i64> = sink.frames.iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 20, 40, 50]);
        assert_eq!(sink.frames[1].nsum, 2);
    }

    #[test]
    fn replay_reports_progress_and_logs_averages() {
        let topology = topology();
        let pbc = SimulationBox::rectangular(10.0, 10.0, 10.0).unwrap();
        let setup = ReplaySetup {
            schedule: OutputSchedule {
                nstlog: 20,
                ..schedule()
            },
            topology: Some(&topology),
            simulation_box: &pbc,
        };
        let frames = dimer_frames(3, 10);
        let mut output = output();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let mut log: Vec<u8> = Vec::new();

        run(
            &mut output,
            &frames,
            &setup,
            &mut FrameRecorder::new(),
            Some(&mut log as &mut dyn Write),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 3);
        assert_eq!(events.first(), Some(&Progress::PhaseStart { name: "Replay" }));
        assert_eq!(events.last(), Some(&Progress::PhaseFinish));

        let text = String::from_utf8(log).unwrap();
        assert!(text.contains("A V E R A G E S"));
        assert!(text.contains("Kinetic-Obs"));
    }

    #[test]
    fn replay_writes_csv_energy_file() {
        let topology = topology();
        let pbc = SimulationBox::rectangular(10.0, 10.0, 10.0).unwrap();
        let setup = ReplaySetup {
            schedule: schedule(),
            topology: Some(&topology),
            simulation_box: &pbc,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energy.csv");
        let mut sink = CsvFrameSink::create(&path).unwrap();
        let mut output = output();

        run(
            &mut output,
            &dimer_frames(3, 10),
            &setup,
            &mut sink,
            None,
            &ProgressReporter::new(),
        )
        .unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("time,step,dt,nsteps,nsum,Radius-Gyration (nm),Kinetic-Obs (kJ/mol),blocks")
        );
        // Frames at steps 0 and 20.
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn empty_trajectory_is_a_no_op() {
        let pbc = SimulationBox::none();
        let setup = ReplaySetup {
            schedule: schedule(),
            topology: None,
            simulation_box: &pbc,
        };
        let mut sink = FrameRecorder::new();
        let summary = run(
            &mut output(),
            &[],
            &setup,
            &mut sink,
            None,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(summary, ReplaySummary::default());
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn replay_without_topology_reports_a_message() {
        let pbc = SimulationBox::rectangular(10.0, 10.0, 10.0).unwrap();
        let setup = ReplaySetup {
            schedule: schedule(),
            topology: None,
            simulation_box: &pbc,
        };
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        let summary = run(
            &mut output(),
            &dimer_frames(2, 10),
            &setup,
            &mut FrameRecorder::new(),
            None,
            &reporter,
        )
        .unwrap();
        drop(reporter);

        assert_eq!(summary.frames_processed, 2);
        let events = events.into_inner().unwrap();
        assert!(matches!(&events[1], Progress::Message(msg) if msg.contains("No topology")));
    }
}
