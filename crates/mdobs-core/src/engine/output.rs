use super::bin::AccumulationBin;
use super::blocks::{DeltaHCollection, FrameBlockSource};
use super::calculator::LazyCalculator;
use super::config::OutputConfig;
use super::error::OutputError;
use super::frame::{EnergyFrame, WriteFlags};
use super::sink::FrameSink;
use super::state::StepState;
use crate::core::analysis::observable::Observable;
use crate::core::observables::registry::{
    BinIndex, ObservableDescriptor, ObservableMode, ObservableRegistry,
};
use std::io::{self, Write};
use tracing::{debug, info, instrument, warn};

const LOG_COLUMNS: usize = 5;
const LOG_WIDTH: usize = 15;

/// What a call to [`EnergyOutput::write_step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    /// A frame was committed to the sink.
    pub frame_written: bool,
    /// The frame carried the energy block.
    pub energies_written: bool,
    /// Number of lazy observables whose slots were updated.
    pub lazy_evaluated: usize,
    /// The running sums were cleared after the commit.
    pub sums_reset: bool,
    /// A table was written to the log.
    pub logged: bool,
}

/// Owns the observable registry and the accumulation bin, and turns simulation
/// state into energy frames.
///
/// Setup happens through the `register_*` methods. Once the first frame is written
/// the set of observables is fixed. The per-step entry points are
/// [`add_data_at_energy_step`](Self::add_data_at_energy_step), called on every step
/// that collects cheap data, and [`write_step`](Self::write_step), called whenever any
/// output is due.
pub struct EnergyOutput {
    dt: f64,
    registry: ObservableRegistry,
    bin: AccumulationBin,
    calculator: LazyCalculator,
    delta_h: Option<DeltaHCollection>,
    block_sources: Vec<Box<dyn FrameBlockSource>>,
    header_written: bool,
    frames_written: u64,
}

impl EnergyOutput {
    /// Creates an output and registers the observables requested by `config`.
    ///
    /// Instantaneous observables are bound lazily; summed-averaged ones are sampled on
    /// every data step.
    pub fn new(config: &OutputConfig) -> Result<Self, OutputError> {
        let mut output = Self::with_dt(config.dt);
        for spec in &config.observables {
            let name = spec.display_name();
            let unit = spec.builtin.unit();
            match spec.mode {
                ObservableMode::Instantaneous => {
                    output.register_lazy(name, unit, Box::new(spec.builtin))?
                }
                ObservableMode::SummedAveraged => {
                    output.register_sampled(name, unit, Box::new(spec.builtin))?
                }
            };
        }
        info!(
            observables = output.registry.len(),
            "Energy output initialized."
        );
        Ok(output)
    }

    /// Creates an output without any observables.
    pub fn with_dt(dt: f64) -> Self {
        Self {
            dt,
            registry: ObservableRegistry::new(),
            bin: AccumulationBin::new(),
            calculator: LazyCalculator::new(),
            delta_h: None,
            block_sources: Vec::new(),
            header_written: false,
            frames_written: 0,
        }
    }

    /// Registers a slot whose values are supplied by the caller through
    /// [`add_data_at_energy_step`](Self::add_data_at_energy_step).
    pub fn register_observable(
        &mut self,
        name: &str,
        unit: &str,
        mode: ObservableMode,
    ) -> Result<BinIndex, OutputError> {
        let index = self.registry.register(name, unit, mode)?;
        self.bin.push_slot(mode);
        debug!(name, unit, %mode, %index, "Registered observable.");
        Ok(index)
    }

    /// Registers an instantaneous slot computed only on energy steps.
    pub fn register_lazy(
        &mut self,
        name: &str,
        unit: &str,
        observable: Box<dyn Observable>,
    ) -> Result<BinIndex, OutputError> {
        let index = self.register_observable(name, unit, ObservableMode::Instantaneous)?;
        self.calculator.bind_lazy(index, name, observable);
        Ok(index)
    }

    /// Registers a summed-averaged slot computed on every data step.
    pub fn register_sampled(
        &mut self,
        name: &str,
        unit: &str,
        observable: Box<dyn Observable>,
    ) -> Result<BinIndex, OutputError> {
        let index = self.register_observable(name, unit, ObservableMode::SummedAveraged)?;
        self.calculator.bind_sampled(index, name, observable);
        Ok(index)
    }

    /// Appends a collaborator whose blocks are added to every frame.
    pub fn attach_block_source(&mut self, source: Box<dyn FrameBlockSource>) {
        self.block_sources.push(source);
    }

    /// Enables collection of energy differences, written as a free-energy block.
    pub fn enable_delta_h_collection(&mut self) {
        self.delta_h.get_or_insert_with(DeltaHCollection::new);
    }

    /// Adds one energy-difference sample. Ignored unless collection is enabled.
    pub fn add_delta_h(&mut self, delta_h: f64) {
        if let Some(collection) = &mut self.delta_h {
            collection.push(delta_h);
        }
    }

    /// Records the cheap data of one step.
    ///
    /// `values` are stored through the summed path for summed-averaged slots when
    /// `sum` is set, and as current values otherwise. Sampled observables are then
    /// evaluated the same way, and the step counters advance.
    pub fn add_data_at_energy_step(
        &mut self,
        state: &StepState<'_>,
        sum: bool,
        values: &[(BinIndex, f64)],
    ) -> Result<(), OutputError> {
        if let Some(&(index, _)) = values.iter().find(|(i, _)| i.get() >= self.bin.len()) {
            return Err(OutputError::UnknownSlot(index));
        }
        for &(index, value) in values {
            match self.registry.mode(index) {
                ObservableMode::SummedAveraged if sum => self.bin.update_summed(index, value),
                _ => self.bin.update_instantaneous(index, value),
            }
        }
        self.calculator
            .sample(&state.observable_input(), &mut self.bin, sum);
        self.bin.advance_step(sum);
        Ok(())
    }

    /// Writes one frame if any flag is set.
    ///
    /// With the energy flag the lazy observables are evaluated and the frame carries
    /// a value per slot; otherwise the energy block is empty. Restraint blocks follow
    /// their own flags. The running sums are cleared only after a successful commit
    /// on an energy step, so a failed commit leaves them for the next attempt.
    /// A log, when given, receives the frame's energies, or the current values when
    /// the frame carries none. With all flags clear only that table is written. Once
    /// the frame is committed, a failing log is reported with a warning and the call
    /// still succeeds with `logged` unset.
    #[instrument(skip_all, name = "write_step", fields(step = state.step))]
    pub fn write_step(
        &mut self,
        sink: &mut dyn FrameSink,
        flags: WriteFlags,
        log: Option<&mut dyn Write>,
        state: &StepState<'_>,
    ) -> Result<WriteOutcome, OutputError> {
        let mut outcome = WriteOutcome::default();
        if !flags.any() {
            if let Some(log) = log {
                let current = self.current_values();
                self.write_log_table(log, state.step, state.time, &current)?;
                outcome.logged = true;
            }
            return Ok(outcome);
        }

        if !self.header_written {
            self.registry.freeze();
            sink.write_header(self.registry.descriptors())?;
            self.header_written = true;
            debug!(observables = self.registry.len(), "Wrote energy file header.");
        }

        let input = state.observable_input();
        outcome.lazy_evaluated = self.calculator.evaluate(flags, &input, &mut self.bin);

        let mut frame = EnergyFrame {
            time: state.time,
            step: state.step,
            dt: self.dt,
            nsteps: self.bin.steps_since_reset(),
            nsum: self.bin.summed_steps(),
            energies: if flags.energy {
                self.bin.snapshot_for_write()
            } else {
                Vec::new()
            },
            blocks: Vec::new(),
        };

        if let Some(restraints) = state.restraints {
            if flags.orientation_restraints {
                frame
                    .blocks
                    .extend(restraints.orientation_restraint_blocks());
            }
            if flags.distance_restraints {
                if let Some(block) = restraints.distance_restraint_block() {
                    frame.add_block(block);
                }
            }
        }
        if let Some(collection) = &mut self.delta_h {
            collection.append_blocks(&mut frame);
        }
        for source in &mut self.block_sources {
            source.append_blocks(&mut frame);
        }
        if let Some(bias) = state.bias {
            bias.write_to_energy_frame(state.step, &mut frame);
        }

        sink.commit(&frame)?;
        outcome.frame_written = true;
        outcome.energies_written = flags.energy;
        self.frames_written += 1;

        if let Some(collection) = &mut self.delta_h {
            collection.reset();
        }
        for source in &mut self.block_sources {
            source.reset();
        }
        if flags.energy {
            self.bin.reset_sums();
            outcome.sums_reset = true;
        }
        debug!(
            energies = frame.energies.len(),
            blocks = frame.blocks.len(),
            "Committed energy frame."
        );

        // Committed; log failures are only warnings from here on.
        if let Some(log) = log {
            let logged = if flags.energy {
                self.write_log_table(log, frame.step, frame.time, &frame.energies)
            } else {
                let current = self.current_values();
                self.write_log_table(log, frame.step, frame.time, &current)
            };
            match logged {
                Ok(()) => outcome.logged = true,
                Err(e) => warn!(step = frame.step, error = %e, "Failed to write log table."),
            }
        }
        Ok(outcome)
    }

    fn current_values(&self) -> Vec<f64> {
        self.registry
            .descriptors()
            .iter()
            .map(|d| self.bin.current(d.index))
            .collect()
    }

    /// Prints whole-run averages and fluctuations of the summed-averaged slots.
    pub fn print_averages(&self, log: &mut dyn Write) -> Result<(), OutputError> {
        writeln!(log, "\t<======  ###############  ==>")?;
        writeln!(log, "\t<====  A V E R A G E S  ====>")?;
        writeln!(log, "\t<==  ###############  ======>\n")?;
        writeln!(
            log,
            "{:<20}{:>width$}{:>width$}{:>12}  Unit",
            "Observable",
            "Average",
            "RMS Fluct.",
            "Samples",
            width = LOG_WIDTH
        )?;
        for descriptor in self.summed_descriptors() {
            let stats = self.bin.run_statistics(descriptor.index);
            writeln!(
                log,
                "{:<20}{:>width$.5e}{:>width$.5e}{:>12}  {}",
                descriptor.name,
                stats.mean,
                stats.rms_fluctuation,
                stats.samples,
                descriptor.unit,
                width = LOG_WIDTH
            )?;
        }
        writeln!(log)?;
        Ok(())
    }

    fn summed_descriptors(&self) -> impl Iterator<Item = &ObservableDescriptor> {
        self.registry
            .descriptors()
            .iter()
            .filter(|d| d.mode == ObservableMode::SummedAveraged)
    }

    fn write_log_table(
        &self,
        log: &mut dyn Write,
        step: i64,
        time: f64,
        values: &[f64],
    ) -> io::Result<()> {
        writeln!(log, "{:>w$}{:>w$}", "Step", "Time", w = LOG_WIDTH)?;
        writeln!(log, "{:>w$}{:>w$.5}\n", step, time, w = LOG_WIDTH)?;
        writeln!(log, "   Energies")?;
        let descriptors = self.registry.descriptors();
        for (names, row) in descriptors
            .chunks(LOG_COLUMNS)
            .zip(values.chunks(LOG_COLUMNS))
        {
            for descriptor in names {
                write!(log, "{:>w$}", descriptor.name, w = LOG_WIDTH)?;
            }
            writeln!(log)?;
            for value in row {
                write!(log, "{:>w$.5e}", value, w = LOG_WIDTH)?;
            }
            writeln!(log)?;
        }
        writeln!(log)
    }

    pub fn registry(&self) -> &ObservableRegistry {
        &self.registry
    }

    pub fn bin(&self) -> &AccumulationBin {
        &self.bin
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}
