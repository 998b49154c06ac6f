use super::frame::WriteFlags;

/// `true` when `interval` is positive and divides `step`.
///
/// A zero interval disables the corresponding output altogether.
#[inline]
pub fn do_per_step(step: i64, interval: u64) -> bool {
    interval > 0 && step.rem_euclid(interval as i64) == 0
}

/// Output intervals, in steps, of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchedule {
    /// Interval between energy frames.
    pub nstenergy: u64,
    /// Interval between steps whose cheap data enters the running sums.
    pub nstcalcenergy: u64,
    /// Interval between log tables.
    pub nstlog: u64,
    pub nstdisreout: u64,
    pub nstorireout: u64,
}

impl Default for OutputSchedule {
    fn default() -> Self {
        Self {
            nstenergy: 1000,
            nstcalcenergy: 100,
            nstlog: 1000,
            nstdisreout: 100,
            nstorireout: 100,
        }
    }
}

impl OutputSchedule {
    /// The write flags for `step`. The last step of a run always carries energies.
    pub fn flags_for(&self, step: i64, last_step: bool) -> WriteFlags {
        WriteFlags {
            energy: do_per_step(step, self.nstenergy) || last_step,
            distance_restraints: do_per_step(step, self.nstdisreout),
            orientation_restraints: do_per_step(step, self.nstorireout),
        }
    }

    /// Whether the per-step data of `step` is added to the running sums.
    #[inline]
    pub fn is_summation_step(&self, step: i64) -> bool {
        do_per_step(step, self.nstcalcenergy)
    }

    /// Whether a log table is due. The first and last steps always log.
    #[inline]
    pub fn is_log_step(&self, step: i64, first_step: bool, last_step: bool) -> bool {
        do_per_step(step, self.nstlog) || first_step || last_step
    }

    /// Whether cheap per-step data must be collected at all on `step`.
    pub fn is_calculation_step(&self, step: i64, first_step: bool, last_step: bool) -> bool {
        self.is_summation_step(step)
            || self.flags_for(step, last_step).energy
            || self.is_log_step(step, first_step, last_step)
    }

    /// Whether every energy step is also a summation step.
    pub fn energy_interval_is_consistent(&self) -> bool {
        self.nstenergy == 0
            || (self.nstcalcenergy > 0 && self.nstenergy % self.nstcalcenergy == 0)
    }
}
