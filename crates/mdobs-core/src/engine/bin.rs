use crate::core::observables::registry::{BinIndex, ObservableMode};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BinSlot {
    mode: ObservableMode,
    current: f64,
    sum: f64,
    sum_of_squares: f64,
    samples: u64,
    run_sum: f64,
    run_sum_of_squares: f64,
    run_samples: u64,
}

/// Mean, spread and sample count of one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStatistics {
    pub mean: f64,
    /// Root-mean-square fluctuation around the mean.
    pub rms_fluctuation: f64,
    pub samples: u64,
}

impl SlotStatistics {
    fn from_sums(sum: f64, sum_of_squares: f64, samples: u64) -> Self {
        if samples == 0 {
            return Self {
                mean: 0.0,
                rms_fluctuation: 0.0,
                samples,
            };
        }
        let n = samples as f64;
        let mean = sum / n;
        let variance = (sum_of_squares / n - mean * mean).max(0.0);
        Self {
            mean,
            rms_fluctuation: variance.sqrt(),
            samples,
        }
    }
}

/// Per-slot storage of values between two energy frames.
///
/// Slots are addressed by [`BinIndex`] and stored in a flat vector, so every update is
/// an index into an array. Summed slots keep interval sums, cleared by
/// [`AccumulationBin::reset_sums`] after each written frame, and whole-run sums that are
/// never cleared.
#[derive(Debug, Clone, Default)]
pub struct AccumulationBin {
    slots: Vec<BinSlot>,
    steps: u64,
    summed_steps: u64,
}

impl AccumulationBin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slot for a newly registered observable. Slots must be added in
    /// registration order so that slot `i` belongs to `BinIndex(i)`.
    pub(crate) fn push_slot(&mut self, mode: ObservableMode) {
        self.slots.push(BinSlot {
            mode,
            ..BinSlot::default()
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Overwrites the current value; the summed accumulators are left untouched.
    #[inline]
    pub fn update_instantaneous(&mut self, index: BinIndex, value: f64) {
        self.slots[index.get()].current = value;
    }

    /// Adds one sample to the interval and whole-run sums and records it as the
    /// current value.
    #[inline]
    pub fn update_summed(&mut self, index: BinIndex, value: f64) {
        let slot = &mut self.slots[index.get()];
        slot.current = value;
        slot.sum += value;
        slot.sum_of_squares += value * value;
        slot.samples += 1;
        slot.run_sum += value;
        slot.run_sum_of_squares += value * value;
        slot.run_samples += 1;
    }

    /// Counts one simulation step; `summed` marks steps whose data entered the sums.
    pub fn advance_step(&mut self, summed: bool) {
        self.steps += 1;
        if summed {
            self.summed_steps += 1;
        }
    }

    #[inline]
    pub fn current(&self, index: BinIndex) -> f64 {
        self.slots[index.get()].current
    }

    /// Number of samples summed into a slot since the last reset.
    #[inline]
    pub fn sample_count(&self, index: BinIndex) -> u64 {
        self.slots[index.get()].samples
    }

    /// Steps counted since the last reset.
    #[inline]
    pub fn steps_since_reset(&self) -> u64 {
        self.steps
    }

    /// Summed steps counted since the last reset.
    #[inline]
    pub fn summed_steps(&self) -> u64 {
        self.summed_steps
    }

    /// The per-slot values to embed in a frame.
    ///
    /// Summed slots report their interval average (zero without samples), instantaneous
    /// slots their current value. Calling this does not modify the bin.
    pub fn snapshot_for_write(&self) -> Vec<f64> {
        self.slots
            .iter()
            .map(|slot| match slot.mode {
                ObservableMode::Instantaneous => slot.current,
                ObservableMode::SummedAveraged if slot.samples == 0 => 0.0,
                ObservableMode::SummedAveraged => slot.sum / slot.samples as f64,
            })
            .collect()
    }

    /// Interval statistics of a slot since the last reset.
    pub fn interval_statistics(&self, index: BinIndex) -> SlotStatistics {
        let slot = &self.slots[index.get()];
        SlotStatistics::from_sums(slot.sum, slot.sum_of_squares, slot.samples)
    }

    /// Statistics of a slot over the whole run.
    pub fn run_statistics(&self, index: BinIndex) -> SlotStatistics {
        let slot = &self.slots[index.get()];
        SlotStatistics::from_sums(slot.run_sum, slot.run_sum_of_squares, slot.run_samples)
    }

    /// Clears the interval sums, sample counts and step counters.
    ///
    /// Current values and whole-run sums survive. Must be called once per written
    /// frame, after the frame has taken its snapshot.
    pub fn reset_sums(&mut self) {
        for slot in &mut self.slots {
            slot.sum = 0.0;
            slot.sum_of_squares = 0.0;
            slot.samples = 0;
        }
        self.steps = 0;
        self.summed_steps = 0;
    }
}
