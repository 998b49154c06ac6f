use super::bin::AccumulationBin;
use super::frame::WriteFlags;
use crate::core::analysis::observable::{Observable, ObservableError, ObservableInput};
use crate::core::observables::registry::BinIndex;
use tracing::{trace, warn};

struct BoundObservable {
    index: BinIndex,
    name: String,
    observable: Box<dyn Observable>,
    degeneracy_reported: bool,
}

impl BoundObservable {
    /// Evaluates the observable and hands the value to `store`. Returns `false` when
    /// the slot was skipped and keeps its previous value.
    fn apply(
        &mut self,
        input: &ObservableInput<'_>,
        bin: &mut AccumulationBin,
        store: fn(&mut AccumulationBin, BinIndex, f64),
    ) -> bool {
        match self.observable.compute(input) {
            Ok(value) => {
                store(bin, self.index, value);
                true
            }
            Err(ObservableError::ZeroTotalMass) => {
                if !self.degeneracy_reported {
                    warn!(
                        observable = %self.name,
                        "Total mass is zero; reporting 0 for this observable."
                    );
                    self.degeneracy_reported = true;
                }
                store(bin, self.index, 0.0);
                true
            }
            Err(e) if e.is_missing_input() => {
                warn!(observable = %self.name, reason = %e, "Skipping observable; keeping its previous value.");
                false
            }
            Err(e) => {
                warn!(observable = %self.name, error = %e, "Observable evaluation failed; keeping its previous value.");
                false
            }
        }
    }
}

/// Compute functions bound to bin slots.
///
/// Lazy observables run only on steps whose energy flag is set, so their cost scales
/// with the energy output interval. Sampled observables run on every step that
/// collects data and feed the running sums.
#[derive(Default)]
pub struct LazyCalculator {
    lazy: Vec<BoundObservable>,
    sampled: Vec<BoundObservable>,
}

impl LazyCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_lazy(&mut self, index: BinIndex, name: &str, observable: Box<dyn Observable>) {
        self.lazy.push(BoundObservable {
            index,
            name: name.to_string(),
            observable,
            degeneracy_reported: false,
        });
    }

    pub fn bind_sampled(&mut self, index: BinIndex, name: &str, observable: Box<dyn Observable>) {
        self.sampled.push(BoundObservable {
            index,
            name: name.to_string(),
            observable,
            degeneracy_reported: false,
        });
    }

    pub fn lazy_count(&self) -> usize {
        self.lazy.len()
    }

    pub fn sampled_count(&self) -> usize {
        self.sampled.len()
    }

    /// Runs every lazy observable once if `flags.energy` is set and returns how many
    /// slots were updated. The restraint flags alone never trigger evaluation.
    pub fn evaluate(
        &mut self,
        flags: WriteFlags,
        input: &ObservableInput<'_>,
        bin: &mut AccumulationBin,
    ) -> usize {
        if !flags.energy {
            return 0;
        }
        let updated = self
            .lazy
            .iter_mut()
            .map(|entry| entry.apply(input, bin, AccumulationBin::update_instantaneous))
            .filter(|&applied| applied)
            .count();
        trace!(updated, total = self.lazy.len(), "Evaluated lazy observables.");
        updated
    }

    /// Runs every sampled observable. On summation steps the values enter the running
    /// sums, otherwise only the current values are replaced.
    pub fn sample(
        &mut self,
        input: &ObservableInput<'_>,
        bin: &mut AccumulationBin,
        summed: bool,
    ) -> usize {
        let store: fn(&mut AccumulationBin, BinIndex, f64) = if summed {
            AccumulationBin::update_summed
        } else {
            AccumulationBin::update_instantaneous
        };
        self.sampled
            .iter_mut()
            .map(|entry| entry.apply(input, bin, store))
            .filter(|&applied| applied)
            .count()
    }
}
