use super::blocks::{BiasWriter, RestraintData};
use crate::core::analysis::observable::ObservableInput;
use crate::core::models::Real;
use crate::core::models::topology::MolecularTopology;
use crate::core::utils::geometry::SimulationBox;
use nalgebra::{Point3, Vector3};

/// Everything the output borrows from the simulation for one call.
///
/// Built with [`StepState::new`] and the `with_*` methods so that new inputs can be
/// added without breaking callers.
#[non_exhaustive]
#[derive(Clone, Copy)]
pub struct StepState<'a> {
    pub step: i64,
    pub time: f64,
    pub positions: Option<&'a [Point3<Real>]>,
    pub velocities: Option<&'a [Vector3<Real>]>,
    pub topology: Option<&'a MolecularTopology>,
    pub simulation_box: &'a SimulationBox,
    pub restraints: Option<&'a dyn RestraintData>,
    pub bias: Option<&'a dyn BiasWriter>,
}

impl<'a> StepState<'a> {
    pub fn new(step: i64, time: f64, simulation_box: &'a SimulationBox) -> Self {
        Self {
            step,
            time,
            positions: None,
            velocities: None,
            topology: None,
            simulation_box,
            restraints: None,
            bias: None,
        }
    }

    pub fn with_positions(mut self, positions: &'a [Point3<Real>]) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn with_velocities(mut self, velocities: &'a [Vector3<Real>]) -> Self {
        self.velocities = Some(velocities);
        self
    }

    pub fn with_topology(mut self, topology: &'a MolecularTopology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_restraints(mut self, restraints: &'a dyn RestraintData) -> Self {
        self.restraints = Some(restraints);
        self
    }

    pub fn with_bias(mut self, bias: &'a dyn BiasWriter) -> Self {
        self.bias = Some(bias);
        self
    }

    /// The subset of the state observables are evaluated on.
    pub fn observable_input(&self) -> ObservableInput<'a> {
        ObservableInput {
            positions: self.positions,
            velocities: self.velocities,
            topology: self.topology,
            simulation_box: self.simulation_box,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{MoleculeBlock, MoleculeType};

    #[test]
    fn builder_fills_observable_input() {
        let topology = MolecularTopology::new(
            vec![MoleculeType::new("AR", vec![Atom::new("AR", 39.948)])],
            vec![MoleculeBlock::new(0, 2)],
        )
        .unwrap();
        let pbc = SimulationBox::rectangular(3.0, 3.0, 3.0).unwrap();
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];

        let state = StepState::new(50, 0.1, &pbc)
            .with_positions(&positions)
            .with_topology(&topology);
        let input = state.observable_input();

        assert_eq!(state.step, 50);
        assert_eq!(input.atom_count(), 2);
        assert_eq!(input.positions.map(<[_]>::len), Some(2));
        assert!(input.velocities.is_none());
        assert!(state.restraints.is_none());
        assert!(state.bias.is_none());
    }
}
