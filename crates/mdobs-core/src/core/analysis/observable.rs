use crate::core::models::Real;
use crate::core::models::topology::MolecularTopology;
use crate::core::utils::geometry::SimulationBox;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Reasons an observable could not be evaluated for the current frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObservableError {
    #[error("positions are not available")]
    MissingPositions,

    #[error("velocities are not available")]
    MissingVelocities,

    #[error("topology is not available")]
    MissingTopology,

    #[error("total mass is zero")]
    ZeroTotalMass,

    #[error("topology describes {topology} atoms but {supplied} were supplied")]
    AtomCountMismatch { topology: usize, supplied: usize },

    #[error("{0}")]
    Other(String),
}

impl ObservableError {
    /// `true` for errors caused by absent inputs, after which the slot keeps its
    /// previous value.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::MissingPositions
                | Self::MissingVelocities
                | Self::MissingTopology
                | Self::AtomCountMismatch { .. }
        )
    }
}

/// The read-only state an observable is evaluated on.
///
/// Every field is borrowed from the caller for the duration of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ObservableInput<'a> {
    pub positions: Option<&'a [Point3<Real>]>,
    pub velocities: Option<&'a [Vector3<Real>]>,
    pub topology: Option<&'a MolecularTopology>,
    pub simulation_box: &'a SimulationBox,
}

impl<'a> ObservableInput<'a> {
    /// Number of atoms described by the topology, or zero without a topology.
    pub fn atom_count(&self) -> usize {
        self.topology.map_or(0, MolecularTopology::atom_count)
    }

    pub fn require_topology(&self) -> Result<&'a MolecularTopology, ObservableError> {
        self.topology.ok_or(ObservableError::MissingTopology)
    }

    /// Returns the positions, checked to cover every atom of the topology.
    pub fn require_positions(&self) -> Result<&'a [Point3<Real>], ObservableError> {
        let positions = self.positions.ok_or(ObservableError::MissingPositions)?;
        check_length(self.atom_count(), positions.len())?;
        Ok(positions)
    }

    /// Returns the velocities, checked to cover every atom of the topology.
    pub fn require_velocities(&self) -> Result<&'a [Vector3<Real>], ObservableError> {
        let velocities = self.velocities.ok_or(ObservableError::MissingVelocities)?;
        check_length(self.atom_count(), velocities.len())?;
        Ok(velocities)
    }
}

fn check_length(topology: usize, supplied: usize) -> Result<(), ObservableError> {
    if supplied < topology {
        Err(ObservableError::AtomCountMismatch { topology, supplied })
    } else {
        Ok(())
    }
}

/// A scalar derived from simulation state.
///
/// Implementations must be pure functions of their input.
pub trait Observable: Send + Sync {
    fn compute(&self, input: &ObservableInput<'_>) -> Result<f64, ObservableError>;
}

/// An [`Observable`] backed by a closure, see [`from_fn`].
pub struct FnObservable<F>(F);

impl<F> Observable for FnObservable<F>
where
    F: Fn(&ObservableInput<'_>) -> Result<f64, ObservableError> + Send + Sync,
{
    fn compute(&self, input: &ObservableInput<'_>) -> Result<f64, ObservableError> {
        (self.0)(input)
    }
}

/// Wraps a closure so ad-hoc observables can be registered without a new type.
pub fn from_fn<F>(f: F) -> FnObservable<F>
where
    F: Fn(&ObservableInput<'_>) -> Result<f64, ObservableError> + Send + Sync,
{
    FnObservable(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{MoleculeBlock, MoleculeType};

    fn two_atom_topology() -> MolecularTopology {
        MolecularTopology::new(
            vec![MoleculeType::new(
                "DI",
                vec![Atom::new("A", 1.0), Atom::new("B", 1.0)],
            )],
            vec![MoleculeBlock::new(0, 1)],
        )
        .unwrap()
    }

    #[test]
    fn require_positions_reports_absence_and_short_arrays() {
        let topology = two_atom_topology();
        let pbc = SimulationBox::none();
        let short = [Point3::new(0.0, 0.0, 0.0)];

        let absent = ObservableInput {
            positions: None,
            velocities: None,
            topology: Some(&topology),
            simulation_box: &pbc,
        };
        assert_eq!(
            absent.require_positions(),
            Err(ObservableError::MissingPositions)
        );

        let truncated = ObservableInput {
            positions: Some(&short[..]),
            ..absent
        };
        assert_eq!(
            truncated.require_positions(),
            Err(ObservableError::AtomCountMismatch {
                topology: 2,
                supplied: 1
            })
        );
    }

    #[test]
    fn closures_are_observables() {
        let pbc = SimulationBox::none();
        let input = ObservableInput {
            positions: None,
            velocities: None,
            topology: None,
            simulation_box: &pbc,
        };
        let constant = from_fn(|_| Ok(4.2));
        assert_eq!(constant.compute(&input), Ok(4.2));
        assert_eq!(input.atom_count(), 0);
        assert_eq!(
            input.require_topology().map(|t| t.atom_count()),
            Err(ObservableError::MissingTopology)
        );
    }

    #[test]
    fn missing_input_classification() {
        assert!(ObservableError::MissingPositions.is_missing_input());
        assert!(ObservableError::MissingVelocities.is_missing_input());
        assert!(!ObservableError::ZeroTotalMass.is_missing_input());
        assert!(!ObservableError::Other("x".into()).is_missing_input());
    }
}
