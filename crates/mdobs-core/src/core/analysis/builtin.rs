use super::aggregate;
use super::observable::{Observable, ObservableError, ObservableInput};
use phf::{Map, phf_map};
use std::fmt;

/// Cartesian axis of a vector-valued observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Observables shipped with the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinObservable {
    RadiusOfGyration,
    KineticEnergy,
    CenterOfMass(Axis),
    BoxVolume,
}

#[rustfmt::skip]
static BUILTIN_OBSERVABLES: Map<&'static str, BuiltinObservable> = phf_map! {
    "radius-of-gyration" => BuiltinObservable::RadiusOfGyration,
    "rg"                 => BuiltinObservable::RadiusOfGyration,
    "kinetic-energy"     => BuiltinObservable::KineticEnergy,
    "com-x"              => BuiltinObservable::CenterOfMass(Axis::X),
    "com-y"              => BuiltinObservable::CenterOfMass(Axis::Y),
    "com-z"              => BuiltinObservable::CenterOfMass(Axis::Z),
    "box-volume"         => BuiltinObservable::BoxVolume,
    "volume"             => BuiltinObservable::BoxVolume,
};

impl BuiltinObservable {
    /// Every built-in observable, once.
    pub const ALL: [BuiltinObservable; 6] = [
        Self::RadiusOfGyration,
        Self::KineticEnergy,
        Self::CenterOfMass(Axis::X),
        Self::CenterOfMass(Axis::Y),
        Self::CenterOfMass(Axis::Z),
        Self::BoxVolume,
    ];

    /// Looks up a built-in observable by its configuration key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        BUILTIN_OBSERVABLES
            .get(key.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// The canonical configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RadiusOfGyration => "radius-of-gyration",
            Self::KineticEnergy => "kinetic-energy",
            Self::CenterOfMass(Axis::X) => "com-x",
            Self::CenterOfMass(Axis::Y) => "com-y",
            Self::CenterOfMass(Axis::Z) => "com-z",
            Self::BoxVolume => "box-volume",
        }
    }

    /// The name the observable is registered under in the energy file.
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::RadiusOfGyration => "Radius-Gyration",
            Self::KineticEnergy => "Kinetic-Obs",
            Self::CenterOfMass(Axis::X) => "COM-X",
            Self::CenterOfMass(Axis::Y) => "COM-Y",
            Self::CenterOfMass(Axis::Z) => "COM-Z",
            Self::BoxVolume => "Volume",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::RadiusOfGyration | Self::CenterOfMass(_) => "nm",
            Self::KineticEnergy => "kJ/mol",
            Self::BoxVolume => "nm^3",
        }
    }

    /// Short human-readable summary used by the CLI listing.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RadiusOfGyration => {
                "mass-weighted RMS distance from the center of mass (positions, topology)"
            }
            Self::KineticEnergy => "0.5 * sum(m v^2) over all atoms (velocities, topology)",
            Self::CenterOfMass(_) => "center of mass coordinate (positions, topology)",
            Self::BoxVolume => "volume of the periodic cell (box only)",
        }
    }
}

impl fmt::Display for BuiltinObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Observable for BuiltinObservable {
    fn compute(&self, input: &ObservableInput<'_>) -> Result<f64, ObservableError> {
        match *self {
            Self::RadiusOfGyration => {
                let topology = input.require_topology()?;
                let positions = input.require_positions()?;
                aggregate::try_radius_of_gyration(positions, topology, input.simulation_box)
            }
            Self::KineticEnergy => {
                let topology = input.require_topology()?;
                let velocities = input.require_velocities()?;
                aggregate::try_kinetic_energy(velocities, topology)
            }
            Self::CenterOfMass(axis) => {
                let topology = input.require_topology()?;
                let positions = input.require_positions()?;
                aggregate::try_center_of_mass(positions, topology).map(|com| com.position[axis.index()])
            }
            Self::BoxVolume => Ok(input.simulation_box.volume()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Real;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{MolecularTopology, MoleculeBlock, MoleculeType};
    use crate::core::utils::geometry::SimulationBox;
    use nalgebra::{Point3, Vector3};

    fn dimer() -> MolecularTopology {
        MolecularTopology::new(
            vec![MoleculeType::new(
                "DI",
                vec![Atom::new("A", 1.0), Atom::new("B", 3.0)],
            )],
            vec![MoleculeBlock::new(0, 1)],
        )
        .unwrap()
    }

    #[test]
    fn keys_round_trip_through_lookup() {
        for builtin in BuiltinObservable::ALL {
            assert_eq!(BuiltinObservable::from_key(builtin.key()), Some(builtin));
        }
        assert_eq!(
            BuiltinObservable::from_key("  RG "),
            Some(BuiltinObservable::RadiusOfGyration)
        );
        assert_eq!(BuiltinObservable::from_key("pressure"), None);
    }

    #[test]
    fn builtins_compute_from_input() {
        let topology = dimer();
        let pbc = SimulationBox::rectangular(10.0, 10.0, 10.0).unwrap();
        let positions: [Point3<Real>; 2] = [Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0)];
        let velocities: [Vector3<Real>; 2] = [Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)];
        let input = ObservableInput {
            positions: Some(&positions),
            velocities: Some(&velocities),
            topology: Some(&topology),
            simulation_box: &pbc,
        };

        let com_x = BuiltinObservable::CenterOfMass(Axis::X).compute(&input).unwrap();
        assert!((com_x - 3.0).abs() < 1e-9);
        let ke = BuiltinObservable::KineticEnergy.compute(&input).unwrap();
        assert!((ke - 2.0).abs() < 1e-9);
        let volume = BuiltinObservable::BoxVolume.compute(&input).unwrap();
        assert!((volume - 1000.0).abs() < 1e-9);
        // Offsets from the COM at x = 3 are -3 (mass 1) and 1 (mass 3).
        let rg = BuiltinObservable::RadiusOfGyration.compute(&input).unwrap();
        assert!((rg - ((9.0 + 3.0) / 4.0_f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn builtins_report_missing_inputs() {
        let topology = dimer();
        let pbc = SimulationBox::none();
        let input = ObservableInput {
            positions: None,
            velocities: None,
            topology: Some(&topology),
            simulation_box: &pbc,
        };
        assert_eq!(
            BuiltinObservable::RadiusOfGyration.compute(&input),
            Err(ObservableError::MissingPositions)
        );
        assert_eq!(
            BuiltinObservable::KineticEnergy.compute(&input),
            Err(ObservableError::MissingVelocities)
        );
        assert_eq!(BuiltinObservable::BoxVolume.compute(&input), Ok(0.0));

        let no_topology = ObservableInput {
            topology: None,
            ..input
        };
        assert_eq!(
            BuiltinObservable::CenterOfMass(Axis::Y).compute(&no_topology),
            Err(ObservableError::MissingTopology)
        );
    }

    #[test]
    fn center_of_mass_covers_every_axis() {
        let topology = dimer();
        let pbc = SimulationBox::none();
        let positions: [Point3<Real>; 2] = [Point3::new(0.0, 4.0, -2.0), Point3::new(4.0, 0.0, 2.0)];
        let input = ObservableInput {
            positions: Some(&positions),
            velocities: None,
            topology: Some(&topology),
            simulation_box: &pbc,
        };

        let com: Vec<f64> = [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .map(|axis| BuiltinObservable::CenterOfMass(axis).compute(&input).unwrap())
            .collect();
        assert!((com[0] - 3.0).abs() < 1e-9);
        assert!((com[1] - 1.0).abs() < 1e-9);
        assert!((com[2] - 1.0).abs() < 1e-9);
    }
}
