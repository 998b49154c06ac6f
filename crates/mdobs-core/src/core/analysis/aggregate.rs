use super::observable::ObservableError;
use crate::core::models::Real;
use crate::core::models::topology::MolecularTopology;
use crate::core::utils::geometry::SimulationBox;
use nalgebra::{Point3, Vector3};
use std::ops::Add;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of consecutive atoms summed sequentially before partial sums are combined.
///
/// Chunk boundaries do not depend on the thread count, so the sequential and the
/// parallel builds produce bit-identical results.
pub const REDUCTION_CHUNK_ATOMS: usize = 4096;

/// Sums `term(global_index, mass)` over every atom of the topology.
///
/// Partial sums over fixed chunks of [`REDUCTION_CHUNK_ATOMS`] atoms are combined in
/// index order. With the `parallel` feature the chunks are evaluated on the rayon pool.
pub fn mass_weighted_sum<T, F>(topology: &MolecularTopology, zero: T, term: F) -> T
where
    T: Copy + Add<Output = T> + Send + Sync,
    F: Fn(usize, f64) -> T + Send + Sync,
{
    let chunk_count = topology.atom_count().div_ceil(REDUCTION_CHUNK_ATOMS);
    let term = &term;
    let chunk_sum = move |chunk: usize| {
        let start = chunk * REDUCTION_CHUNK_ATOMS;
        let mut acc = zero;
        topology.for_each_atom_in(start..start + REDUCTION_CHUNK_ATOMS, |i, mass| {
            acc = acc + term(i, mass);
        });
        acc
    };

    #[cfg(not(feature = "parallel"))]
    let partials: Vec<T> = (0..chunk_count).map(chunk_sum).collect();

    #[cfg(feature = "parallel")]
    let partials: Vec<T> = (0..chunk_count).into_par_iter().map(chunk_sum).collect();

    partials.into_iter().fold(zero, |acc, partial| acc + partial)
}

#[derive(Debug, Clone, Copy)]
struct MassMoment {
    weighted: Vector3<f64>,
    mass: f64,
}

impl Add for MassMoment {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            weighted: self.weighted + rhs.weighted,
            mass: self.mass + rhs.mass,
        }
    }
}

/// Center of mass of a system together with the mass it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOfMass {
    pub position: Point3<f64>,
    pub total_mass: f64,
}

/// Computes the mass-weighted center of mass from raw (unwrapped) positions.
///
/// # Errors
///
/// Returns [`ObservableError::ZeroTotalMass`] for empty or massless topologies and
/// [`ObservableError::AtomCountMismatch`] if `positions` is shorter than the topology.
pub fn try_center_of_mass(
    positions: &[Point3<Real>],
    topology: &MolecularTopology,
) -> Result<CenterOfMass, ObservableError> {
    check_coverage(positions.len(), topology)?;
    let zero = MassMoment {
        weighted: Vector3::zeros(),
        mass: 0.0,
    };
    let moment = mass_weighted_sum(topology, zero, |i, mass| MassMoment {
        weighted: positions[i].coords.cast::<f64>() * mass,
        mass,
    });
    if moment.mass <= 0.0 {
        return Err(ObservableError::ZeroTotalMass);
    }
    Ok(CenterOfMass {
        position: Point3::from(moment.weighted / moment.mass),
        total_mass: moment.mass,
    })
}

/// Computes the radius of gyration about the center of mass.
///
/// Displacements from the center of mass use the minimum image under `simulation_box`,
/// so atoms that wrapped across a boundary contribute their nearest image.
pub fn try_radius_of_gyration(
    positions: &[Point3<Real>],
    topology: &MolecularTopology,
    simulation_box: &SimulationBox,
) -> Result<f64, ObservableError> {
    let com = try_center_of_mass(positions, topology)?;
    let second_moment = mass_weighted_sum(topology, 0.0, |i, mass| {
        let dx = simulation_box.pbc_dx(&positions[i].cast::<f64>(), &com.position);
        mass * dx.norm_squared()
    });
    Ok((second_moment / com.total_mass).sqrt())
}

/// Computes the kinetic energy `0.5 * sum(m |v|^2)` in kJ/mol for velocities in nm/ps.
pub fn try_kinetic_energy(
    velocities: &[Vector3<Real>],
    topology: &MolecularTopology,
) -> Result<f64, ObservableError> {
    check_coverage(velocities.len(), topology)?;
    let twice_ke = mass_weighted_sum(topology, 0.0, |i, mass| {
        mass * velocities[i].cast::<f64>().norm_squared()
    });
    Ok(0.5 * twice_ke)
}

/// Center of mass, or the origin when positions or topology are absent or the total
/// mass is zero.
pub fn center_of_mass(
    positions: Option<&[Point3<Real>]>,
    topology: Option<&MolecularTopology>,
) -> Point3<f64> {
    match (positions, topology) {
        (Some(positions), Some(topology)) => try_center_of_mass(positions, topology)
            .map(|com| com.position)
            .unwrap_or_else(|_| Point3::origin()),
        _ => Point3::origin(),
    }
}

/// Radius of gyration, or zero when positions or topology are absent or the total mass
/// is zero.
pub fn radius_of_gyration(
    positions: Option<&[Point3<Real>]>,
    topology: Option<&MolecularTopology>,
    simulation_box: &SimulationBox,
) -> f64 {
    match (positions, topology) {
        (Some(positions), Some(topology)) => {
            try_radius_of_gyration(positions, topology, simulation_box).unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

fn check_coverage(supplied: usize, topology: &MolecularTopology) -> Result<(), ObservableError> {
    let expected = topology.atom_count();
    if supplied < expected {
        return Err(ObservableError::AtomCountMismatch {
            topology: expected,
            supplied,
        });
    }
    Ok(())
}
