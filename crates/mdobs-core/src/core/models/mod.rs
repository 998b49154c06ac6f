//! # Core Models Module
//!
//! Read-only data structures describing the simulated system as seen by the output
//! pipeline.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom entries of a molecule type (name and mass)
//! - [`topology`] - Molecule types, molecule blocks and the flattened global atom order
//!
//! ## Precision
//!
//! Coordinates are stored with the [`Real`] scalar type, which is `f32` unless the
//! `double` feature is enabled. Reductions over atoms always accumulate in `f64`.
//!
//! ```ignore
//! use mdobs::core::models::{atom::Atom, topology::{MolecularTopology, MoleculeBlock, MoleculeType}};
//!
//! let water = MoleculeType::new("SOL", vec![Atom::new("OW", 15.9994), Atom::new("HW1", 1.008), Atom::new("HW2", 1.008)]);
//! let topology = MolecularTopology::new(vec![water], vec![MoleculeBlock::new(0, 216)])?;
//! assert_eq!(topology.atom_count(), 648);
//! ```

pub mod atom;
pub mod topology;

/// Storage precision of positions, velocities and box vectors.
#[cfg(not(feature = "double"))]
pub type Real = f32;

/// Storage precision of positions, velocities and box vectors.
#[cfg(feature = "double")]
pub type Real = f64;
