//! # Core Module
//!
//! Stateless building blocks of the output pipeline.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, molecule types, molecule blocks and
//!   the flattened global atom order
//! - **Geometry** ([`utils`]) - The periodic simulation box and minimum-image displacements
//! - **Aggregation** ([`analysis`]) - Mass-weighted reductions and the observables built on them
//! - **Observable Table** ([`observables`]) - Setup-time registration of named, unit-tagged slots
//!
//! Nothing in this module keeps state between simulation steps; the accumulation of
//! values between frames lives in [`crate::engine`].

pub mod analysis;
pub mod models;
pub mod observables;
pub mod utils;
