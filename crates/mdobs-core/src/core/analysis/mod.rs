//! # Analysis Module
//!
//! Mass-weighted, periodic-boundary-aware reductions over a molecular topology and the
//! observables built on them.
//!
//! - [`aggregate`] - Center of mass, radius of gyration, kinetic energy and the generic
//!   chunked [`aggregate::mass_weighted_sum`]
//! - [`observable`] - The [`observable::Observable`] trait and its borrowed input
//! - [`builtin`] - Observables available by name from configuration files
//!
//! Every reduction accumulates in `f64` regardless of the storage precision of the
//! coordinates.

pub mod aggregate;
pub mod builtin;
pub mod observable;
