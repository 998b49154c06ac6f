//! # mdobs
//!
//! Lazy energy-frame output for particle simulations: a registry of named scalar
//! observables, topology-aware mass-weighted reductions under periodic boundary
//! conditions, and a step-gated output pipeline that computes expensive observables
//! only on the steps where an energy frame is actually written.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularTopology`,
//!   `SimulationBox`), the observable trait with its built-in implementations, the
//!   deterministic aggregation kernels, and the observable registry.
//!
//! - **[`engine`]: The Output Pipeline.** The stateful layer. `EnergyOutput` owns the
//!   accumulation bin and the bound observables, assembles `EnergyFrame`s and commits
//!   them to a `FrameSink`, following an `OutputSchedule`.
//!
//! - **[`workflows`]: The Public API.** Drivers tying `engine` and `core` together,
//!   such as replaying a recorded trajectory through the output pipeline.
//!
//! ## Features
//!
//! - `parallel` (default): atom reductions run on rayon in fixed-size chunks, with
//!   results identical to the sequential path.
//! - `double`: stores coordinates as `f64` instead of `f32`.

pub mod core;
pub mod engine;
pub mod workflows;
