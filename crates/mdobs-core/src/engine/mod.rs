//! # Engine Module
//!
//! The stateful half of the library: everything that owns data across simulation
//! steps and turns it into energy frames.
//!
//! ## Architecture
//!
//! - **Output** ([`output`]) - [`EnergyOutput`](output::EnergyOutput), the frame
//!   assembler owning the registry, the bin and the bound observables
//! - **Accumulation** ([`bin`]) - Per-slot running sums and instantaneous values
//! - **Lazy Evaluation** ([`calculator`]) - Compute functions gated on the energy flag
//! - **Scheduling** ([`schedule`]) - Step intervals deciding which output is due
//! - **Frames and Sinks** ([`frame`], [`sink`], [`blocks`]) - The written record, its
//!   serialization and the collaborators that append opaque blocks
//! - **Per-Step Input** ([`state`]) - The borrowed simulation state of one call
//! - **Configuration** ([`config`]), **Errors** ([`error`]) and **Progress**
//!   ([`progress`])
//!
//! Per write step the data flows calculator, bin, assembler, sink and back to the bin
//! for the reset. A single thread owns an [`EnergyOutput`](output::EnergyOutput);
//! only the atom reductions inside observables run in parallel.

pub mod bin;
pub mod blocks;
pub mod calculator;
pub mod config;
pub mod error;
pub mod frame;
pub mod output;
pub mod progress;
pub mod schedule;
pub mod sink;
pub mod state;
