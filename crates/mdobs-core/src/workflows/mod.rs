//! # Workflows Module
//!
//! High-level drivers that run the output pipeline end to end.
//!
//! - **Replay Workflow** ([`replay`]) - Feeds a recorded trajectory through an
//!   [`EnergyOutput`](crate::engine::output::EnergyOutput) under an output schedule,
//!   producing the energy frames a live run would have written.

pub mod replay;
