//! # Observables Module
//!
//! The setup-time table of named scalar slots written to every energy frame.
//!
//! Names are resolved to [`registry::BinIndex`] handles once, while the output is
//! being configured; everything that runs per step addresses slots by handle only.
//!
//! ```ignore
//! use mdobs::core::observables::registry::{ObservableMode, ObservableRegistry};
//!
//! let mut registry = ObservableRegistry::new();
//! let potential = registry.register("Potential", "kJ/mol", ObservableMode::SummedAveraged)?;
//! let rg = registry.register("Radius-Gyration", "nm", ObservableMode::Instantaneous)?;
//! ```

pub mod registry;
