use super::schedule::OutputSchedule;
use crate::core::analysis::builtin::BuiltinObservable;
use crate::core::observables::registry::ObservableMode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// A built-in observable requested by the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservableSpec {
    pub builtin: BuiltinObservable,
    /// Overrides [`BuiltinObservable::default_name`] in the energy file.
    pub name: Option<String>,
    pub mode: ObservableMode,
}

impl ObservableSpec {
    /// A lazily evaluated, instantaneous observable under its default name.
    pub fn new(builtin: BuiltinObservable) -> Self {
        Self {
            builtin,
            name: None,
            mode: ObservableMode::Instantaneous,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn mode(mut self, mode: ObservableMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.builtin.default_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Integration time step in ps, recorded in every frame.
    pub dt: f64,
    pub schedule: OutputSchedule,
    pub observables: Vec<ObservableSpec>,
}

#[derive(Default)]
pub struct OutputConfigBuilder {
    dt: Option<f64>,
    schedule: Option<OutputSchedule>,
    observables: Vec<ObservableSpec>,
}

impl OutputConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }
    pub fn schedule(mut self, schedule: OutputSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
    pub fn observable(mut self, spec: ObservableSpec) -> Self {
        self.observables.push(spec);
        self
    }
    pub fn observables(mut self, specs: impl IntoIterator<Item = ObservableSpec>) -> Self {
        self.observables.extend(specs);
        self
    }

    pub fn build(self) -> Result<OutputConfig, ConfigError> {
        let dt = self.dt.ok_or(ConfigError::MissingParameter("dt"))?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "dt",
                reason: format!("time step must be positive, got {dt}"),
            });
        }

        let schedule = self.schedule.unwrap_or_default();
        if !schedule.energy_interval_is_consistent() {
            return Err(ConfigError::InvalidParameter {
                parameter: "nstenergy",
                reason: format!(
                    "nstenergy ({}) must be a multiple of nstcalcenergy ({})",
                    schedule.nstenergy, schedule.nstcalcenergy
                ),
            });
        }

        Ok(OutputConfig {
            dt,
            schedule,
            observables: self.observables,
        })
    }
}
