mod file;

use crate::cli::ReplayArgs;
use crate::error::{CliError, Result};
use file::{FileBox, FileTopology, RunFile};
use mdobs::core::analysis::builtin::BuiltinObservable;
use mdobs::core::models::atom::Atom;
use mdobs::core::models::topology::{MolecularTopology, MoleculeBlock, MoleculeType};
use mdobs::core::utils::geometry::SimulationBox;
use mdobs::engine::config::{ObservableSpec, OutputConfig, OutputConfigBuilder};
use mdobs::engine::schedule::OutputSchedule;
use std::path::Path;
use tracing::debug;

/// Everything a replay needs besides the trajectory itself.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output: OutputConfig,
    pub simulation_box: SimulationBox,
    pub topology: Option<MolecularTopology>,
}

/// Interval overrides given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalOverrides {
    pub nstenergy: Option<u64>,
    pub nstcalcenergy: Option<u64>,
}

impl From<&ReplayArgs> for IntervalOverrides {
    fn from(args: &ReplayArgs) -> Self {
        Self {
            nstenergy: args.nstenergy,
            nstcalcenergy: args.nstcalcenergy,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path, overrides: IntervalOverrides) -> Result<Self> {
        debug!("Reading run file from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let file: RunFile = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_run_file(file, overrides)
    }

    fn from_run_file(file: RunFile, overrides: IntervalOverrides) -> Result<Self> {
        let defaults = OutputSchedule::default();
        let schedule = OutputSchedule {
            nstenergy: overrides
                .nstenergy
                .or(file.output.nstenergy)
                .unwrap_or(defaults.nstenergy),
            nstcalcenergy: overrides
                .nstcalcenergy
                .or(file.output.nstcalcenergy)
                .unwrap_or(defaults.nstcalcenergy),
            nstlog: file.output.nstlog.unwrap_or(defaults.nstlog),
            nstdisreout: file.output.nstdisreout.unwrap_or(0),
            nstorireout: file.output.nstorireout.unwrap_or(0),
        };

        let mut builder = OutputConfigBuilder::new().schedule(schedule);
        if let Some(dt) = file.output.dt {
            builder = builder.dt(dt);
        }
        for observable in &file.observables {
            let builtin = BuiltinObservable::from_key(&observable.kind).ok_or_else(|| {
                CliError::Config(format!(
                    "Unknown observable '{}'. Run `mdobs observables` for the list of built-ins.",
                    observable.kind
                ))
            })?;
            let mut spec = ObservableSpec::new(builtin);
            if let Some(name) = &observable.name {
                spec = spec.named(name);
            }
            if let Some(mode) = observable.mode {
                spec = spec.mode(mode);
            }
            builder = builder.observable(spec);
        }
        let output = builder.build()?;

        let simulation_box = match file.simulation_box {
            FileBox::None => SimulationBox::none(),
            FileBox::Rectangular { lengths: [x, y, z] } => SimulationBox::rectangular(x, y, z)
                .map_err(|e| CliError::Config(format!("Invalid box: {e}")))?,
            FileBox::Triclinic { vectors } => SimulationBox::from_rows(vectors)
                .map_err(|e| CliError::Config(format!("Invalid box: {e}")))?,
        };

        let topology = file.topology.map(build_topology).transpose()?;

        Ok(Self {
            output,
            simulation_box,
            topology,
        })
    }
}

fn build_topology(file: FileTopology) -> Result<MolecularTopology> {
    let molecule_types: Vec<MoleculeType> = file
        .molecule_types
        .iter()
        .map(|t| {
            let atoms = t.atoms.iter().map(|a| Atom::new(&a.name, a.mass)).collect();
            MoleculeType::new(&t.name, atoms)
        })
        .collect();

    let mut blocks = Vec::with_capacity(file.molecules.len());
    for block in &file.molecules {
        let index = molecule_types
            .iter()
            .position(|t| t.name == block.molecule_type)
            .ok_or_else(|| {
                CliError::Config(format!(
                    "Molecule block references unknown molecule type '{}'",
                    block.molecule_type
                ))
            })?;
        blocks.push(MoleculeBlock::new(index, block.count));
    }

    MolecularTopology::new(molecule_types, blocks)
        .map_err(|e| CliError::Config(format!("Invalid topology: {e}")))
}
