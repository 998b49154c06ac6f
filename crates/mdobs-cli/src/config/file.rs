use mdobs::core::observables::registry::ObservableMode;
use serde::Deserialize;

/// The TOML run file, as written by the user.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunFile {
    pub output: FileOutput,
    #[serde(default)]
    pub observables: Vec<FileObservable>,
    #[serde(rename = "box", default)]
    pub simulation_box: FileBox,
    pub topology: Option<FileTopology>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutput {
    pub dt: Option<f64>,
    pub nstenergy: Option<u64>,
    pub nstcalcenergy: Option<u64>,
    pub nstlog: Option<u64>,
    pub nstdisreout: Option<u64>,
    pub nstorireout: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileObservable {
    pub kind: String,
    pub name: Option<String>,
    pub mode: Option<ObservableMode>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type", deny_unknown_fields)]
pub enum FileBox {
    #[default]
    None,
    Rectangular {
        lengths: [f64; 3],
    },
    Triclinic {
        vectors: [[f64; 3]; 3],
    },
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileTopology {
    pub molecule_types: Vec<FileMoleculeType>,
    pub molecules: Vec<FileMoleculeBlock>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileMoleculeType {
    pub name: String,
    pub atoms: Vec<FileAtom>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileAtom {
    pub name: String,
    pub mass: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileMoleculeBlock {
    #[serde(rename = "type")]
    pub molecule_type: String,
    pub count: usize,
}
