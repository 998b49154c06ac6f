use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// How values reported for a slot are combined between two energy frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ObservableMode {
    /// The frame carries the last value written; no averaging.
    #[default]
    Instantaneous,
    /// The frame carries the average of every sample summed since the previous frame.
    SummedAveraged,
}

impl fmt::Display for ObservableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instantaneous => "instantaneous",
            Self::SummedAveraged => "summed-averaged",
        })
    }
}

/// Stable handle of a registered observable, valid for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinIndex(usize);

impl BinIndex {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for BinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableDescriptor {
    pub name: String,
    pub unit: String,
    pub index: BinIndex,
    pub mode: ObservableMode,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("An observable named '{0}' is already registered")]
    DuplicateName(String),
    #[error("Cannot register observable '{0}' after the first frame has been written")]
    LateRegistration(String),
}

/// The table of observable descriptors.
///
/// Registration is only allowed until the registry is frozen, which the output does
/// when it writes its first frame. Afterwards the set of slots, and therefore the
/// layout of every frame, is fixed.
#[derive(Debug, Clone, Default)]
pub struct ObservableRegistry {
    descriptors: Vec<ObservableDescriptor>,
    by_name: HashMap<String, BinIndex>,
    frozen: bool,
}

impl ObservableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new observable and returns its handle.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::DuplicateName`] if `name` is already taken.
    /// * [`RegistryError::LateRegistration`] if the registry has been frozen.
    pub fn register(
        &mut self,
        name: &str,
        unit: &str,
        mode: ObservableMode,
    ) -> Result<BinIndex, RegistryError> {
        if self.frozen {
            return Err(RegistryError::LateRegistration(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        let index = BinIndex(self.descriptors.len());
        self.descriptors.push(ObservableDescriptor {
            name: name.to_string(),
            unit: unit.to_string(),
            index,
            mode,
        });
        self.by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Resolves a name to its handle. Intended for setup code only.
    pub fn lookup(&self, name: &str) -> Option<BinIndex> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn descriptor(&self, index: BinIndex) -> &ObservableDescriptor {
        &self.descriptors[index.0]
    }

    #[inline]
    pub fn mode(&self, index: BinIndex) -> ObservableMode {
        self.descriptors[index.0].mode
    }

    pub fn descriptors(&self) -> &[ObservableDescriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
