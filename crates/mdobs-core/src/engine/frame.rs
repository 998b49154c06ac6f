use std::fmt;

/// Which parts of the output are due on a step.
///
/// The flags are independent. Any of them set causes a frame to be written, but only
/// `energy` triggers lazy observables and the reset of the summed accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteFlags {
    pub energy: bool,
    pub distance_restraints: bool,
    pub orientation_restraints: bool,
}

impl WriteFlags {
    pub const NONE: Self = Self {
        energy: false,
        distance_restraints: false,
        orientation_restraints: false,
    };

    pub const ENERGY: Self = Self {
        energy: true,
        distance_restraints: false,
        orientation_restraints: false,
    };

    #[inline]
    pub fn any(&self) -> bool {
        self.energy || self.distance_restraints || self.orientation_restraints
    }
}

/// Kind of an auxiliary block appended to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
    OrientationRestraints,
    OrientationRestraintTensors,
    OrientationRestraintEigenvalues,
    DistanceRestraints,
    FreeEnergyHistogram,
    FreeEnergyDeltaH,
    FreeEnergyCollection,
    AdaptiveBias,
    Custom(i32),
}

impl BlockId {
    /// Numeric block type as used by energy-file readers.
    pub fn code(&self) -> i32 {
        match self {
            Self::OrientationRestraints => 0,
            Self::OrientationRestraintTensors => 1,
            Self::OrientationRestraintEigenvalues => 2,
            Self::DistanceRestraints => 3,
            Self::FreeEnergyHistogram => 4,
            Self::FreeEnergyDeltaH => 5,
            Self::FreeEnergyCollection => 6,
            Self::AdaptiveBias => 7,
            Self::Custom(code) => *code,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrientationRestraints => f.write_str("orientation-restraints"),
            Self::OrientationRestraintTensors => f.write_str("orientation-restraint-tensors"),
            Self::OrientationRestraintEigenvalues => {
                f.write_str("orientation-restraint-eigenvalues")
            }
            Self::DistanceRestraints => f.write_str("distance-restraints"),
            Self::FreeEnergyHistogram => f.write_str("free-energy-histogram"),
            Self::FreeEnergyDeltaH => f.write_str("free-energy-delta-h"),
            Self::FreeEnergyCollection => f.write_str("free-energy-collection"),
            Self::AdaptiveBias => f.write_str("adaptive-bias"),
            Self::Custom(code) => write!(f, "custom-{code}"),
        }
    }
}

/// A typed payload array inside a block. The output never interprets the contents.
#[derive(Debug, Clone, PartialEq)]
pub enum SubBlock {
    Float(Vec<f32>),
    Double(Vec<f64>),
    Int(Vec<i32>),
    Int64(Vec<i64>),
    Char(Vec<u8>),
}

impl SubBlock {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Char(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBlock {
    pub id: BlockId,
    pub sub_blocks: Vec<SubBlock>,
}

impl FrameBlock {
    pub fn new(id: BlockId, sub_blocks: Vec<SubBlock>) -> Self {
        Self { id, sub_blocks }
    }
}

/// One record of the energy file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnergyFrame {
    pub time: f64,
    pub step: i64,
    pub dt: f64,
    /// Steps since the previous energy frame.
    pub nsteps: u64,
    /// Summed steps since the previous energy frame.
    pub nsum: u64,
    /// One value per registered observable, or empty when the energy block is omitted.
    pub energies: Vec<f64>,
    pub blocks: Vec<FrameBlock>,
}

impl EnergyFrame {
    #[inline]
    pub fn has_energies(&self) -> bool {
        !self.energies.is_empty()
    }

    pub fn add_block(&mut self, block: FrameBlock) {
        self.blocks.push(block);
    }

    pub fn block(&self, id: BlockId) -> Option<&FrameBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
