use super::frame::{BlockId, EnergyFrame, FrameBlock, SubBlock};

/// Restraint data lent for one write call.
pub trait RestraintData {
    /// Block carrying the distance restraint violations, if any restraints exist.
    fn distance_restraint_block(&self) -> Option<FrameBlock>;

    /// Blocks carrying the orientation restraints and their tensors.
    fn orientation_restraint_blocks(&self) -> Vec<FrameBlock>;
}

/// A collaborator that appends opaque blocks to every written frame and collects
/// data between frames, such as a free-energy difference collection.
pub trait FrameBlockSource: Send {
    fn append_blocks(&mut self, frame: &mut EnergyFrame);

    /// Discards collected data. Called only after the frame has been committed.
    fn reset(&mut self);
}

/// The adaptive-bias collaborator.
pub trait BiasWriter {
    /// Appends the bias state at `step` to a frame whose energy block is already
    /// populated.
    fn write_to_energy_frame(&self, step: i64, frame: &mut EnergyFrame);
}

/// Precomputed restraint blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestraintBlocks {
    pub distance: Option<FrameBlock>,
    pub orientation: Vec<FrameBlock>,
}

impl RestraintData for RestraintBlocks {
    fn distance_restraint_block(&self) -> Option<FrameBlock> {
        self.distance.clone()
    }

    fn orientation_restraint_blocks(&self) -> Vec<FrameBlock> {
        self.orientation.clone()
    }
}

/// Collects one energy-difference sample per summation step and emits them as a
/// [`BlockId::FreeEnergyDeltaH`] block.
#[derive(Debug, Clone, Default)]
pub struct DeltaHCollection {
    samples: Vec<f64>,
}

impl DeltaHCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta_h: f64) {
        self.samples.push(delta_h);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FrameBlockSource for DeltaHCollection {
    fn append_blocks(&mut self, frame: &mut EnergyFrame) {
        if self.samples.is_empty() {
            return;
        }
        frame.add_block(FrameBlock::new(
            BlockId::FreeEnergyDeltaH,
            vec![SubBlock::Double(self.samples.clone())],
        ));
    }

    fn reset(&mut self) {
        self.samples.clear();
    }
}
