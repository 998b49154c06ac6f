use super::atom::Atom;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Molecule block {block} references unknown molecule type index {molecule_type}")]
    UnknownMoleculeType { block: usize, molecule_type: usize },
    #[error("Molecule type '{0}' is not defined")]
    UnknownMoleculeTypeName(String),
}

/// A molecule type: an ordered list of atoms shared by every copy of the molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeType {
    pub name: String,
    pub atoms: Vec<Atom>,
}

impl MoleculeType {
    pub fn new(name: &str, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.to_string(),
            atoms,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn mass(&self) -> f64 {
        self.atoms.iter().map(|a| a.mass).sum()
    }
}

/// A block of `count` identical, consecutive copies of one molecule type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoleculeBlock {
    /// Index into [`MolecularTopology::molecule_types`].
    pub molecule_type: usize,
    /// Number of molecules in the block.
    pub count: usize,
}

impl MoleculeBlock {
    pub fn new(molecule_type: usize, count: usize) -> Self {
        Self {
            molecule_type,
            count,
        }
    }
}

/// The contiguous range of global atom indices covered by one molecule block.
#[derive(Debug, Clone)]
pub struct BlockSpan<'a> {
    pub atoms: Range<usize>,
    pub molecule_type: &'a MoleculeType,
}

/// A read-only molecular topology.
///
/// The global atom index is the flattening of `(block, copy, atom)` in that nested
/// order. Position and velocity arrays handed to the output pipeline must follow the
/// same ordering; nothing at this layer can verify it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolecularTopology {
    molecule_types: Vec<MoleculeType>,
    blocks: Vec<MoleculeBlock>,
    /// First global atom index of each block, plus a trailing entry equal to the atom count.
    block_starts: Vec<usize>,
}

impl MolecularTopology {
    /// Builds a topology from molecule types and the blocks that replicate them.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownMoleculeType`] if a block references a molecule
    /// type index that does not exist.
    pub fn new(
        molecule_types: Vec<MoleculeType>,
        blocks: Vec<MoleculeBlock>,
    ) -> Result<Self, TopologyError> {
        let mut block_starts = Vec::with_capacity(blocks.len() + 1);
        let mut next_atom = 0;
        for (block_idx, block) in blocks.iter().enumerate() {
            let molecule_type = molecule_types.get(block.molecule_type).ok_or(
                TopologyError::UnknownMoleculeType {
                    block: block_idx,
                    molecule_type: block.molecule_type,
                },
            )?;
            block_starts.push(next_atom);
            next_atom += block.count * molecule_type.atom_count();
        }
        block_starts.push(next_atom);

        Ok(Self {
            molecule_types,
            blocks,
            block_starts,
        })
    }

    /// Finds a molecule type by name and returns its index.
    pub fn molecule_type_index(&self, name: &str) -> Result<usize, TopologyError> {
        self.molecule_types
            .iter()
            .position(|mt| mt.name == name)
            .ok_or_else(|| TopologyError::UnknownMoleculeTypeName(name.to_string()))
    }

    pub fn molecule_types(&self) -> &[MoleculeType] {
        &self.molecule_types
    }

    pub fn blocks(&self) -> &[MoleculeBlock] {
        &self.blocks
    }

    /// Total number of atoms in the flattened topology.
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.block_starts.last().copied().unwrap_or(0)
    }

    pub fn molecule_count(&self) -> usize {
        self.blocks.iter().map(|b| b.count).sum()
    }

    pub fn total_mass(&self) -> f64 {
        self.blocks
            .iter()
            .map(|b| b.count as f64 * self.molecule_types[b.molecule_type].mass())
            .sum()
    }

    /// Returns an iterator over the global atom ranges of all blocks.
    pub fn block_spans(&self) -> impl Iterator<Item = BlockSpan<'_>> {
        self.blocks.iter().enumerate().map(|(i, block)| BlockSpan {
            atoms: self.block_starts[i]..self.block_starts[i + 1],
            molecule_type: &self.molecule_types[block.molecule_type],
        })
    }

    /// Returns an iterator over atom masses in global atom order.
    pub fn masses(&self) -> impl Iterator<Item = f64> + '_ {
        self.blocks.iter().flat_map(move |block| {
            let atoms = &self.molecule_types[block.molecule_type].atoms;
            (0..block.count).flat_map(move |_| atoms.iter().map(|a| a.mass))
        })
    }

    /// Calls `f(global_index, mass)` for every atom whose global index lies in `range`,
    /// in increasing index order.
    ///
    /// Only the blocks overlapping `range` are visited, so a chunk of a large system
    /// can be walked without iterating the atoms before it.
    pub fn for_each_atom_in(&self, range: Range<usize>, mut f: impl FnMut(usize, f64)) {
        let end = range.end.min(self.atom_count());
        if range.start >= end {
            return;
        }
        let first_block = self
            .block_starts
            .partition_point(|&start| start <= range.start)
            .saturating_sub(1);

        for (span_idx, block) in self.blocks.iter().enumerate().skip(first_block) {
            let block_start = self.block_starts[span_idx];
            let block_end = self.block_starts[span_idx + 1];
            if block_start >= end {
                break;
            }
            let atoms = &self.molecule_types[block.molecule_type].atoms;
            if atoms.is_empty() {
                continue;
            }
            let lo = range.start.max(block_start);
            let hi = end.min(block_end);
            for global in lo..hi {
                f(global, atoms[(global - block_start) % atoms.len()].mass);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> MoleculeType {
        MoleculeType::new(
            "SOL",
            vec![
                Atom::new("OW", 15.9994),
                Atom::new("HW1", 1.008),
                Atom::new("HW2", 1.008),
            ],
        )
    }

    fn ion() -> MoleculeType {
        MoleculeType::new("NA", vec![Atom::new("NA", 22.99)])
    }

    fn mixed_topology() -> MolecularTopology {
        MolecularTopology::new(
            vec![water(), ion()],
            vec![
                MoleculeBlock::new(0, 2),
                MoleculeBlock::new(1, 3),
                MoleculeBlock::new(0, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn atom_count_flattens_blocks_copies_and_atoms() {
        let topology = mixed_topology();
        assert_eq!(topology.atom_count(), 2 * 3 + 3 + 3);
        assert_eq!(topology.molecule_count(), 6);
    }

    #[test]
    fn masses_follow_global_atom_order() {
        let topology = mixed_topology();
        let masses: Vec<f64> = topology.masses().collect();
        assert_eq!(masses.len(), 12);
        assert_eq!(masses[0], 15.9994);
        assert_eq!(masses[3], 15.9994);
        assert_eq!(masses[6], 22.99);
        assert_eq!(masses[8], 22.99);
        assert_eq!(masses[9], 15.9994);
        assert_eq!(masses[11], 1.008);
    }

    #[test]
    fn total_mass_matches_sum_of_masses() {
        let topology = mixed_topology();
        let expected: f64 = topology.masses().sum();
        assert!((topology.total_mass() - expected).abs() < 1e-12);
    }

    #[test]
    fn for_each_atom_in_matches_masses_for_arbitrary_ranges() {
        let topology = mixed_topology();
        let masses: Vec<f64> = topology.masses().collect();
        for start in 0..masses.len() {
            for end in start..=masses.len() + 2 {
                let mut visited = Vec::new();
                topology.for_each_atom_in(start..end, |i, m| visited.push((i, m)));
                let expected: Vec<(usize, f64)> = (start..end.min(masses.len()))
                    .map(|i| (i, masses[i]))
                    .collect();
                assert_eq!(visited, expected, "range {start}..{end}");
            }
        }
    }

    #[test]
    fn block_spans_cover_contiguous_ranges() {
        let topology = mixed_topology();
        let spans: Vec<_> = topology.block_spans().map(|s| s.atoms).collect();
        assert_eq!(spans, vec![0..6, 6..9, 9..12]);
    }

    #[test]
    fn unknown_molecule_type_is_rejected() {
        let result = MolecularTopology::new(vec![water()], vec![MoleculeBlock::new(1, 4)]);
        assert_eq!(
            result,
            Err(TopologyError::UnknownMoleculeType {
                block: 0,
                molecule_type: 1
            })
        );
    }

    #[test]
    fn empty_topology_has_no_atoms() {
        let topology = MolecularTopology::default();
        assert_eq!(topology.atom_count(), 0);
        assert_eq!(topology.total_mass(), 0.0);
        let mut calls = 0;
        topology.for_each_atom_in(0..10, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn molecule_type_index_resolves_names() {
        let topology = mixed_topology();
        assert_eq!(topology.molecule_type_index("NA"), Ok(1));
        assert_eq!(
            topology.molecule_type_index("CL"),
            Err(TopologyError::UnknownMoleculeTypeName("CL".to_string()))
        );
    }
}
