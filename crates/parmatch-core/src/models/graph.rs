use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Connectivity graph has {atoms} atoms but {positions} positions were supplied")]
    AtomCountMismatch { atoms: usize, positions: usize },

    #[error("Atom {atom} is bonded to itself")]
    SelfBond { atom: usize },

    #[error("Bond {from}-{to} is not mirrored in the neighbor set of atom {to}")]
    AsymmetricBond { from: usize, to: usize },

    #[error("Atom index {atom} is out of range for a system of {atom_count} atoms")]
    AtomOutOfRange { atom: usize, atom_count: usize },

    #[error("Flat coordinate array of length {len} is not a multiple of three")]
    MalformedPositions { len: usize },
}

/// Bonded connectivity of a molecule: one ordered neighbor set per atom.
///
/// The graph is symmetric and free of self-loops by construction; every
/// constructor rejects input that would violate either property, so any
/// `BondGraph` handed to the enumerator is structurally sound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl BondGraph {
    /// Creates a graph of `atom_count` isolated atoms.
    pub fn new(atom_count: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); atom_count],
        }
    }

    /// Builds a graph from a list of bonds, inserting each bond in both
    /// directions.
    pub fn from_bonds(atom_count: usize, bonds: &[(usize, usize)]) -> Result<Self, TopologyError> {
        let mut graph = Self::new(atom_count);
        for &(i, j) in bonds {
            graph.add_bond(i, j)?;
        }
        Ok(graph)
    }

    /// Adopts raw adjacency data, validating symmetry and the absence of
    /// self-loops.
    pub fn from_adjacency(adjacency: Vec<BTreeSet<usize>>) -> Result<Self, TopologyError> {
        let atom_count = adjacency.len();
        for (i, neighbors) in adjacency.iter().enumerate() {
            for &j in neighbors {
                if j >= atom_count {
                    return Err(TopologyError::AtomOutOfRange {
                        atom: j,
                        atom_count,
                    });
                }
                if j == i {
                    return Err(TopologyError::SelfBond { atom: i });
                }
                if !adjacency[j].contains(&i) {
                    return Err(TopologyError::AsymmetricBond { from: i, to: j });
                }
            }
        }
        Ok(Self { adjacency })
    }

    /// Adds a bond between two atoms, in both directions.
    pub fn add_bond(&mut self, i: usize, j: usize) -> Result<(), TopologyError> {
        let atom_count = self.atom_count();
        for atom in [i, j] {
            if atom >= atom_count {
                return Err(TopologyError::AtomOutOfRange { atom, atom_count });
            }
        }
        if i == j {
            return Err(TopologyError::SelfBond { atom: i });
        }
        self.adjacency[i].insert(j);
        self.adjacency[j].insert(i);
        Ok(())
    }

    pub fn atom_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighbor set of an atom, or `None` when the index is out of range.
    pub fn neighbors(&self, atom: usize) -> Option<&BTreeSet<usize>> {
        self.adjacency.get(atom)
    }

    /// Number of bonded neighbors of an atom; zero for out-of-range indices.
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency.get(atom).map_or(0, BTreeSet::len)
    }

    pub(crate) fn neighbor_sets(&self) -> &[BTreeSet<usize>] {
        &self.adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bonds_builds_symmetric_adjacency() {
        let graph = BondGraph::from_bonds(3, &[(0, 1), (1, 2)]).unwrap();
        assert!(graph.neighbors(0).unwrap().contains(&1));
        assert!(graph.neighbors(1).unwrap().contains(&0));
        assert!(graph.neighbors(1).unwrap().contains(&2));
        assert!(graph.neighbors(2).unwrap().contains(&1));
        assert_eq!(graph.degree(1), 2);
    }

    #[test]
    fn add_bond_rejects_self_bond() {
        let mut graph = BondGraph::new(2);
        assert_eq!(
            graph.add_bond(1, 1),
            Err(TopologyError::SelfBond { atom: 1 })
        );
    }

    #[test]
    fn add_bond_rejects_out_of_range_atom() {
        let mut graph = BondGraph::new(2);
        assert_eq!(
            graph.add_bond(0, 5),
            Err(TopologyError::AtomOutOfRange {
                atom: 5,
                atom_count: 2
            })
        );
    }

    #[test]
    fn add_bond_is_idempotent() {
        let mut graph = BondGraph::new(2);
        graph.add_bond(0, 1).unwrap();
        graph.add_bond(1, 0).unwrap();
        assert_eq!(graph.degree(0), 1);
        assert_eq!(graph.degree(1), 1);
    }

    #[test]
    fn from_adjacency_accepts_symmetric_input() {
        let adjacency = vec![
            BTreeSet::from([1]),
            BTreeSet::from([0, 2]),
            BTreeSet::from([1]),
        ];
        let graph = BondGraph::from_adjacency(adjacency).unwrap();
        assert_eq!(graph.atom_count(), 3);
    }

    #[test]
    fn from_adjacency_rejects_asymmetric_input() {
        let adjacency = vec![BTreeSet::from([1]), BTreeSet::new()];
        assert_eq!(
            BondGraph::from_adjacency(adjacency),
            Err(TopologyError::AsymmetricBond { from: 0, to: 1 })
        );
    }

    #[test]
    fn from_adjacency_rejects_self_loop() {
        let adjacency = vec![BTreeSet::from([0])];
        assert_eq!(
            BondGraph::from_adjacency(adjacency),
            Err(TopologyError::SelfBond { atom: 0 })
        );
    }

    #[test]
    fn degree_is_zero_for_out_of_range_atom() {
        let graph = BondGraph::new(1);
        assert_eq!(graph.degree(7), 0);
    }
}
