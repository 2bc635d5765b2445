use super::graph::{BondGraph, TopologyError};
use crate::utils::geometry;
use nalgebra::Point3;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// The kinds of internal coordinate a bonded graph gives rise to.
///
/// The three pair kinds partition the non-bonded atom pairs by graph
/// separation: `Pair13` and `Pair14` are two and three bonds apart, `Pair`
/// is everything further out. Together with `Bond` they cover every
/// unordered atom pair exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordKind {
    Bond,
    Angle,
    Torsion,
    ImproperTorsion,
    Pair,
    Pair13,
    Pair14,
}

impl CoordKind {
    pub const ALL: [CoordKind; 7] = [
        CoordKind::Bond,
        CoordKind::Angle,
        CoordKind::Torsion,
        CoordKind::ImproperTorsion,
        CoordKind::Pair,
        CoordKind::Pair13,
        CoordKind::Pair14,
    ];

    /// Number of atoms defining one coordinate of this kind.
    pub fn arity(&self) -> usize {
        match self {
            CoordKind::Angle => 3,
            CoordKind::Torsion | CoordKind::ImproperTorsion => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for CoordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoordKind::Bond => "bond",
            CoordKind::Angle => "angle",
            CoordKind::Torsion => "torsion",
            CoordKind::ImproperTorsion => "improper-torsion",
            CoordKind::Pair => "pair",
            CoordKind::Pair13 => "pair13",
            CoordKind::Pair14 => "pair14",
        })
    }
}

pub type AtomTuple = Vec<usize>;

/// The enumerated coordinates of one kind: an ordered list of atom-index
/// tuples, immutable once enumeration has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordSet {
    kind: CoordKind,
    tuples: Vec<AtomTuple>,
}

impl CoordSet {
    fn new(kind: CoordKind, tuples: Vec<AtomTuple>) -> Self {
        Self { kind, tuples }
    }

    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    pub fn tuples(&self) -> &[AtomTuple] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Evaluates the scalar value of every tuple against a position buffer:
    /// distances for 2-tuples, interior angles for 3-tuples, dihedrals for
    /// 4-tuples. Output order matches [`Self::tuples`].
    pub fn values(&self, positions: &[Point3<f64>]) -> Vec<f64> {
        self.tuples
            .iter()
            .map(|tuple| match *tuple.as_slice() {
                [i, j] => geometry::distance(&positions[i], &positions[j]),
                [i, j, k] => geometry::bond_angle(&positions[i], &positions[j], &positions[k]),
                [i, j, k, l] => geometry::dihedral_angle(
                    &positions[i],
                    &positions[j],
                    &positions[k],
                    &positions[l],
                ),
                _ => unreachable!("coordinate tuples hold two to four atoms"),
            })
            .collect()
    }
}

/// Converts the flat `3 * N` coordinate layout of external callers into
/// points.
pub fn positions_from_flat(raw: &[f64]) -> Result<Vec<Point3<f64>>, TopologyError> {
    if raw.len() % 3 != 0 {
        return Err(TopologyError::MalformedPositions { len: raw.len() });
    }
    Ok(raw
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

/// All internal coordinates of a molecule, grouped by kind, sharing one
/// owned position buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalCoords {
    positions: Vec<Point3<f64>>,
    sets: BTreeMap<CoordKind, CoordSet>,
}

impl InternalCoords {
    /// Walks the connectivity graph and enumerates every internal
    /// coordinate, classifying each non-bonded atom pair by graph
    /// separation.
    ///
    /// Improper torsions are only detected at atoms with exactly three
    /// neighbors; centers that carry a fourth substituent enumerate none.
    pub fn detect(
        positions: Vec<Point3<f64>>,
        graph: &BondGraph,
    ) -> Result<Self, TopologyError> {
        let atom_count = graph.atom_count();
        if positions.len() != atom_count {
            return Err(TopologyError::AtomCountMismatch {
                atoms: atom_count,
                positions: positions.len(),
            });
        }

        let adjacency = graph.neighbor_sets();
        let mut bonds = Vec::new();
        let mut angles = Vec::new();
        let mut torsions = Vec::new();
        let mut impropers = Vec::new();
        let mut pair12 = BTreeSet::new();
        let mut pair13 = BTreeSet::new();
        let mut pair14 = BTreeSet::new();

        for i in 0..atom_count {
            for &j in &adjacency[i] {
                for &k in &adjacency[j] {
                    if k == i {
                        // Walked back along the i-j bond.
                        continue;
                    }
                    for &l in &adjacency[k] {
                        if l == j {
                            continue;
                        }
                        if l > i {
                            pair14.insert((i, l));
                        }
                        if k < j {
                            // The path is counted from the other direction.
                            continue;
                        }
                        torsions.push(vec![i, j, k, l]);
                    }
                    if k < i {
                        continue;
                    }
                    pair13.insert((i, k));
                    angles.push(vec![i, j, k]);
                    if adjacency[j].len() == 3 {
                        for &l in &adjacency[j] {
                            if l == k || l == i || l < k {
                                continue;
                            }
                            impropers.push(vec![i, j, k, l]);
                        }
                    }
                }
                if j < i {
                    continue;
                }
                pair12.insert((i, j));
                bonds.push(vec![i, j]);
            }
        }

        // Every remaining unordered pair lands in exactly one bucket, with
        // shorter separations taking precedence in rings.
        let mut pairs = Vec::new();
        let mut pairs_13 = Vec::new();
        let mut pairs_14 = Vec::new();
        for i in 0..atom_count {
            for j in (i + 1)..atom_count {
                if pair12.contains(&(i, j)) {
                    continue;
                }
                if pair13.contains(&(i, j)) {
                    pairs_13.push(vec![i, j]);
                } else if pair14.contains(&(i, j)) {
                    pairs_14.push(vec![i, j]);
                } else {
                    pairs.push(vec![i, j]);
                }
            }
        }

        debug!(
            atoms = atom_count,
            bonds = bonds.len(),
            angles = angles.len(),
            torsions = torsions.len(),
            impropers = impropers.len(),
            "enumerated internal coordinates"
        );

        let mut sets = BTreeMap::new();
        sets.insert(CoordKind::Bond, CoordSet::new(CoordKind::Bond, bonds));
        sets.insert(CoordKind::Angle, CoordSet::new(CoordKind::Angle, angles));
        sets.insert(
            CoordKind::Torsion,
            CoordSet::new(CoordKind::Torsion, torsions),
        );
        sets.insert(
            CoordKind::ImproperTorsion,
            CoordSet::new(CoordKind::ImproperTorsion, impropers),
        );
        sets.insert(CoordKind::Pair, CoordSet::new(CoordKind::Pair, pairs));
        sets.insert(
            CoordKind::Pair13,
            CoordSet::new(CoordKind::Pair13, pairs_13),
        );
        sets.insert(
            CoordKind::Pair14,
            CoordSet::new(CoordKind::Pair14, pairs_14),
        );

        Ok(Self { positions, sets })
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// The coordinate collection of one kind; every kind is present, empty
    /// or not.
    pub fn set(&self, kind: CoordKind) -> &CoordSet {
        &self.sets[&kind]
    }

    pub fn sets(&self) -> impl Iterator<Item = &CoordSet> {
        self.sets.values()
    }

    /// Current scalar values of one kind, index-aligned with its tuples.
    pub fn values(&self, kind: CoordKind) -> Vec<f64> {
        self.set(kind).values(&self.positions)
    }

    /// Replaces the position buffer so values reflect new geometry; the
    /// enumerated tuples are untouched.
    pub fn update_positions(&mut self, positions: Vec<Point3<f64>>) -> Result<(), TopologyError> {
        if positions.len() != self.positions.len() {
            return Err(TopologyError::AtomCountMismatch {
                atoms: self.positions.len(),
                positions: positions.len(),
            });
        }
        self.positions = positions;
        Ok(())
    }
}
