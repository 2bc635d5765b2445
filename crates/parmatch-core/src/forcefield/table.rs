use crate::models::coords::CoordKind;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::warn;

/// The recognized kinds of numeric parameter a potential model may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamName {
    ForceConstant,
    Equilibrium,
    Amplitude,
    Phase,
    Periodicity,
    Charge,
    Sigma,
    Epsilon,
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamName::ForceConstant => "force-constant",
            ParamName::Equilibrium => "equilibrium",
            ParamName::Amplitude => "amplitude",
            ParamName::Phase => "phase",
            ParamName::Periodicity => "periodicity",
            ParamName::Charge => "charge",
            ParamName::Sigma => "sigma",
            ParamName::Epsilon => "epsilon",
        })
    }
}

/// The closed set of potential models a term can evaluate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    HarmonicOscillator,
    FourierSeries,
    LennardJones,
    Electrostatics,
}

impl ModelKind {
    /// Parameters this model consumes, in the order its `deriv` expects
    /// them.
    pub fn parameters(&self) -> &'static [ParamName] {
        match self {
            ModelKind::HarmonicOscillator => {
                &[ParamName::ForceConstant, ParamName::Equilibrium]
            }
            ModelKind::FourierSeries => &[
                ParamName::Amplitude,
                ParamName::Phase,
                ParamName::Periodicity,
            ],
            ModelKind::LennardJones => &[ParamName::Sigma, ParamName::Epsilon],
            ModelKind::Electrostatics => &[ParamName::Charge],
        }
    }

    /// Number of stored components per coordinate instance: Fourier terms
    /// keep up to three series components, everything else one scalar.
    pub fn stride(&self) -> usize {
        match self {
            ModelKind::FourierSeries => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::HarmonicOscillator => "harmonic-oscillator",
            ModelKind::FourierSeries => "fourier-series",
            ModelKind::LennardJones => "lennard-jones",
            ModelKind::Electrostatics => "electrostatics",
        })
    }
}

/// One additive contribution to the total energy: a potential model applied
/// to one coordinate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct TermType {
    pub model: ModelKind,
    pub coord: CoordKind,
}

impl TermType {
    pub const fn new(model: ModelKind, coord: CoordKind) -> Self {
        Self { model, coord }
    }

    pub const HARMONIC_BOND: TermType =
        TermType::new(ModelKind::HarmonicOscillator, CoordKind::Bond);
    pub const HARMONIC_ANGLE: TermType =
        TermType::new(ModelKind::HarmonicOscillator, CoordKind::Angle);
    pub const HARMONIC_PAIR13: TermType =
        TermType::new(ModelKind::HarmonicOscillator, CoordKind::Pair13);
    pub const HARMONIC_IMPROPER: TermType =
        TermType::new(ModelKind::HarmonicOscillator, CoordKind::ImproperTorsion);
    pub const FOURIER_TORSION: TermType =
        TermType::new(ModelKind::FourierSeries, CoordKind::Torsion);
    pub const FOURIER_IMPROPER: TermType =
        TermType::new(ModelKind::FourierSeries, CoordKind::ImproperTorsion);
    pub const LENNARD_JONES_PAIR: TermType =
        TermType::new(ModelKind::LennardJones, CoordKind::Pair);
    pub const LENNARD_JONES_PAIR14: TermType =
        TermType::new(ModelKind::LennardJones, CoordKind::Pair14);
    pub const COULOMB_PAIR: TermType =
        TermType::new(ModelKind::Electrostatics, CoordKind::Pair);
    pub const COULOMB_PAIR14: TermType =
        TermType::new(ModelKind::Electrostatics, CoordKind::Pair14);
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.coord)
    }
}

/// Whether a term matches parameters on fine-grained atom types or on the
/// coarser atom classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelKind {
    #[default]
    Type,
    Class,
}

/// Pure canonicalization of a raw type tuple, so that lookups succeed no
/// matter which direction a coordinate was enumerated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderRule {
    /// Sort the whole tuple ascending (bonds, nonbonded pairs).
    Sorted,
    /// Reverse the tuple when the last label is smaller than the first
    /// (angles).
    Reversible,
    /// Orient along the central bond: inner pair ascending, outer pair
    /// breaking ties (torsions). Tuples shorter than four fall back to
    /// end-for-end comparison.
    Directed,
    /// Keep the center label in second position and sort the remaining
    /// three (impropers; the enumerator places the hub second).
    Centered,
}

impl OrderRule {
    pub fn apply(&self, labels: &[usize]) -> Vec<usize> {
        let mut out = labels.to_vec();
        match self {
            OrderRule::Sorted => out.sort_unstable(),
            OrderRule::Reversible => {
                if out.last() < out.first() {
                    out.reverse();
                }
            }
            OrderRule::Directed => {
                if let [i, j, k, l] = *out.as_slice() {
                    if j > k || (j == k && i > l) {
                        out.reverse();
                    }
                } else if out.last() < out.first() {
                    out.reverse();
                }
            }
            OrderRule::Centered => {
                if let [i, center, k, l] = *out.as_slice() {
                    let mut periphery = [i, k, l];
                    periphery.sort_unstable();
                    out = vec![periphery[0], center, periphery[1], periphery[2]];
                }
            }
        }
        out
    }
}

/// Synthesis of a multi-atom parameter from single-atom values, used when a
/// term has no explicit entry for a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombRule {
    ArithmeticMean,
    GeometricMean,
    Product,
}

impl CombRule {
    pub fn combine(&self, values: &[f64]) -> f64 {
        match self {
            CombRule::ArithmeticMean => {
                values.iter().sum::<f64>() / values.len() as f64
            }
            CombRule::GeometricMean => values
                .iter()
                .product::<f64>()
                .powf(1.0 / values.len() as f64),
            CombRule::Product => values.iter().product(),
        }
    }
}

/// Exact-match store of numeric parameter vectors keyed by term, parameter
/// name, and canonical type tuple. Canonicalization happens before lookup;
/// the table itself does no wildcarding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable {
    entries: HashMap<TermType, HashMap<ParamName, HashMap<Vec<usize>, Vec<f64>>>>,
}

impl ParamTable {
    pub fn insert(
        &mut self,
        term: TermType,
        param: ParamName,
        types: Vec<usize>,
        values: Vec<f64>,
    ) {
        self.entries
            .entry(term)
            .or_default()
            .entry(param)
            .or_default()
            .insert(types, values);
    }

    pub fn get(&self, term: TermType, param: ParamName, types: &[usize]) -> Option<&[f64]> {
        self.entries
            .get(&term)?
            .get(&param)?
            .get(types)
            .map(Vec::as_slice)
    }

    fn term_entries(
        &self,
        term: TermType,
    ) -> Option<&HashMap<ParamName, HashMap<Vec<usize>, Vec<f64>>>> {
        self.entries.get(&term)
    }
}

/// A force field: the parameter table plus every per-term rule the
/// assignment engine consults. Built once at configuration time and treated
/// as immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forcefield {
    pub terms: BTreeSet<TermType>,
    pub params: ParamTable,
    pub type_to_class: HashMap<usize, usize>,
    pub label_kinds: HashMap<TermType, LabelKind>,
    pub order_rules: HashMap<TermType, OrderRule>,
    pub comb_rules: HashMap<(ModelKind, ParamName), CombRule>,
    pub scale_factors: HashMap<TermType, f64>,
}

impl Forcefield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a term together with its matching metadata. A term left
    /// without an ordering rule looks tuples up as enumerated.
    pub fn register_term(&mut self, term: TermType, labels: LabelKind, order: Option<OrderRule>) {
        self.terms.insert(term);
        self.label_kinds.insert(term, labels);
        if let Some(rule) = order {
            self.order_rules.insert(term, rule);
        }
    }

    /// Copies `src`'s parameter entries (and, where absent, its matching
    /// metadata) onto `dst`. Entries the destination already holds are left
    /// untouched, which makes the operation idempotent; it is meant to run
    /// once during setup, e.g. to derive a 1-4 parameter set from the
    /// general pair set.
    pub fn link_terms(&mut self, dst: TermType, src: TermType) {
        let Some(src_entries) = self.params.term_entries(src).cloned() else {
            return;
        };
        let mut skipped = 0usize;
        for (param, tuples) in src_entries {
            for (types, values) in tuples {
                if self.params.get(dst, param, &types).is_some() {
                    skipped += 1;
                    continue;
                }
                self.params.insert(dst, param, types, values);
            }
        }
        if skipped > 0 {
            warn!(
                src = %src,
                dst = %dst,
                skipped,
                "link_terms left existing destination entries in place"
            );
        }
        self.terms.insert(dst);
        if let Some(&labels) = self.label_kinds.get(&src) {
            self.label_kinds.entry(dst).or_insert(labels);
        }
        if let Some(&rule) = self.order_rules.get(&src) {
            self.order_rules.entry(dst).or_insert(rule);
        }
    }
}
