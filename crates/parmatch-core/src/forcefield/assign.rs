use super::table::{Forcefield, LabelKind, ParamName, TermType};
use crate::models::coords::InternalCoords;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssignmentError {
    #[error("Atom type array has {found} entries but the system has {expected} atoms")]
    TypeCountMismatch { expected: usize, found: usize },

    #[error("Atom type {atom_type} has no class entry, required by term {term}")]
    MissingClass { term: TermType, atom_type: usize },

    #[error(
        "No parameter entry for term {term}, parameter {param}, type tuple {types:?}, \
         and no combination rule applies"
    )]
    MissingEntry {
        term: TermType,
        param: ParamName,
        types: Vec<usize>,
    },

    #[error(
        "Term {term}, parameter {param}, type tuple {types:?}: expected one stored value, \
         found {found}"
    )]
    ScalarExpected {
        term: TermType,
        param: ParamName,
        types: Vec<usize>,
        found: usize,
    },
}

/// Resolved parameter vectors, term by term, index-aligned with the
/// coordinate collections they were assigned from. A Fourier term stores
/// three components per coordinate instance, every other model one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<TermType, HashMap<ParamName, Vec<f64>>>,
}

impl ResolvedParams {
    pub fn get(&self, term: TermType, param: ParamName) -> Option<&[f64]> {
        self.values.get(&term)?.get(&param).map(Vec::as_slice)
    }

    pub fn terms(&self) -> impl Iterator<Item = TermType> + '_ {
        self.values.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, term: TermType, param: ParamName, value: f64) {
        self.values
            .entry(term)
            .or_default()
            .entry(param)
            .or_default()
            .push(value);
    }
}

/// Resolves the numeric parameters of every registered term against the
/// enumerated coordinates.
///
/// For each coordinate instance the atom indices are mapped to types (or
/// classes, per the term's label kind), the tuple is canonicalized by the
/// term's ordering rule, and each parameter the model requires is either
/// looked up directly or synthesized through a combination rule from
/// single-atom entries. Combination rules read only the first component of
/// each single-atom vector.
pub fn assign_params(
    coords: &InternalCoords,
    ff: &Forcefield,
    atom_types: &[usize],
) -> Result<ResolvedParams, AssignmentError> {
    if atom_types.len() != coords.atom_count() {
        return Err(AssignmentError::TypeCountMismatch {
            expected: coords.atom_count(),
            found: atom_types.len(),
        });
    }

    let mut resolved = ResolvedParams::default();
    for &term in &ff.terms {
        let use_class = ff
            .label_kinds
            .get(&term)
            .copied()
            .unwrap_or_default()
            == LabelKind::Class;
        let order_rule = ff.order_rules.get(&term);

        for tuple in coords.set(term.coord).tuples() {
            let mut labels = Vec::with_capacity(tuple.len());
            for &atom in tuple {
                let atom_type = atom_types[atom];
                let label = if use_class {
                    *ff.type_to_class.get(&atom_type).ok_or(
                        AssignmentError::MissingClass { term, atom_type },
                    )?
                } else {
                    atom_type
                };
                labels.push(label);
            }
            let ordered = match order_rule {
                Some(rule) => rule.apply(&labels),
                None => labels.clone(),
            };

            for &param in term.model.parameters() {
                if let Some(rule) = ff.comb_rules.get(&(term.model, param)) {
                    // Synthesized from per-atom entries; only the leading
                    // component of each stored vector participates.
                    let mut singles = Vec::with_capacity(labels.len());
                    for &label in &labels {
                        let stored = ff.params.get(term, param, &[label]).ok_or_else(|| {
                            AssignmentError::MissingEntry {
                                term,
                                param,
                                types: vec![label],
                            }
                        })?;
                        let first = stored.first().copied().ok_or_else(|| {
                            AssignmentError::ScalarExpected {
                                term,
                                param,
                                types: vec![label],
                                found: 0,
                            }
                        })?;
                        singles.push(first);
                    }
                    resolved.push(term, param, rule.combine(&singles));
                } else {
                    let stored =
                        ff.params.get(term, param, &ordered).ok_or_else(|| {
                            AssignmentError::MissingEntry {
                                term,
                                param,
                                types: ordered.clone(),
                            }
                        })?;
                    if term.model.stride() > 1 {
                        for component in 0..term.model.stride() {
                            resolved.push(
                                term,
                                param,
                                stored.get(component).copied().unwrap_or(0.0),
                            );
                        }
                    } else {
                        if stored.len() != 1 {
                            return Err(AssignmentError::ScalarExpected {
                                term,
                                param,
                                types: ordered.clone(),
                                found: stored.len(),
                            });
                        }
                        resolved.push(term, param, stored[0]);
                    }
                }
            }
        }
        debug!(term = %term, coords = coords.set(term.coord).len(), "assigned term parameters");
    }
    Ok(resolved)
}
