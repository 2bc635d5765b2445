use super::assign::ResolvedParams;
use super::potentials::PotentialError;
use super::table::{Forcefield, ParamName, TermType};
use crate::models::coords::InternalCoords;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-term value vectors, index-aligned with the coordinate collections.
pub type TermValues = BTreeMap<TermType, Vec<f64>>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnergyError {
    #[error("Term {term} has no resolved values for parameter {param}")]
    MissingParams { term: TermType, param: ParamName },

    #[error(transparent)]
    Potential(#[from] PotentialError),
}

/// Evaluates every registered term of the force field at the requested
/// derivative order (`0` for energies), applying per-term scale factors.
pub fn deriv(
    order: usize,
    ff: &Forcefield,
    coords: &InternalCoords,
    resolved: &ResolvedParams,
) -> Result<TermValues, EnergyError> {
    let mut out = TermValues::new();
    for &term in &ff.terms {
        let values = coords.values(term.coord);
        if values.is_empty() {
            // Nothing enumerated for this kind, so nothing was assigned.
            out.insert(term, Vec::new());
            continue;
        }
        let params = term
            .model
            .parameters()
            .iter()
            .map(|&param| {
                resolved
                    .get(term, param)
                    .ok_or(EnergyError::MissingParams { term, param })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut contributions = term.model.deriv(order, &params, &values)?;
        if let Some(&scale) = ff.scale_factors.get(&term) {
            for value in &mut contributions {
                *value *= scale;
            }
        }
        out.insert(term, contributions);
    }
    Ok(out)
}

/// Total energy: the sum over every term's order-0 contributions.
pub fn total_energy(
    ff: &Forcefield,
    coords: &InternalCoords,
    resolved: &ResolvedParams,
) -> Result<f64, EnergyError> {
    Ok(deriv(0, ff, coords, resolved)?
        .values()
        .flatten()
        .sum())
}
