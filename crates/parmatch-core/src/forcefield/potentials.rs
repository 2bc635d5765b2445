use super::table::{ModelKind, ParamName};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PotentialError {
    #[error("Derivative order {0} is not implemented")]
    UnsupportedOrder(usize),

    #[error("Model {model} takes {expected} parameter vectors, found {found}")]
    ParameterCountMismatch {
        model: ModelKind,
        expected: usize,
        found: usize,
    },

    #[error("Model {model} expected {expected} values for parameter {param}, found {found}")]
    ArityMismatch {
        model: ModelKind,
        param: ParamName,
        expected: usize,
        found: usize,
    },
}

impl ModelKind {
    /// Evaluates this model over a batch of coordinate instances.
    ///
    /// `params` carries one slice per entry of [`ModelKind::parameters`],
    /// in that order, each holding [`ModelKind::stride`] values per
    /// coordinate. `order == 0` returns per-instance energies aligned with
    /// `coords`; higher orders are not implemented and fail explicitly.
    pub fn deriv(
        &self,
        order: usize,
        params: &[&[f64]],
        coords: &[f64],
    ) -> Result<Vec<f64>, PotentialError> {
        if order != 0 {
            return Err(PotentialError::UnsupportedOrder(order));
        }
        let names = self.parameters();
        if params.len() != names.len() {
            return Err(PotentialError::ParameterCountMismatch {
                model: *self,
                expected: names.len(),
                found: params.len(),
            });
        }
        let expected = coords.len() * self.stride();
        for (&name, values) in names.iter().zip(params) {
            if values.len() != expected {
                return Err(PotentialError::ArityMismatch {
                    model: *self,
                    param: name,
                    expected,
                    found: values.len(),
                });
            }
        }

        let energies = match self {
            ModelKind::HarmonicOscillator => coords
                .iter()
                .enumerate()
                .map(|(t, &x)| harmonic(x, params[0][t], params[1][t]))
                .collect(),
            ModelKind::FourierSeries => coords
                .iter()
                .enumerate()
                .map(|(t, &x)| {
                    let window = 3 * t..3 * t + 3;
                    fourier_series(
                        x,
                        &params[0][window.clone()],
                        &params[1][window.clone()],
                        &params[2][window],
                    )
                })
                .collect(),
            ModelKind::LennardJones => coords
                .iter()
                .enumerate()
                .map(|(t, &x)| lennard_jones_12_6(x, params[0][t], params[1][t]))
                .collect(),
            ModelKind::Electrostatics => coords
                .iter()
                .enumerate()
                .map(|(t, &x)| coulomb(x, params[0][t]))
                .collect(),
        };
        Ok(energies)
    }
}

#[inline]
fn harmonic(value: f64, force_constant: f64, equilibrium: f64) -> f64 {
    let displacement = value - equilibrium;
    0.5 * force_constant * displacement * displacement
}

#[inline]
fn fourier_series(value: f64, amplitudes: &[f64], phases: &[f64], periodicities: &[f64]) -> f64 {
    amplitudes
        .iter()
        .zip(phases)
        .zip(periodicities)
        .map(|((amp, phase), n)| amp * (1.0 + (n * value - phase).cos()))
        .sum()
}

#[inline]
fn lennard_jones_12_6(dist: f64, sigma: f64, epsilon: f64) -> f64 {
    if dist < 1e-6 {
        return 1e10;
    }
    let rho = sigma / dist;
    let rho6 = rho.powi(6);
    let rho12 = rho6 * rho6;
    epsilon * (rho12 - 2.0 * rho6)
}

#[inline]
fn coulomb(dist: f64, charge_product: f64) -> f64 {
    if dist < 1e-6 {
        return charge_product.signum() * 1e10;
    }
    charge_product / dist
}
