use ndarray::{Array1, Array2};
use pricing::{Greek, PricedOption};
use serde::Deserialize;
use tracing::debug;

use crate::error::HedgeError;
use crate::linalg;

/// Largest accepted rounding precision, about the significant digits of an `f64`.
pub const MAX_ROUND_DECIMALS: u32 = 15;

/// How the sensitivity matrices are conditioned before they are solved.
///
/// The default rounds every greek to two decimals before solving. `Conditioning::raw()`
/// keeps the exact greeks and relies on the pivot tolerance and an optional condition
/// number ceiling instead.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Conditioning {
    pub round_decimals: Option<u32>,
    /// pivots up to this fraction of the largest matrix entry count as zero
    pub pivot_tolerance: f64,
    pub max_condition_number: Option<f64>,
}

impl Default for Conditioning {
    fn default() -> Self {
        Self {
            round_decimals: Some(2),
            pivot_tolerance: 1e-12,
            max_condition_number: None,
        }
    }
}

impl Conditioning {
    pub fn raw() -> Self {
        Self {
            round_decimals: None,
            ..Self::default()
        }
    }

    /// Rejects settings under which every system would be reported singular.
    pub fn validate(&self) -> Result<(), HedgeError> {
        if let Some(decimals) = self.round_decimals {
            if decimals > MAX_ROUND_DECIMALS {
                return Err(HedgeError::Config(format!(
                    "round_decimals {decimals} exceeds {MAX_ROUND_DECIMALS}"
                )));
            }
        }
        if !(self.pivot_tolerance.is_finite() && self.pivot_tolerance >= 0.0) {
            return Err(HedgeError::Config(format!(
                "pivot_tolerance must be finite and non-negative, got {}",
                self.pivot_tolerance
            )));
        }
        if let Some(max) = self.max_condition_number {
            if !(max > 0.0) {
                return Err(HedgeError::Config(format!(
                    "max_condition_number must be positive, got {max}"
                )));
            }
        }
        Ok(())
    }

    fn apply(&self, matrix: Array2<f64>) -> Array2<f64> {
        match self.round_decimals {
            Some(decimals) => linalg::round_matrix(&matrix, decimals),
            None => matrix,
        }
    }

    fn check(&self, matrix: &Array2<f64>) -> Result<(), HedgeError> {
        if let Some(max) = self.max_condition_number {
            let condition_number = linalg::condition_number(matrix, self.pivot_tolerance)?;
            debug!(condition_number, max, "sensitivity matrix condition");
            if !(condition_number <= max) {
                return Err(HedgeError::IllConditioned {
                    condition_number,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// One row per greek, one column per instrument.
pub fn sensitivity_matrix(instruments: &[PricedOption], greeks: &[Greek]) -> Array2<f64> {
    Array2::from_shape_fn((greeks.len(), instruments.len()), |(row, col)| {
        instruments[col].greek(greeks[row])
    })
}

fn position_greeks(held: &PricedOption, count: f64, greeks: &[Greek]) -> Array1<f64> {
    greeks.iter().map(|g| held.greek(*g) * count).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HedgeSolver {
    pub conditioning: Conditioning,
}

impl HedgeSolver {
    pub fn new(conditioning: Conditioning) -> Self {
        Self { conditioning }
    }

    /// Contract counts in `hedges` whose `greeks` match those of `held_count` units of
    /// `held`, sized on the absolute held count.
    ///
    /// One greek per hedge instrument is needed.
    pub fn neutralize(
        &self,
        held: &PricedOption,
        held_count: f64,
        hedges: &[PricedOption],
        greeks: &[Greek],
    ) -> Result<Array1<f64>, HedgeError> {
        if greeks.len() != hedges.len() || hedges.is_empty() {
            return Err(HedgeError::DimensionMismatch {
                rows: greeks.len(),
                cols: hedges.len(),
            });
        }
        self.conditioning.validate()?;

        let matrix = self.conditioning.apply(sensitivity_matrix(hedges, greeks));
        let target = position_greeks(held, held_count.abs(), greeks);
        debug!(?greeks, %matrix, %target, "neutralizing");

        self.conditioning.check(&matrix)?;
        let weights = linalg::solve(&matrix, &target, self.conditioning.pivot_tolerance)?;
        debug!(%weights, "hedge weights");
        Ok(weights)
    }

    /// The position in the underlying that completes a hedge: the rounded delta of the
    /// held position, signed by `held_count`, plus the delta of the hedge `weights`.
    pub fn underlying_position(
        &self,
        held: &PricedOption,
        held_count: f64,
        hedges: &[PricedOption],
        greeks: &[Greek],
        weights: &Array1<f64>,
    ) -> Result<f64, HedgeError> {
        if weights.len() != hedges.len() {
            return Err(HedgeError::DimensionMismatch {
                rows: weights.len(),
                cols: hedges.len(),
            });
        }
        self.conditioning.validate()?;

        let rows: Vec<Greek> = std::iter::once(Greek::Delta)
            .chain(greeks.iter().copied())
            .collect();
        let matrix = self.conditioning.apply(sensitivity_matrix(hedges, &rows));
        let exposure = matrix.dot(weights) + position_greeks(held, held_count, &rows);
        let exposure = exposure.mapv(f64::round_ties_even);
        debug!(%exposure, "residual exposure");

        Ok(exposure[0])
    }
}
