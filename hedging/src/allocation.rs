use std::path::Path;

use pricing::{DerivativeParameter, ExerciseType, Greek, PricedOption};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::HedgeError;
use crate::solver::{Conditioning, HedgeSolver};

const DAYS_PER_YEAR: f64 = 365.0;
const GAMMA_VEGA: [Greek; 2] = [Greek::Gamma, Greek::Vega];

/// A held option position and the two options used to hedge it, all on one underlying.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawHedgeParameters")]
pub struct HedgeParameters {
    pub asset_price: f64,
    /// implied volatility
    pub volatility: f64,
    pub years_to_expiry: f64,
    pub risk_free_rate: f64,
    /// signed number of contracts held, negative when short
    pub held_count: i64,
    pub held_strike: f64,
    pub hedge_strike_1: f64,
    pub hedge_strike_2: f64,
    /// applies to the held option and both hedges
    pub variant: ExerciseType,
}

impl Default for HedgeParameters {
    fn default() -> Self {
        Self {
            asset_price: 543.0,
            volatility: 0.53,
            years_to_expiry: 30.0 / DAYS_PER_YEAR,
            risk_free_rate: 0.015,
            held_count: -1000,
            held_strike: 545.0,
            hedge_strike_1: 550.0,
            hedge_strike_2: 555.0,
            variant: ExerciseType::Call,
        }
    }
}

/// The file form: every field is optional, expiry can be given in days.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHedgeParameters {
    asset_price: Option<f64>,
    volatility: Option<f64>,
    years_to_expiry: Option<f64>,
    days_to_expiry: Option<f64>,
    risk_free_rate: Option<f64>,
    held_count: Option<i64>,
    held_strike: Option<f64>,
    hedge_strike_1: Option<f64>,
    hedge_strike_2: Option<f64>,
    variant: Option<ExerciseType>,
}

impl TryFrom<RawHedgeParameters> for HedgeParameters {
    type Error = HedgeError;

    fn try_from(raw: RawHedgeParameters) -> Result<Self, Self::Error> {
        let defaults = HedgeParameters::default();
        let years_to_expiry = match (raw.years_to_expiry, raw.days_to_expiry) {
            (Some(_), Some(_)) => {
                return Err(HedgeError::Config(
                    "give either years_to_expiry or days_to_expiry, not both".to_string(),
                ))
            }
            (Some(years), None) => years,
            (None, Some(days)) => days / DAYS_PER_YEAR,
            (None, None) => defaults.years_to_expiry,
        };

        Ok(Self {
            asset_price: raw.asset_price.unwrap_or(defaults.asset_price),
            volatility: raw.volatility.unwrap_or(defaults.volatility),
            years_to_expiry,
            risk_free_rate: raw.risk_free_rate.unwrap_or(defaults.risk_free_rate),
            held_count: raw.held_count.unwrap_or(defaults.held_count),
            held_strike: raw.held_strike.unwrap_or(defaults.held_strike),
            hedge_strike_1: raw.hedge_strike_1.unwrap_or(defaults.hedge_strike_1),
            hedge_strike_2: raw.hedge_strike_2.unwrap_or(defaults.hedge_strike_2),
            variant: raw.variant.unwrap_or(defaults.variant),
        })
    }
}

impl HedgeParameters {
    pub fn with_days_to_expiry(self, days: f64) -> Self {
        Self {
            years_to_expiry: days / DAYS_PER_YEAR,
            ..self
        }
    }

    fn option(&self, strike: f64) -> Result<PricedOption, HedgeError> {
        let dp = DerivativeParameter::new(
            self.asset_price,
            self.volatility,
            strike,
            self.years_to_expiry,
            self.risk_free_rate,
        )?;
        Ok(PricedOption::new(self.variant, dp))
    }

    /// Allocation with the default (two decimal rounding) conditioning.
    pub fn compute(&self) -> Result<HedgeResult, HedgeError> {
        HedgeSolver::default().allocate(self)
    }
}

/// Positions of the full hedge and the greeks of the held position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeResult {
    pub held_count: i64,
    pub hedge1_count: i64,
    pub hedge2_count: i64,
    pub underlying_count: i64,
    /// theoretical value of the held position, price times the absolute count
    pub held_value: f64,
    pub held_delta: f64,
    pub held_gamma: f64,
    pub held_vega: f64,
}

/// Whole contracts, truncated toward zero.
fn whole_contracts(value: f64) -> Result<i64, HedgeError> {
    let whole = value.trunc();
    // i64::MAX as f64 rounds up to 2^63
    if whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64 {
        Ok(whole as i64)
    } else {
        Err(HedgeError::PositionOutOfRange { value })
    }
}

impl HedgeSolver {
    pub fn allocate(&self, params: &HedgeParameters) -> Result<HedgeResult, HedgeError> {
        let held = params.option(params.held_strike)?;
        let hedges = [
            params.option(params.hedge_strike_1)?,
            params.option(params.hedge_strike_2)?,
        ];
        let count = params.held_count as f64;
        debug!(?held, ?hedges, "priced options");

        let weights = self.neutralize(&held, count, &hedges, &GAMMA_VEGA)?;
        let underlying = self.underlying_position(&held, count, &hedges, &GAMMA_VEGA, &weights)?;

        let result = HedgeResult {
            held_count: params.held_count,
            hedge1_count: whole_contracts(weights[0])?,
            hedge2_count: whole_contracts(weights[1])?,
            underlying_count: whole_contracts(underlying)?,
            held_value: held.price() * count.abs(),
            held_delta: held.delta() * count,
            held_gamma: held.gamma() * count,
            held_vega: held.vega() * count,
        };
        info!(
            hedge1 = result.hedge1_count,
            hedge2 = result.hedge2_count,
            underlying = result.underlying_count,
            "hedge allocated"
        );
        Ok(result)
    }
}

/// Gamma and vega neutral hedge of `held_count` options struck at `held_strike` with the
/// options struck at `hedge_strike_1` and `hedge_strike_2`, completed in the underlying.
#[allow(clippy::too_many_arguments)]
pub fn compute_hedge(
    asset_price: f64,
    volatility: f64,
    years_to_expiry: f64,
    risk_free_rate: f64,
    held_count: i64,
    held_strike: f64,
    hedge_strike_1: f64,
    hedge_strike_2: f64,
    variant: ExerciseType,
) -> Result<HedgeResult, HedgeError> {
    HedgeParameters {
        asset_price,
        volatility,
        years_to_expiry,
        risk_free_rate,
        held_count,
        held_strike,
        hedge_strike_1,
        hedge_strike_2,
        variant,
    }
    .compute()
}

/// Contents of a configuration file: a `[position]` and a `[conditioning]` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationConfig {
    pub position: HedgeParameters,
    pub conditioning: Conditioning,
}

impl AllocationConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, HedgeError> {
        let config: Self = toml::from_str(s).map_err(|e| HedgeError::Config(e.to_string()))?;
        config.conditioning.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HedgeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn run(&self) -> Result<HedgeResult, HedgeError> {
        HedgeSolver::new(self.conditioning).allocate(&self.position)
    }
}
