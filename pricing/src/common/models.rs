use crate::analytic::black_scholes::{BlackScholes, OptionPrice};
use crate::error::PricingError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The market and contract inputs of a European option.
///
/// Only obtainable through [`DerivativeParameter::new`], so every instance is valid:
///
/// ```compile_fail
/// use pricing::DerivativeParameter;
///
/// let dp = DerivativeParameter {
///     asset_price: 100.0,
///     asset_volatility: 0.0,
///     strike_price: 100.0,
///     time_to_expiration: 1.0,
///     risk_free_rate: 0.01,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeParameter {
    /// the asset's price at time t
    pub(crate) asset_price: f64,
    /// the annualized standard deviation of the stock's returns
    pub(crate) asset_volatility: f64,
    /// the strike or exercise price of the asset
    pub(crate) strike_price: f64,
    /// (T - t) in years, where T is the time of the option's expiration and t is the current time
    pub(crate) time_to_expiration: f64,
    /// the annualized, continuously compounded risk-free interest rate
    pub(crate) risk_free_rate: f64,
}

impl DerivativeParameter {
    /// Validated parameters: price, volatility, strike and time to expiration must be
    /// strictly positive and finite, the rate must be finite.
    pub fn new(
        asset_price: f64,
        asset_volatility: f64,
        strike_price: f64,
        time_to_expiration: f64,
        risk_free_rate: f64,
    ) -> Result<Self, PricingError> {
        positive("asset_price", asset_price)?;
        positive("asset_volatility", asset_volatility)?;
        positive("strike_price", strike_price)?;
        positive("time_to_expiration", time_to_expiration)?;
        if !risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParameter {
                name: "risk_free_rate",
                value: risk_free_rate,
            });
        }

        Ok(Self {
            asset_price,
            asset_volatility,
            strike_price,
            time_to_expiration,
            risk_free_rate,
        })
    }

    /// The same contract with another strike.
    pub fn with_strike(&self, strike_price: f64) -> Result<Self, PricingError> {
        Self::new(
            self.asset_price,
            self.asset_volatility,
            strike_price,
            self.time_to_expiration,
            self.risk_free_rate,
        )
    }

    pub fn asset_price(&self) -> f64 {
        self.asset_price
    }

    pub fn asset_volatility(&self) -> f64 {
        self.asset_volatility
    }

    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    pub fn time_to_expiration(&self) -> f64 {
        self.time_to_expiration
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub(crate) fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiration).exp()
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), PricingError> {
    // also rejects NaN
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::InvalidParameter { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExerciseType {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Greek {
    Delta,
    Gamma,
    Vega,
}

/// A European option priced once at construction. Price and greeks are read-only:
///
/// ```compile_fail
/// use pricing::{DerivativeParameter, PricedOption};
///
/// let dp = DerivativeParameter::new(100.0, 0.2, 100.0, 1.0, 0.01).unwrap();
/// let mut option = PricedOption::call(dp);
/// option.price = 0.0;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedOption {
    pub(crate) exercise_type: ExerciseType,
    pub(crate) params: DerivativeParameter,
    /// theoretical value
    pub(crate) price: f64,
    pub(crate) delta: f64,
    pub(crate) gamma: f64,
    /// sensitivity per 1 point change of the volatility, i.e. scaled by 1/100
    pub(crate) vega: f64,
}

impl PricedOption {
    pub fn new(exercise_type: ExerciseType, params: DerivativeParameter) -> Self {
        match exercise_type {
            ExerciseType::Call => BlackScholes::call(&params),
            ExerciseType::Put => BlackScholes::put(&params),
        }
    }

    pub fn call(params: DerivativeParameter) -> Self {
        Self::new(ExerciseType::Call, params)
    }

    pub fn put(params: DerivativeParameter) -> Self {
        Self::new(ExerciseType::Put, params)
    }

    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    pub fn params(&self) -> &DerivativeParameter {
        &self.params
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn vega(&self) -> f64 {
        self.vega
    }

    pub fn greek(&self, greek: Greek) -> f64 {
        match greek {
            Greek::Delta => self.delta,
            Greek::Gamma => self.gamma,
            Greek::Vega => self.vega,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_inputs() {
        let err = DerivativeParameter::new(0.0, 0.2, 100.0, 1.0, 0.01).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidParameter {
                name: "asset_price",
                value: 0.0
            }
        );
        assert!(DerivativeParameter::new(100.0, 0.0, 100.0, 1.0, 0.01).is_err());
        assert!(DerivativeParameter::new(100.0, 0.2, 0.0, 1.0, 0.01).is_err());
        assert!(DerivativeParameter::new(100.0, 0.2, 100.0, 0.0, 0.01).is_err());
        assert!(DerivativeParameter::new(100.0, -0.2, 100.0, 1.0, 0.01).is_err());
        assert!(DerivativeParameter::new(f64::NAN, 0.2, 100.0, 1.0, 0.01).is_err());
        assert!(DerivativeParameter::new(100.0, 0.2, 100.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn negative_rates_are_allowed() {
        assert!(DerivativeParameter::new(100.0, 0.2, 100.0, 1.0, -0.005).is_ok());
    }

    #[test]
    fn with_strike_keeps_market_inputs() {
        let dp = DerivativeParameter::new(543.0, 0.53, 545.0, 30.0 / 365.0, 0.015).unwrap();
        let other = dp.with_strike(550.0).unwrap();
        assert_eq!(other.strike_price, 550.0);
        assert_eq!(other.asset_price, dp.asset_price);
        assert_eq!(other.time_to_expiration, dp.time_to_expiration);
        assert!(dp.with_strike(-1.0).is_err());
    }

    #[test]
    fn greek_selector() {
        let dp = DerivativeParameter::new(100.0, 0.2, 100.0, 1.0, 0.01).unwrap();
        let option = PricedOption::call(dp);
        assert_eq!(option.greek(Greek::Delta), option.delta());
        assert_eq!(option.greek(Greek::Gamma), option.gamma());
        assert_eq!(option.greek(Greek::Vega), option.vega());
    }

    #[test]
    fn priced_option_keeps_its_inputs() {
        let dp = DerivativeParameter::new(543.0, 0.53, 545.0, 30.0 / 365.0, 0.015).unwrap();
        let option = PricedOption::put(dp);
        assert_eq!(option.exercise_type(), ExerciseType::Put);
        assert_eq!(option.params(), &dp);
        assert_eq!(option.params().asset_volatility(), 0.53);
        assert_eq!(option.params().risk_free_rate(), 0.015);
        assert!(option.gamma().is_finite() && option.vega().is_finite());
    }
}
