use crate::common::models::{DerivativeParameter, ExerciseType, PricedOption};
use crate::error::PricingError;
use probability::distribution::{Distribution, Gaussian};

pub(crate) fn cdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.distribution(d)
}

pub trait OptionPrice {
    type Params;
    type Output;
    fn put(params: &Self::Params) -> Self::Output;
    fn call(params: &Self::Params) -> Self::Output;
}

/// European Put and Call option prices and greeks for stocks without dividends.
/// https://en.wikipedia.org/wiki/Black-Scholes_model
///
/// Gamma and vega are computed from N(d1), the normal distribution function, where the
/// textbook formulas use the density phi(d1). The hedge allocations depend on these
/// exact numbers, so the deviation is kept.
pub struct BlackScholes;

/// The standardized log-moneyness `(ln(x) +/- sigma^2 tau / 2) / (sigma sqrt(tau))`.
fn d_plus_minus(log_moneyness: f64, dp: &DerivativeParameter) -> (f64, f64) {
    let sigma_exp = dp.asset_volatility * dp.time_to_expiration.sqrt();
    let half_var = 0.5 * dp.asset_volatility.powi(2) * dp.time_to_expiration;
    (
        (log_moneyness + half_var) / sigma_exp,
        (log_moneyness - half_var) / sigma_exp,
    )
}

impl BlackScholes {
    fn d1_d2(dp: &DerivativeParameter) -> (f64, f64) {
        let b = dp.discount_factor();
        d_plus_minus((dp.asset_price / (b * dp.strike_price)).ln(), dp)
    }

    pub fn gamma(dp: &DerivativeParameter) -> f64 {
        let (d1, _) = Self::d1_d2(dp);
        cdf(d1) / (dp.asset_price * dp.asset_volatility * dp.time_to_expiration.sqrt())
    }

    pub fn vega(dp: &DerivativeParameter) -> f64 {
        let (d1, _) = Self::d1_d2(dp);
        dp.asset_price * cdf(d1) * dp.time_to_expiration.sqrt() / 100.0
    }

    pub fn call_price(dp: &DerivativeParameter) -> f64 {
        let b = dp.discount_factor();
        let (d1, d2) = Self::d1_d2(dp);
        dp.asset_price * cdf(d1) - b * dp.strike_price * cdf(d2)
    }

    pub fn put_price(dp: &DerivativeParameter) -> f64 {
        let b = dp.discount_factor();
        // reflected moneyness: d1' = -d2 and d2' = -d1
        let (d1, d2) = d_plus_minus((b * dp.strike_price / dp.asset_price).ln(), dp);
        b * dp.strike_price * cdf(d1) - dp.asset_price * cdf(d2)
    }

    pub fn call_delta(dp: &DerivativeParameter) -> f64 {
        let (d1, _) = Self::d1_d2(dp);
        cdf(d1)
    }

    pub fn put_delta(dp: &DerivativeParameter) -> f64 {
        Self::call_delta(dp) - 1.0
    }
}

impl OptionPrice for BlackScholes {
    type Params = DerivativeParameter;
    type Output = PricedOption;

    fn call(dp: &DerivativeParameter) -> PricedOption {
        PricedOption {
            exercise_type: ExerciseType::Call,
            params: *dp,
            price: Self::call_price(dp),
            delta: Self::call_delta(dp),
            gamma: Self::gamma(dp),
            vega: Self::vega(dp),
        }
    }

    fn put(dp: &DerivativeParameter) -> PricedOption {
        PricedOption {
            exercise_type: ExerciseType::Put,
            params: *dp,
            price: Self::put_price(dp),
            delta: Self::put_delta(dp),
            gamma: Self::gamma(dp),
            vega: Self::vega(dp),
        }
    }
}

/// Price, delta, gamma and vega of a European option.
pub fn price_and_greeks(
    exercise_type: ExerciseType,
    asset_price: f64,
    asset_volatility: f64,
    strike_price: f64,
    time_to_expiration: f64,
    risk_free_rate: f64,
) -> Result<(f64, f64, f64, f64), PricingError> {
    let dp = DerivativeParameter::new(
        asset_price,
        asset_volatility,
        strike_price,
        time_to_expiration,
        risk_free_rate,
    )?;
    let option = PricedOption::new(exercise_type, dp);
    Ok((option.price, option.delta, option.gamma, option.vega))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const TOLERANCE: f64 = 1e-4;

    fn params(s: f64, vola: f64, k: f64, t: f64, r: f64) -> DerivativeParameter {
        DerivativeParameter::new(s, vola, k, t, r).unwrap()
    }

    #[test]
    fn normal_cdf() {
        let center_value = cdf(0.0);
        assert_eq!(center_value, 0.5);

        let sigma_top = cdf(1.0); // mu + 1 sigma
        assert_approx_eq!(sigma_top, 0.8413, 0.0001); // table value for 1.0
    }

    #[test]
    fn european_call() {
        let call = BlackScholes::call(&params(300.0, 0.15, 250.0, 1.0, 0.03));
        assert_approx_eq!(call.price, 58.8197, TOLERANCE);
        assert_approx_eq!(call.delta, 0.931950, 1e-6);

        let call = BlackScholes::call(&params(310.0, 0.25, 250.0, 3.5, 0.05));
        assert_approx_eq!(call.price, 113.4155, TOLERANCE);
    }

    #[test]
    fn european_put() {
        let put = BlackScholes::put(&params(300.0, 0.15, 250.0, 1.0, 0.03));
        assert_approx_eq!(put.price, 1.4311, TOLERANCE);
        assert_approx_eq!(put.delta, -0.068049, 1e-6);

        let put = BlackScholes::put(&params(310.0, 0.25, 250.0, 3.5, 0.05));
        assert_approx_eq!(put.price, 13.2797, TOLERANCE);
    }

    #[test]
    fn gamma_and_vega_use_the_distribution_function() {
        let call = BlackScholes::call(&params(100.0, 0.2, 100.0, 1.0, 0.05));
        // N(d1) / (S sigma sqrt(tau)) and S N(d1) sqrt(tau) / 100
        assert_approx_eq!(call.gamma, 0.031841, 1e-6);
        assert_approx_eq!(call.vega, 0.636830, 1e-6);
        assert_approx_eq!(call.gamma, call.delta / 20.0, 1e-12);
    }

    #[test]
    fn european_put_call_parity() {
        let dp = params(300.0, 0.15, 250.0, 1.0, 0.03);
        let put_call_parity = BlackScholes::call(&dp).price - BlackScholes::put(&dp).price;
        assert_approx_eq!(
            put_call_parity,
            dp.asset_price - dp.strike_price * (-dp.risk_free_rate * dp.time_to_expiration).exp(),
            1e-6
        );

        for (s, k) in [(543.0, 545.0), (543.0, 555.0), (80.0, 120.0), (120.0, 80.0)] {
            let dp = params(s, 0.53, k, 30.0 / 365.0, 0.015);
            let lhs = BlackScholes::call(&dp).price - BlackScholes::put(&dp).price;
            let rhs = s - k * (-0.015_f64 * 30.0 / 365.0).exp();
            assert_approx_eq!(lhs, rhs, 1e-6);
        }
    }

    #[test]
    fn delta_bounds() {
        for s in [10.0, 50.0, 95.0, 100.0, 105.0, 200.0, 1000.0] {
            for vola in [0.05, 0.2, 0.8] {
                let dp = params(s, vola, 100.0, 0.5, 0.02);
                let call = BlackScholes::call(&dp);
                let put = BlackScholes::put(&dp);
                assert!((0.0..=1.0).contains(&call.delta));
                assert!((-1.0..=0.0).contains(&put.delta));
            }
        }
    }

    #[test]
    fn call_price_is_monotone() {
        let mut last = 0.0;
        for s in (50..=150).step_by(5) {
            let price = BlackScholes::call_price(&params(s as f64, 0.3, 100.0, 0.5, 0.01));
            assert!(price >= last);
            last = price;
        }

        let mut last = 0.0;
        for vola in (5..=100).step_by(5) {
            let dp = params(100.0, vola as f64 / 100.0, 100.0, 0.5, 0.01);
            let price = BlackScholes::call_price(&dp);
            assert!(price >= last);
            assert!(BlackScholes::vega(&dp) >= 0.0);
            last = price;
        }
    }

    #[test]
    fn deterministic() {
        let first = price_and_greeks(ExerciseType::Call, 543.0, 0.53, 545.0, 30.0 / 365.0, 0.015);
        let second = price_and_greeks(ExerciseType::Call, 543.0, 0.53, 545.0, 30.0 / 365.0, 0.015);
        assert_eq!(first, second);
    }

    #[test]
    fn put_shares_gamma_and_vega() {
        let dp = params(543.0, 0.53, 545.0, 30.0 / 365.0, 0.015);
        let call = PricedOption::call(dp);
        let put = PricedOption::put(dp);
        assert_eq!(put.gamma, call.gamma);
        assert_eq!(put.vega, call.vega);
        assert_eq!(put.delta, call.delta - 1.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [
            (0.0, 0.53, 545.0, 0.1, "asset_price"),
            (543.0, 0.0, 545.0, 0.1, "asset_volatility"),
            (543.0, 0.53, 0.0, 0.1, "strike_price"),
            (543.0, 0.53, 545.0, 0.0, "time_to_expiration"),
        ];
        for (s, vola, k, t, expected) in cases {
            match price_and_greeks(ExerciseType::Put, s, vola, k, t, 0.015) {
                Err(PricingError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter, got {:?}", other),
            }
        }
    }

    #[test]
    fn reference_position() {
        let (price, delta, gamma, vega) =
            price_and_greeks(ExerciseType::Call, 543.0, 0.53, 545.0, 30.0 / 365.0, 0.015)
                .unwrap();
        assert_approx_eq!(price, 32.264053, 1e-5);
        assert_approx_eq!(delta, 0.523879, 1e-6);
        assert_approx_eq!(gamma, 0.006350, 1e-6);
        assert_approx_eq!(vega, 0.815539, 1e-6);
    }
}
