//! Closed-form prices and greeks for European options.

pub mod analytic;
pub mod common;
pub mod error;

pub use analytic::black_scholes::{price_and_greeks, BlackScholes, OptionPrice};
pub use common::models::{DerivativeParameter, ExerciseType, Greek, PricedOption};
pub use error::PricingError;
