use pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HedgeError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("singular sensitivity matrix (pivot {pivot:e} within tolerance {tolerance:e})")]
    SingularMatrix { pivot: f64, tolerance: f64 },
    #[error("ill-conditioned sensitivity matrix (condition number {condition_number:e} exceeds {max:e})")]
    IllConditioned { condition_number: f64, max: f64 },
    #[error("hedge position {value:e} is not a whole number of contracts")]
    PositionOutOfRange { value: f64 },
    #[error("cannot solve a {rows}x{cols} system for hedge weights")]
    DimensionMismatch { rows: usize, cols: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl HedgeError {
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            HedgeError::SingularMatrix { .. } | HedgeError::IllConditioned { .. }
        )
    }
}
