//! Gamma and vega neutral hedges of a European option position, completed with a delta
//! hedge in the underlying.

pub mod allocation;
pub mod error;
pub mod linalg;
mod report;
pub mod solver;

pub use allocation::{compute_hedge, AllocationConfig, HedgeParameters, HedgeResult};
pub use error::HedgeError;
pub use solver::{sensitivity_matrix, Conditioning, HedgeSolver};
