use std::fmt;

use crate::allocation::HedgeResult;

impl fmt::Display for HedgeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Theoretical initial portfolio value: {}", self.held_value)?;
        writeln!(f, "Initial portfolio greeks:")?;
        writeln!(f, "  Delta: {}", self.held_delta)?;
        writeln!(f, "  Gamma: {}", self.held_gamma)?;
        writeln!(f, "  Vega: {}", self.held_vega)?;
        writeln!(f, "Final asset allocation:")?;
        writeln!(f, "  held option: {}", self.held_count)?;
        writeln!(f, "  hedge option 1: {}", self.hedge1_count)?;
        writeln!(f, "  hedge option 2: {}", self.hedge2_count)?;
        write!(f, "  underlying asset: {}", self.underlying_count)
    }
}
