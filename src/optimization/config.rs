use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Numerical policy of the epoch solver.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Reduced-cost threshold for an improving simplex column.
    pub optimality_tolerance: Decimal,
    /// Smallest column entry the simplex will pivot on.
    pub pivot_tolerance: Decimal,
    /// Largest constraint breach (in currency units) a reported solution may
    /// carry before it is rejected as a numerical failure.
    pub feasibility_tolerance: Decimal,
    /// Pivot cap per simplex phase.
    pub max_iterations: usize,
    /// Decimal places of reported fulfillment amounts. Rounding is toward
    /// zero.
    pub output_scale: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            optimality_tolerance: dec!(0.000000001),
            pivot_tolerance: dec!(0.000000000001),
            feasibility_tolerance: dec!(0.000001),
            max_iterations: 1000,
            output_scale: 18,
        }
    }
}
