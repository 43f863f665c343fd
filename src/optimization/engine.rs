use crate::core::error::NumericalFailure;
use crate::optimization::model::LinearProgram;
use rust_decimal::Decimal;

/// Terminal status of one LP solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LpOutcome {
    /// An optimal vertex and its objective value.
    Optimal {
        values: Vec<Decimal>,
        objective: Decimal,
    },
    /// No assignment satisfies every row and bound.
    Infeasible,
    /// The objective grows without limit.
    Unbounded,
    /// The engine could not finish reliably.
    NumericalFailure(NumericalFailure),
}

impl LpOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            LpOutcome::Optimal { .. } => "optimal",
            LpOutcome::Infeasible => "infeasible",
            LpOutcome::Unbounded => "unbounded",
            LpOutcome::NumericalFailure(_) => "numerical-failure",
        }
    }
}

/// A continuous linear-program solver.
///
/// The epoch solver only depends on this trait, so the bundled
/// [`crate::optimization::simplex::DenseSimplex`] can be swapped for any
/// other backend. Implementations must be deterministic: identical programs
/// must yield identical outcomes.
pub trait LpSolver: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Maximize `program.objective · x` subject to its rows and bounds.
    fn solve(&self, program: &LinearProgram) -> LpOutcome;
}
