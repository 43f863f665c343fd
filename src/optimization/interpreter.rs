use crate::core::arith;
use crate::core::error::{NumericalFailure, SolverError};
use crate::core::execution::{check_execution, ExecutionSnapshot};
use crate::core::orders::{Fulfillment, OrderLeg};
use crate::core::pool::PoolState;
use crate::optimization::config::SolverConfig;
use crate::optimization::engine::LpOutcome;
use crate::optimization::model::EpochModel;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one epoch solve.
///
/// Serializes to the wire response `{feasible, objectiveValue, fulfillment}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverResult {
    pub feasible: bool,
    /// Weighted sum of the fulfilled amounts; zero when infeasible.
    pub objective_value: Decimal,
    /// Executed amounts; all zero when infeasible.
    pub fulfillment: Fulfillment,
}

impl SolverResult {
    /// No allocation satisfies the constraints.
    pub fn infeasible() -> Self {
        Self {
            feasible: false,
            objective_value: Decimal::ZERO,
            fulfillment: Fulfillment::zero(),
        }
    }

    /// Balance sheet after executing this result against `state`.
    pub fn snapshot(&self, state: &PoolState) -> Result<ExecutionSnapshot, NumericalFailure> {
        ExecutionSnapshot::project(state, &self.fulfillment)
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Epoch Solution ===")?;
        writeln!(f, "Feasible:       {}", self.feasible)?;
        writeln!(f, "Objective:      {}", self.objective_value)?;
        writeln!(f, "Fulfillment:")?;
        write!(f, "{}", self.fulfillment)
    }
}

/// Map a raw engine outcome back into domain terms.
///
/// Optimal values are clamped into `[0, requested]`, rounded toward zero to
/// `output_scale` places and re-checked against every constraint. Infeasible
/// becomes a normal [`SolverResult::infeasible`]. Anything else, including an
/// assignment whose length does not match the model, is a
/// [`SolverError::Numerical`].
pub fn interpret(
    outcome: LpOutcome,
    model: &EpochModel,
    config: &SolverConfig,
) -> Result<SolverResult, SolverError> {
    let values = match outcome {
        LpOutcome::Optimal { values, .. } => values,
        LpOutcome::Infeasible => return Ok(SolverResult::infeasible()),
        LpOutcome::Unbounded => return Err(NumericalFailure::Unbounded.into()),
        LpOutcome::NumericalFailure(failure) => return Err(failure.into()),
    };

    let expected = model.program.num_vars();
    if values.len() != expected {
        return Err(NumericalFailure::MalformedAssignment {
            expected,
            actual: values.len(),
        }
        .into());
    }

    let mut legs = [Decimal::ZERO; 4];
    for leg in OrderLeg::ALL {
        let raw = values[leg.index()];
        let amount = clamp_amount(raw, model.orders.requested(leg), config.output_scale);
        if amount != raw {
            log::trace!("{} adjusted from {} to {}", leg, raw, amount);
        }
        legs[leg.index()] = amount;
    }
    let fulfillment = Fulfillment::from_legs(legs);

    let objective_value = arith::dot(&model.weights.as_vector(), &legs)?;

    let violations = check_execution(
        &model.state,
        &model.orders,
        &fulfillment,
        config.feasibility_tolerance,
    )?;
    if let Some(violation) = violations.first() {
        return Err(NumericalFailure::ConstraintViolated {
            constraint: violation.constraint(),
            excess: violation.magnitude(),
        }
        .into());
    }

    Ok(SolverResult {
        feasible: true,
        objective_value: objective_value.normalize(),
        fulfillment,
    })
}

/// Clamp into `[0, requested]`, round toward zero, drop trailing zeros.
fn clamp_amount(raw: Decimal, requested: Decimal, scale: u32) -> Decimal {
    if raw <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    raw.min(requested)
        .round_dp_with_strategy(scale, RoundingStrategy::ToZero)
        .normalize()
}
