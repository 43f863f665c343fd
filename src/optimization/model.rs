use crate::core::arith;
use crate::core::error::{NumericalFailure, SolverError};
use crate::core::orders::{OrderLeg, OrderState};
use crate::core::pool::PoolState;
use crate::core::weights::PriorityWeights;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// A single named row: `sum(coefficients[i] * x[i]) {<=, >=, =} rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: &'static str,
    pub coefficients: Vec<Decimal>,
    pub sense: ConstraintSense,
    pub rhs: Decimal,
}

impl Constraint {
    pub fn leq(name: &'static str, coefficients: Vec<Decimal>, rhs: Decimal) -> Self {
        Self {
            name,
            coefficients,
            sense: ConstraintSense::LessEqual,
            rhs,
        }
    }

    pub fn geq(name: &'static str, coefficients: Vec<Decimal>, rhs: Decimal) -> Self {
        Self {
            name,
            coefficients,
            sense: ConstraintSense::GreaterEqual,
            rhs,
        }
    }

    pub fn eq(name: &'static str, coefficients: Vec<Decimal>, rhs: Decimal) -> Self {
        Self {
            name,
            coefficients,
            sense: ConstraintSense::Equal,
            rhs,
        }
    }

    /// Left-hand side evaluated at `values`.
    pub fn evaluate(&self, values: &[Decimal]) -> Result<Decimal, NumericalFailure> {
        arith::dot(&self.coefficients, values)
    }
}

/// Bounds on a continuous variable. The lower bound is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableBounds {
    pub lower: Decimal,
    /// `None` = +infinity.
    pub upper: Option<Decimal>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Decimal::ZERO,
            upper: None,
        }
    }
}

impl VariableBounds {
    pub fn bounded(lower: Decimal, upper: Decimal) -> Self {
        Self {
            lower,
            upper: Some(upper),
        }
    }
}

/// A continuous linear program: maximize `objective · x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearProgram {
    pub objective: Vec<Decimal>,
    pub bounds: Vec<VariableBounds>,
    pub constraints: Vec<Constraint>,
}

impl LinearProgram {
    /// `num_vars` non-negative, unbounded variables with zero objective.
    pub fn new(num_vars: usize) -> Self {
        Self {
            objective: vec![Decimal::ZERO; num_vars],
            bounds: vec![VariableBounds::default(); num_vars],
            constraints: Vec::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// `constant + coefficients · x` over the four order legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineExpr {
    pub constant: Decimal,
    pub coefficients: [Decimal; 4],
}

impl AffineExpr {
    pub fn constant(value: Decimal) -> Self {
        Self {
            constant: value,
            coefficients: [Decimal::ZERO; 4],
        }
    }

    /// `value + sum(sign(leg) * leg)`.
    pub fn flow(value: Decimal, legs: &[(OrderLeg, Decimal)]) -> Self {
        let mut expr = Self::constant(value);
        for (leg, sign) in legs {
            expr.coefficients[leg.index()] += *sign;
        }
        expr
    }

    pub fn minus(self, other: Self) -> Result<Self, NumericalFailure> {
        let mut coefficients = self.coefficients;
        for (c, o) in coefficients.iter_mut().zip(other.coefficients) {
            *c = arith::sub(*c, o)?;
        }
        Ok(Self {
            constant: arith::sub(self.constant, other.constant)?,
            coefficients,
        })
    }

    pub fn scale(self, factor: Decimal) -> Result<Self, NumericalFailure> {
        let mut coefficients = self.coefficients;
        for c in coefficients.iter_mut() {
            *c = arith::mul(*c, factor)?;
        }
        Ok(Self {
            constant: arith::mul(self.constant, factor)?,
            coefficients,
        })
    }

    /// `self >= 0` as a row.
    pub fn non_negative(self, name: &'static str) -> Constraint {
        Constraint::geq(name, self.coefficients.to_vec(), -self.constant)
    }

    /// `self <= 0` as a row.
    pub fn non_positive(self, name: &'static str) -> Constraint {
        Constraint::leq(name, self.coefficients.to_vec(), -self.constant)
    }

    pub fn evaluate(&self, values: &[Decimal; 4]) -> Result<Decimal, NumericalFailure> {
        arith::add(self.constant, arith::dot(&self.coefficients, values)?)
    }
}

/// Post-execution quantities as affine functions of the fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostExecution {
    pub reserve: AffineExpr,
    pub pool_value: AffineExpr,
    pub senior_asset: AffineExpr,
    pub junior_asset: AffineExpr,
}

impl PostExecution {
    pub fn derive(state: &PoolState) -> Result<Self, NumericalFailure> {
        let minus = -Decimal::ONE;
        let cash_flow = [
            (OrderLeg::SeniorRedeem, minus),
            (OrderLeg::JuniorRedeem, minus),
            (OrderLeg::JuniorInvest, Decimal::ONE),
            (OrderLeg::SeniorInvest, Decimal::ONE),
        ];

        let reserve = AffineExpr::flow(state.reserve, &cash_flow);
        let pool_value = AffineExpr::flow(state.pool_value()?, &cash_flow);
        let senior_asset = AffineExpr::flow(
            state.senior_asset_value,
            &[
                (OrderLeg::SeniorRedeem, minus),
                (OrderLeg::SeniorInvest, Decimal::ONE),
            ],
        );
        let junior_asset = pool_value.minus(senior_asset)?;

        Ok(Self {
            reserve,
            pool_value,
            senior_asset,
            junior_asset,
        })
    }
}

/// The LP for one pool's epoch, together with the inputs it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochModel {
    pub program: LinearProgram,
    pub state: PoolState,
    pub orders: OrderState,
    pub weights: PriorityWeights,
}

impl EpochModel {
    /// Validate the inputs and build the four-variable program.
    ///
    /// Variables follow [`OrderLeg::index`]. Rows:
    ///
    /// - `min_reserve`: `reserveAfter >= 0`
    /// - `max_reserve`: `reserveAfter <= maxReserve`
    /// - `min_junior_ratio`: `juniorAfter - minRatio * poolAfter >= 0`
    /// - `max_junior_ratio`: `juniorAfter - maxRatio * poolAfter <= 0`
    ///
    /// Malformed inputs fail with [`SolverError::InvalidInput`]; a row whose
    /// coefficients leave the decimal range fails with
    /// [`SolverError::Numerical`].
    pub fn build(
        state: &PoolState,
        orders: &OrderState,
        weights: &PriorityWeights,
    ) -> Result<Self, SolverError> {
        state.validate()?;
        orders.validate()?;
        weights.validate(orders)?;

        let after = PostExecution::derive(state)?;
        let mut program = LinearProgram::new(OrderLeg::ALL.len());
        for leg in OrderLeg::ALL {
            program.objective[leg.index()] = weights.weight(leg);
            program.bounds[leg.index()] =
                VariableBounds::bounded(Decimal::ZERO, orders.requested(leg));
        }

        let min_junior = after
            .junior_asset
            .minus(after.pool_value.scale(state.min_junior_ratio)?)?;
        let max_junior = after
            .junior_asset
            .minus(after.pool_value.scale(state.max_junior_ratio)?)?;
        let max_reserve = after
            .reserve
            .minus(AffineExpr::constant(state.max_reserve))?;

        let program = program
            .with_constraint(after.reserve.non_negative("min_reserve"))
            .with_constraint(max_reserve.non_positive("max_reserve"))
            .with_constraint(min_junior.non_negative("min_junior_ratio"))
            .with_constraint(max_junior.non_positive("max_junior_ratio"));

        log::debug!(
            "built epoch model: {} variables, {} constraints",
            program.num_vars(),
            program.constraints.len()
        );

        Ok(Self {
            program,
            state: *state,
            orders: *orders,
            weights: *weights,
        })
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = |coefficients: &[Decimal]| -> String {
            coefficients
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_zero())
                .map(|(i, c)| format!("{} x{}", c.normalize(), i))
                .collect::<Vec<_>>()
                .join(" + ")
        };
        writeln!(f, "max: {}", terms(&self.objective))?;
        for row in &self.constraints {
            let op = match row.sense {
                ConstraintSense::LessEqual => "<=",
                ConstraintSense::GreaterEqual => ">=",
                ConstraintSense::Equal => "=",
            };
            writeln!(
                f,
                "  {}: {} {} {}",
                row.name,
                terms(&row.coefficients),
                op,
                row.rhs.normalize()
            )?;
        }
        for (i, b) in self.bounds.iter().enumerate() {
            match b.upper {
                Some(upper) => writeln!(f, "  {} <= x{} <= {}", b.lower, i, upper)?,
                None => writeln!(f, "  x{} >= {}", i, b.lower)?,
            }
        }
        Ok(())
    }
}
