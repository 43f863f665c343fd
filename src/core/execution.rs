use crate::core::arith;
use crate::core::error::NumericalFailure;
use crate::core::orders::{Fulfillment, OrderLeg, OrderState};
use crate::core::pool::{junior_ratio, PoolState};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balance sheet after an epoch executes a fulfillment vector.
///
/// Mirrors what the on-chain epoch coordinator recomputes before it accepts
/// a submitted solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSnapshot {
    pub reserve: Decimal,
    pub pool_value: Decimal,
    pub senior_asset_value: Decimal,
    pub junior_asset_value: Decimal,
    /// `None` when the pool value after execution is zero.
    pub junior_ratio: Option<Decimal>,
}

impl ExecutionSnapshot {
    /// Fails with [`NumericalFailure::Overflow`] when any balance leaves the
    /// decimal range.
    pub fn project(state: &PoolState, fulfillment: &Fulfillment) -> Result<Self, NumericalFailure> {
        let net_flow = arith::sub(fulfillment.total_invested()?, fulfillment.total_redeemed()?)?;
        let reserve = arith::add(state.reserve, net_flow)?;
        let pool_value = arith::add(state.pool_value()?, net_flow)?;
        let senior_asset_value = arith::add(
            arith::sub(state.senior_asset_value, fulfillment.senior_redeem)?,
            fulfillment.senior_invest,
        )?;
        let junior_asset_value = arith::sub(pool_value, senior_asset_value)?;

        Ok(Self {
            reserve,
            pool_value,
            senior_asset_value,
            junior_asset_value,
            junior_ratio: junior_ratio(junior_asset_value, pool_value),
        })
    }
}

impl fmt::Display for ExecutionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== After Execution ===")?;
        writeln!(f, "Reserve:        {}", self.reserve)?;
        writeln!(f, "Pool Value:     {}", self.pool_value)?;
        writeln!(f, "Senior Asset:   {}", self.senior_asset_value)?;
        writeln!(f, "Junior Asset:   {}", self.junior_asset_value)?;
        match self.junior_ratio {
            Some(ratio) => writeln!(f, "Junior Ratio:   {}", ratio.round_dp(6)),
            None => writeln!(f, "Junior Ratio:   n/a (empty pool)"),
        }
    }
}

/// A single constraint a fulfillment vector breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConstraintViolation {
    /// Executed amount outside `[0, requested]`.
    LegOutOfBounds {
        leg: OrderLeg,
        amount: Decimal,
        requested: Decimal,
    },
    ReserveBelowZero { reserve: Decimal },
    ReserveAboveMax { reserve: Decimal, max_reserve: Decimal },
    /// Junior asset value short of `minJuniorRatio * poolValue`.
    JuniorRatioBelowMin { shortfall: Decimal },
    /// Junior asset value over `maxJuniorRatio * poolValue`.
    JuniorRatioAboveMax { excess: Decimal },
}

impl ConstraintViolation {
    /// Name of the breached constraint, matching the LP row names.
    pub fn constraint(&self) -> &'static str {
        match self {
            ConstraintViolation::LegOutOfBounds { .. } => "order_bounds",
            ConstraintViolation::ReserveBelowZero { .. } => "min_reserve",
            ConstraintViolation::ReserveAboveMax { .. } => "max_reserve",
            ConstraintViolation::JuniorRatioBelowMin { .. } => "min_junior_ratio",
            ConstraintViolation::JuniorRatioAboveMax { .. } => "max_junior_ratio",
        }
    }

    /// How far past the limit the fulfillment went.
    pub fn magnitude(&self) -> Decimal {
        match self {
            ConstraintViolation::LegOutOfBounds {
                amount, requested, ..
            } => {
                if *amount < Decimal::ZERO {
                    -*amount
                } else {
                    amount.saturating_sub(*requested)
                }
            }
            ConstraintViolation::ReserveBelowZero { reserve } => -*reserve,
            ConstraintViolation::ReserveAboveMax {
                reserve,
                max_reserve,
            } => reserve.saturating_sub(*max_reserve),
            ConstraintViolation::JuniorRatioBelowMin { shortfall } => *shortfall,
            ConstraintViolation::JuniorRatioAboveMax { excess } => *excess,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::LegOutOfBounds {
                leg,
                amount,
                requested,
            } => write!(f, "{} executes {} of {} requested", leg, amount, requested),
            ConstraintViolation::ReserveBelowZero { reserve } => {
                write!(f, "reserve after execution is negative ({})", reserve)
            }
            ConstraintViolation::ReserveAboveMax {
                reserve,
                max_reserve,
            } => write!(f, "reserve {} exceeds max reserve {}", reserve, max_reserve),
            ConstraintViolation::JuniorRatioBelowMin { shortfall } => {
                write!(f, "junior asset value {} short of min ratio", shortfall)
            }
            ConstraintViolation::JuniorRatioAboveMax { excess } => {
                write!(f, "junior asset value {} over max ratio", excess)
            }
        }
    }
}

/// List every constraint `fulfillment` breaks by more than `tolerance`.
///
/// Ratio constraints are checked in multiplied-out form
/// (`junior >= min * pool`), so an empty pool needs no special case.
/// Balances that overflow the decimal range are reported as
/// [`NumericalFailure::Overflow`] rather than as a violation.
pub fn check_execution(
    state: &PoolState,
    orders: &OrderState,
    fulfillment: &Fulfillment,
    tolerance: Decimal,
) -> Result<Vec<ConstraintViolation>, NumericalFailure> {
    let mut violations = Vec::new();

    for leg in OrderLeg::ALL {
        let amount = fulfillment.amount(leg);
        let requested = orders.requested(leg);
        if amount < -tolerance || arith::sub(amount, requested)? > tolerance {
            violations.push(ConstraintViolation::LegOutOfBounds {
                leg,
                amount,
                requested,
            });
        }
    }

    let after = ExecutionSnapshot::project(state, fulfillment)?;
    if after.reserve < -tolerance {
        violations.push(ConstraintViolation::ReserveBelowZero {
            reserve: after.reserve,
        });
    }
    if arith::sub(after.reserve, state.max_reserve)? > tolerance {
        violations.push(ConstraintViolation::ReserveAboveMax {
            reserve: after.reserve,
            max_reserve: state.max_reserve,
        });
    }

    let shortfall = arith::sub(
        arith::mul(state.min_junior_ratio, after.pool_value)?,
        after.junior_asset_value,
    )?;
    if shortfall > tolerance {
        violations.push(ConstraintViolation::JuniorRatioBelowMin { shortfall });
    }
    let excess = arith::sub(
        after.junior_asset_value,
        arith::mul(state.max_junior_ratio, after.pool_value)?,
    )?;
    if excess > tolerance {
        violations.push(ConstraintViolation::JuniorRatioAboveMax { excess });
    }

    Ok(violations)
}
