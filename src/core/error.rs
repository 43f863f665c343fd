use crate::core::orders::OrderLeg;
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed solver input. Raised before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} must lie in [0, 1], got {value}")]
    RatioOutOfRange { field: &'static str, value: Decimal },

    #[error("minJuniorRatio {min} exceeds maxJuniorRatio {max}")]
    InvertedRatioBounds { min: Decimal, max: Decimal },

    #[error("reserve {reserve} exceeds netAssetValue {nav}")]
    ReserveExceedsNav { reserve: Decimal, nav: Decimal },

    #[error("seniorAssetValue {senior} exceeds netAssetValue {nav}")]
    SeniorAssetExceedsNav { senior: Decimal, nav: Decimal },

    #[error("netAssetValue {nav} plus reserve {reserve} overflows the decimal range")]
    PoolValueOverflow { nav: Decimal, reserve: Decimal },

    #[error("weight for {leg} must be positive, got {weight}")]
    NonPositiveWeight { leg: OrderLeg, weight: Decimal },

    #[error("weight for {higher} ({higher_weight}) must exceed weight for {lower} ({lower_weight})")]
    PriorityOrder {
        higher: OrderLeg,
        higher_weight: Decimal,
        lower: OrderLeg,
        lower_weight: Decimal,
    },

    #[error("weight for {leg} is {weight}, must exceed {required} to dominate lower-priority legs")]
    WeightGap {
        leg: OrderLeg,
        weight: Decimal,
        required: Decimal,
    },

    #[error("orders up to {max_order} are too large to derive priority weights")]
    WeightOverflow { max_order: Decimal },
}

/// Reason the solver engine could not produce a trustworthy answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericalFailure {
    #[error("decimal arithmetic overflowed")]
    Overflow,

    #[error("simplex did not converge within {limit} iterations")]
    IterationLimit { limit: usize },

    #[error("solver reported an unbounded objective on a bounded model")]
    Unbounded,

    #[error("solution violates {constraint} by {excess}")]
    ConstraintViolated {
        constraint: &'static str,
        excess: Decimal,
    },

    #[error("solver returned {actual} values for {expected} variables")]
    MalformedAssignment { expected: usize, actual: usize },

    #[error("priority stage {stage} became infeasible after pinning higher stages")]
    LostFeasibility { stage: usize },
}

/// Errors surfaced by [`crate::optimization::epoch::EpochSolver`].
///
/// Infeasibility is not an error; it is reported through
/// [`crate::optimization::interpreter::SolverResult::feasible`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("numerical failure: {0}")]
    Numerical(#[from] NumericalFailure),
}
