//! # epoch-solver
//!
//! Deterministic epoch order-execution solver for two-tranche pools.
//!
//! Given a pool's balance sheet at epoch close and the pending senior/junior
//! redeem and invest orders, the solver computes how much of each order to
//! execute. Legs are filled in strict priority order (senior redeem, junior
//! redeem, junior invest, senior invest) subject to reserve and junior-ratio
//! constraints, and the epoch is classified as feasible or infeasible.
//!
//! ## Architecture
//!
//! - **core**: Pool state, orders, priority weights, execution checks, errors
//! - **optimization**: LP model builder, simplex engine, priority staging,
//!   result interpreter
//! - **simulation**: Random epoch generation for stress testing

pub mod core;
pub mod optimization;
pub mod simulation;

pub use crate::optimization::epoch::solve;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::error::{InputError, NumericalFailure, SolverError};
    pub use crate::core::execution::{check_execution, ConstraintViolation, ExecutionSnapshot};
    pub use crate::core::orders::{Fulfillment, OrderLeg, OrderState};
    pub use crate::core::pool::PoolState;
    pub use crate::core::request::EpochRequest;
    pub use crate::core::weights::PriorityWeights;
    pub use crate::optimization::config::SolverConfig;
    pub use crate::optimization::epoch::{solve, EpochSolver};
    pub use crate::optimization::interpreter::SolverResult;
    pub use crate::optimization::lexicographic::Lexicographic;
}
