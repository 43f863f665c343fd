use crate::core::error::SolverError;
use crate::core::orders::OrderState;
use crate::core::pool::PoolState;
use crate::core::request::EpochRequest;
use crate::core::weights::PriorityWeights;
use crate::optimization::config::SolverConfig;
use crate::optimization::engine::LpSolver;
use crate::optimization::interpreter::{interpret, SolverResult};
use crate::optimization::lexicographic::Lexicographic;
use crate::optimization::model::EpochModel;
use crate::optimization::simplex::DenseSimplex;

/// Computes how much of each pending order an epoch can execute.
///
/// Holds no state between calls; one instance can serve any number of pools,
/// from any number of threads. The default engine runs the bundled simplex
/// once per priority level, so a higher-priority leg is filled as far as the
/// constraints allow before any lower leg is considered.
///
/// # Examples
///
/// ```
/// use epoch_solver::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let state = PoolState {
///     net_asset_value: dec!(800),
///     reserve: dec!(200),
///     senior_asset_value: dec!(800),
///     min_junior_ratio: dec!(0),
///     max_junior_ratio: dec!(1),
///     max_reserve: dec!(500),
/// };
/// let orders = OrderState::new(dec!(0), dec!(50), dec!(200), dec!(200));
/// let weights = PriorityWeights::for_orders(&orders).unwrap();
///
/// let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();
/// assert!(result.feasible);
/// assert!((result.fulfillment.junior_invest - dec!(200)).abs() < dec!(0.000001));
/// ```
#[derive(Debug, Clone)]
pub struct EpochSolver<S = Lexicographic<DenseSimplex>> {
    engine: S,
    config: SolverConfig,
}

impl EpochSolver<Lexicographic<DenseSimplex>> {
    /// Solver backed by the bundled staged simplex, tuned by `config`.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            engine: Lexicographic::new(DenseSimplex::from_config(&config)),
            config,
        }
    }
}

impl Default for EpochSolver<Lexicographic<DenseSimplex>> {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl<S: LpSolver> EpochSolver<S> {
    /// Solver backed by a custom LP engine.
    pub fn with_engine(engine: S, config: SolverConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Validate, build the LP, solve it and interpret the outcome.
    ///
    /// Infeasibility is returned as `Ok` with `feasible == false`. Errors are
    /// either invalid input (fix the caller) or a numerical failure (fix the
    /// model); retrying with the same input reproduces the same error.
    ///
    /// Executing nothing is not automatically feasible. With all-zero orders
    /// the result is feasible only when the current balance sheet already
    /// satisfies the reserve and junior ratio constraints; a pool that
    /// already breaches one of them reports `feasible == false`.
    pub fn solve(
        &self,
        state: &PoolState,
        orders: &OrderState,
        weights: &PriorityWeights,
    ) -> Result<SolverResult, SolverError> {
        let model = match EpochModel::build(state, orders, weights) {
            Ok(model) => model,
            Err(err @ SolverError::InvalidInput(_)) => {
                log::warn!("rejected epoch input: {}", err);
                return Err(err);
            }
            Err(err) => {
                log::error!("epoch model could not be built: {}", err);
                return Err(err);
            }
        };

        let outcome = self.engine.solve(&model.program);
        log::debug!("{} returned {}", self.engine.name(), outcome.status());

        match interpret(outcome, &model, &self.config) {
            Ok(result) => {
                if result.feasible {
                    log::info!(
                        "epoch feasible, objective {} (sR {}, jR {}, jI {}, sI {})",
                        result.objective_value,
                        result.fulfillment.senior_redeem,
                        result.fulfillment.junior_redeem,
                        result.fulfillment.junior_invest,
                        result.fulfillment.senior_invest
                    );
                } else {
                    log::info!("epoch infeasible, no orders executed");
                }
                Ok(result)
            }
            Err(err) => {
                log::error!("epoch solve failed: {}", err);
                Err(err)
            }
        }
    }

    /// Solve a wire request, deriving weights when none are supplied.
    pub fn solve_request(&self, request: &EpochRequest) -> Result<SolverResult, SolverError> {
        let weights = request.resolve_weights().map_err(|err| {
            log::warn!("rejected epoch input: {}", err);
            SolverError::from(err)
        })?;
        self.solve(&request.state, &request.orders, &weights)
    }
}

/// Solve with the default configuration and the bundled staged simplex.
pub fn solve(
    state: &PoolState,
    orders: &OrderState,
    weights: &PriorityWeights,
) -> Result<SolverResult, SolverError> {
    EpochSolver::default().solve(state, orders, weights)
}
