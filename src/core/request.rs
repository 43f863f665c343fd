use crate::core::error::InputError;
use crate::core::orders::OrderState;
use crate::core::pool::PoolState;
use crate::core::weights::PriorityWeights;
use serde::{Deserialize, Serialize};

/// Wire shape of a solve request: `{state, orders, weights?}`.
///
/// When `weights` is omitted the solver derives a sufficient set with
/// [`PriorityWeights::for_orders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRequest {
    pub state: PoolState,
    pub orders: OrderState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<PriorityWeights>,
}

impl EpochRequest {
    pub fn new(state: PoolState, orders: OrderState) -> Self {
        Self {
            state,
            orders,
            weights: None,
        }
    }

    pub fn with_weights(mut self, weights: PriorityWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Explicit weights if given, otherwise weights derived from the orders.
    pub fn resolve_weights(&self) -> Result<PriorityWeights, InputError> {
        match self.weights {
            Some(weights) => Ok(weights),
            None => PriorityWeights::for_orders(&self.orders),
        }
    }
}
