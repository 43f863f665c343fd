//! Random epoch generation for stress testing and benchmarks.
//!
//! Every generated request passes input validation. Whether it is feasible
//! depends on the draw.

use crate::core::orders::OrderState;
use crate::core::pool::PoolState;
use crate::core::request::EpochRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Shape of the generated pools and orders.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Smallest net asset value.
    pub min_nav: u64,
    /// Largest net asset value.
    pub max_nav: u64,
    /// Largest requested amount per order leg.
    pub max_order: u64,
    /// Fixed seed for reproducible draws; `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            min_nav: 1_000,
            max_nav: 10_000_000,
            max_order: 1_000_000,
            seed: None,
        }
    }
}

/// Generate one random, valid epoch request.
pub fn generate_random_epoch(config: &ScenarioConfig) -> EpochRequest {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    random_epoch(&mut rng, config)
}

/// Generate `count` requests from one random stream.
pub fn generate_random_epochs(config: &ScenarioConfig, count: usize) -> Vec<EpochRequest> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..count).map(|_| random_epoch(&mut rng, config)).collect()
}

fn random_epoch<R: Rng>(rng: &mut R, config: &ScenarioConfig) -> EpochRequest {
    let max_nav = config.max_nav.max(config.min_nav);
    let nav = rng.gen_range(config.min_nav..=max_nav);
    let reserve = rng.gen_range(0..=nav);
    let senior = rng.gen_range(0..=nav);

    // Ratio bounds in whole percent.
    let min_pct = rng.gen_range(0..=50u32);
    let max_pct = rng.gen_range(min_pct..=100u32);
    let max_reserve = reserve + rng.gen_range(0..=nav);

    let state = PoolState {
        net_asset_value: Decimal::from(nav),
        reserve: Decimal::from(reserve),
        senior_asset_value: Decimal::from(senior),
        min_junior_ratio: Decimal::new(min_pct.into(), 2),
        max_junior_ratio: Decimal::new(max_pct.into(), 2),
        max_reserve: Decimal::from(max_reserve),
    };

    let mut order = || Decimal::from(rng.gen_range(0..=config.max_order));
    let orders = OrderState {
        junior_redeem: order(),
        senior_redeem: order(),
        junior_invest: order(),
        senior_invest: order(),
    };

    EpochRequest::new(state, orders)
}
