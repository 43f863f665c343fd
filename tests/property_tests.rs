use epoch_solver::core::execution::check_execution;
use epoch_solver::core::orders::{Fulfillment, OrderLeg, OrderState};
use epoch_solver::core::pool::PoolState;
use epoch_solver::core::weights::PriorityWeights;
use epoch_solver::optimization::epoch::EpochSolver;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance for comparing solver output against closed-form answers.
fn eps() -> Decimal {
    dec!(0.000001)
}

/// Generate a random valid pool (NAV 1 to 1,000,000, ratios in whole percent).
fn arb_pool() -> impl Strategy<Value = PoolState> {
    (1u64..1_000_000u64)
        .prop_flat_map(|nav| {
            (
                Just(nav),
                0..=nav,
                0..=nav,
                0u32..=50u32,
                0u32..=50u32,
                0..=nav,
            )
        })
        .prop_map(|(nav, reserve, senior, min_pct, spread_pct, headroom)| PoolState {
            net_asset_value: Decimal::from(nav),
            reserve: Decimal::from(reserve),
            senior_asset_value: Decimal::from(senior),
            min_junior_ratio: Decimal::new(min_pct.into(), 2),
            max_junior_ratio: Decimal::new((min_pct + spread_pct).into(), 2),
            max_reserve: Decimal::from(reserve + headroom),
        })
}

/// Generate a random order book (each leg 0 to 100,000).
fn arb_orders() -> impl Strategy<Value = OrderState> {
    let amount = || (0u64..=100_000u64).prop_map(Decimal::from);
    (amount(), amount(), amount(), amount())
        .prop_map(|(jr, sr, ji, si)| OrderState::new(jr, sr, ji, si))
}

/// Fulfillment `a` is at least `b` in priority order: the first leg where
/// they differ by more than `eps()` is larger in `a`.
fn lexicographically_at_least(a: &Fulfillment, b: &Fulfillment) -> bool {
    for leg in OrderLeg::ALL {
        let (x, y) = (a.amount(leg), b.amount(leg));
        if x > y + eps() {
            return true;
        }
        if x < y - eps() {
            return false;
        }
    }
    true
}

/// Pool with wide-open ratio bounds, so only the reserve limits execution.
fn open_pool(reserve: Decimal, max_reserve: Decimal) -> PoolState {
    PoolState {
        net_asset_value: dec!(1000),
        reserve,
        senior_asset_value: dec!(500),
        min_junior_ratio: Decimal::ZERO,
        max_junior_ratio: Decimal::ONE,
        max_reserve,
    }
}

proptest! {
    // ===================================================================
    // INVARIANT 1: A feasible result satisfies every constraint.
    //
    // Each executed amount lies in [0, requested] and the projected
    // balance sheet respects the reserve and junior ratio bounds.
    // ===================================================================
    #[test]
    fn feasible_results_satisfy_constraints(state in arb_pool(), orders in arb_orders()) {
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();
        if result.feasible {
            let violations = check_execution(&state, &orders, &result.fulfillment, eps()).unwrap();
            prop_assert!(violations.is_empty(), "violations: {:?}", violations);
            for leg in OrderLeg::ALL {
                let amount = result.fulfillment.amount(leg);
                prop_assert!(amount >= Decimal::ZERO && amount <= orders.requested(leg));
            }
        }
    }

    // ===================================================================
    // INVARIANT 2: Infeasible means nothing executes.
    //
    // An infeasible epoch reports an all-zero fulfillment and a zero
    // objective. Never a partial allocation.
    // ===================================================================
    #[test]
    fn infeasible_results_are_zero(state in arb_pool(), orders in arb_orders()) {
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();
        if !result.feasible {
            prop_assert!(result.fulfillment.is_zero());
            prop_assert_eq!(result.objective_value, Decimal::ZERO);
        }
    }

    // ===================================================================
    // INVARIANT 3: Solving is deterministic.
    //
    // The same input always yields the same output, down to the last
    // decimal place.
    // ===================================================================
    #[test]
    fn solving_is_deterministic(state in arb_pool(), orders in arb_orders()) {
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let solver = EpochSolver::default();
        let first = solver.solve(&state, &orders, &weights);
        let second = solver.solve(&state, &orders, &weights);
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 4: Derived weights always pass the gap check.
    //
    // For any valid order book, the weights derived from its largest
    // order are strictly ordered and separated by the required gap.
    // ===================================================================
    #[test]
    fn derived_weights_validate(orders in arb_orders()) {
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        prop_assert!(weights.validate(&orders).is_ok());
    }

    // ===================================================================
    // INVARIANT 5: Senior redemptions are served before junior ones.
    //
    // When the reserve cannot cover both redemption legs, the senior leg
    // takes everything it asked for first.
    // ===================================================================
    #[test]
    fn senior_redeem_dominates_junior_redeem(reserve in 0u64..=1000u64) {
        let reserve = Decimal::from(reserve);
        let state = open_pool(reserve, reserve);
        let orders = OrderState::new(dec!(300), dec!(300), Decimal::ZERO, Decimal::ZERO);
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();

        let senior = dec!(300).min(reserve);
        let junior = dec!(300).min(reserve - senior);
        prop_assert!(result.feasible);
        prop_assert!((result.fulfillment.senior_redeem - senior).abs() < eps());
        prop_assert!((result.fulfillment.junior_redeem - junior).abs() < eps());
    }

    // ===================================================================
    // INVARIANT 6: Junior investments are served before senior ones.
    //
    // When the reserve cap leaves room for only part of the new money,
    // the junior leg fills first.
    // ===================================================================
    #[test]
    fn junior_invest_dominates_senior_invest(capacity in 0u64..=1000u64) {
        let capacity = Decimal::from(capacity);
        let state = open_pool(dec!(100), dec!(100) + capacity);
        let orders = OrderState::new(Decimal::ZERO, Decimal::ZERO, dec!(300), dec!(300));
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();

        let junior = dec!(300).min(capacity);
        let senior = dec!(300).min(capacity - junior);
        prop_assert!(result.feasible);
        prop_assert!((result.fulfillment.junior_invest - junior).abs() < eps());
        prop_assert!((result.fulfillment.senior_invest - senior).abs() < eps());
    }

    // ===================================================================
    // INVARIANT 7: Empty orders on a consistent pool are a no-op.
    //
    // If the current balance sheet already meets its bounds, executing
    // nothing is feasible with a zero objective.
    // ===================================================================
    #[test]
    fn empty_orders_on_consistent_pool(state in arb_pool()) {
        let orders = OrderState::default();
        let consistent = check_execution(&state, &orders, &Fulfillment::zero(), Decimal::ZERO)
            .unwrap()
            .is_empty();
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();

        prop_assert_eq!(result.feasible, consistent);
        prop_assert!(result.fulfillment.is_zero());
        prop_assert_eq!(result.objective_value, Decimal::ZERO);
    }

    // ===================================================================
    // INVARIANT 8: Junior redemptions beat senior investments on a thin
    // min ratio.
    //
    // On the min-ratio row a junior redemption uses 1 - m of headroom per
    // unit and a senior investment only m. The redemption still takes all
    // the headroom it can before any senior money comes in. The reserve
    // starts at 200 or more, so only the min ratio and the reserve cap bind.
    // ===================================================================
    #[test]
    fn junior_redeem_dominates_senior_invest_on_thin_ratio(
        reserve in 200u64..=400u64,
        junior_excess in 0u64..=100u64,
        min_per_mille in 1u32..=50u32,
        capacity in 0u64..=1000u64,
        junior_redeem in 0u64..=200u64,
        senior_invest in 0u64..=200u64,
    ) {
        let m = Decimal::new(min_per_mille.into(), 3);
        let reserve = Decimal::from(reserve);
        let capacity = Decimal::from(capacity);
        let state = PoolState {
            net_asset_value: dec!(1000),
            reserve,
            senior_asset_value: dec!(1000) - Decimal::from(junior_excess),
            min_junior_ratio: m,
            max_junior_ratio: Decimal::ONE,
            max_reserve: reserve + capacity,
        };
        let orders = OrderState::new(
            Decimal::from(junior_redeem),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::from(senior_invest),
        );
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();

        let pool = dec!(1000) + reserve;
        let junior = pool - state.senior_asset_value;
        let headroom = junior - m * pool;
        let expected_redeem = orders.junior_redeem.min(headroom / (Decimal::ONE - m));
        let left = junior - expected_redeem - m * (pool - expected_redeem);
        let expected_invest = orders
            .senior_invest
            .min(capacity + expected_redeem)
            .min(left / m);

        prop_assert!(result.feasible);
        prop_assert!(
            (result.fulfillment.junior_redeem - expected_redeem).abs() < eps(),
            "junior redeem {} expected {}", result.fulfillment.junior_redeem, expected_redeem
        );
        prop_assert!(
            (result.fulfillment.senior_invest - expected_invest).abs() < eps(),
            "senior invest {} expected {}", result.fulfillment.senior_invest, expected_invest
        );
    }

    // ===================================================================
    // INVARIANT 9: More capacity never costs a higher-priority leg.
    //
    // Raising the reserve cap or widening the junior ratio band only grows
    // the feasible set. A feasible epoch stays feasible, and the new
    // fulfillment is at least the old one in priority order.
    // ===================================================================
    #[test]
    fn relaxing_capacity_never_lowers_priority_fulfillment(
        state in arb_pool(),
        orders in arb_orders(),
        extra_reserve in 0u64..=100_000u64,
        lower_min_pct in 0u32..=50u32,
        raise_max_pct in 0u32..=50u32,
    ) {
        let relaxed = PoolState {
            max_reserve: state.max_reserve + Decimal::from(extra_reserve),
            min_junior_ratio: (state.min_junior_ratio - Decimal::new(lower_min_pct.into(), 2))
                .max(Decimal::ZERO),
            max_junior_ratio: (state.max_junior_ratio + Decimal::new(raise_max_pct.into(), 2))
                .min(Decimal::ONE),
            ..state
        };
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let solver = EpochSolver::default();
        let before = solver.solve(&state, &orders, &weights).unwrap();
        let after = solver.solve(&relaxed, &orders, &weights).unwrap();

        if before.feasible {
            prop_assert!(after.feasible);
            prop_assert!(
                lexicographically_at_least(&after.fulfillment, &before.fulfillment),
                "before {:?}, after {:?}", before.fulfillment, after.fulfillment
            );
        }
    }

    // ===================================================================
    // INVARIANT 10: An order book that fits in full executes in full.
    //
    // If executing every request breaks no constraint, no leg is cut back.
    // ===================================================================
    #[test]
    fn full_execution_is_used_when_it_fits(state in arb_pool(), orders in arb_orders()) {
        let full = Fulfillment {
            junior_redeem: orders.junior_redeem,
            senior_redeem: orders.senior_redeem,
            junior_invest: orders.junior_invest,
            senior_invest: orders.senior_invest,
        };
        let fits = check_execution(&state, &orders, &full, Decimal::ZERO)
            .unwrap()
            .is_empty();
        let weights = PriorityWeights::for_orders(&orders).unwrap();
        let result = EpochSolver::default().solve(&state, &orders, &weights).unwrap();
        if fits {
            prop_assert!(result.feasible);
            for leg in OrderLeg::ALL {
                prop_assert!((result.fulfillment.amount(leg) - full.amount(leg)).abs() < eps());
            }
        }
    }
}
