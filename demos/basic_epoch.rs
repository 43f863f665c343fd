//! Basic epoch execution example.
//!
//! Shows how the solver trades off the four order legs when the reserve
//! cap and the junior ratio bounds bite.

use epoch_solver::prelude::*;
use rust_decimal_macros::dec;

fn run(title: &str, state: PoolState, orders: OrderState) {
    println!("━━━ {} ━━━\n", title);
    println!("{}", state);
    println!(
        "Orders: jR {}, sR {}, jI {}, sI {}\n",
        orders.junior_redeem, orders.senior_redeem, orders.junior_invest, orders.senior_invest
    );

    let request = EpochRequest::new(state, orders);
    match EpochSolver::default().solve_request(&request) {
        Ok(result) => {
            println!("{}", result);
            if let (true, Ok(after)) = (result.feasible, result.snapshot(&state)) {
                println!("{}", after);
            }
        }
        Err(e) => println!("Error: {}\n", e),
    }
}

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  epoch-solver: Basic Epoch Execution      ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let base = PoolState {
        net_asset_value: dec!(800),
        reserve: dec!(200),
        senior_asset_value: dec!(800),
        min_junior_ratio: dec!(0.15),
        max_junior_ratio: dec!(0.2),
        max_reserve: dec!(10000),
    };

    // Junior invest is cut back to keep the junior share at 20%.
    run(
        "Scenario 1: Junior ratio ceiling",
        base,
        OrderState::new(dec!(100), dec!(300), dec!(200), dec!(400)),
    );

    // Only 500 fits under the reserve cap; senior invest takes the cut.
    run(
        "Scenario 2: Reserve cap",
        PoolState {
            min_junior_ratio: dec!(0),
            max_junior_ratio: dec!(1),
            max_reserve: dec!(500),
            ..base
        },
        OrderState::new(dec!(0), dec!(50), dec!(200), dec!(200)),
    );

    // A 1% pinned junior ratio cannot be reached with these orders.
    run(
        "Scenario 3: Unreachable ratio",
        PoolState {
            min_junior_ratio: dec!(0.01),
            max_junior_ratio: dec!(0.01),
            max_reserve: dec!(500),
            ..base
        },
        OrderState::new(dec!(100), dec!(200), dec!(300), dec!(400)),
    );
}
