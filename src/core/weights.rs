use crate::core::error::InputError;
use crate::core::orders::{OrderLeg, OrderState};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Objective weight of each order leg.
///
/// Weights fix the priority order of the legs and price the reported
/// objective. With `M` the largest requested amount of the epoch, each weight
/// must exceed `M` times the sum of all lower-priority weights.
/// [`PriorityWeights::validate`] enforces this and
/// [`PriorityWeights::for_orders`] derives a set that always satisfies it.
///
/// The gap alone does not make a single weighted LP lexicographic: on the
/// ratio rows a junior redemption uses `1 - minJuniorRatio` of headroom while
/// a senior investment uses only `minJuniorRatio`, so a lower leg can still
/// outbid a higher one. The solver therefore optimizes one weight level at a
/// time (see [`crate::optimization::lexicographic::Lexicographic`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityWeights {
    pub senior_redeem: Decimal,
    pub junior_redeem: Decimal,
    pub junior_invest: Decimal,
    pub senior_invest: Decimal,
}

impl PriorityWeights {
    pub fn weight(&self, leg: OrderLeg) -> Decimal {
        match leg {
            OrderLeg::SeniorRedeem => self.senior_redeem,
            OrderLeg::JuniorRedeem => self.junior_redeem,
            OrderLeg::JuniorInvest => self.junior_invest,
            OrderLeg::SeniorInvest => self.senior_invest,
        }
    }

    /// Weights indexed by [`OrderLeg::index`].
    pub fn as_vector(&self) -> [Decimal; 4] {
        OrderLeg::ALL.map(|leg| self.weight(leg))
    }

    /// Derive weights `G^3, G^2, G, 1` with `G = max(floor(M) + 1, 2)`.
    ///
    /// Because `G > M`, `G^k = M * G^(k-1) + G^(k-1)` and `G^(k-1)` already
    /// exceeds `M` times the geometric tail, so the gap holds at every level.
    /// `G >= 2` keeps the order strict when every order is empty.
    pub fn for_orders(orders: &OrderState) -> Result<Self, InputError> {
        orders.validate()?;
        let max_order = orders.max_requested();
        let overflow = || InputError::WeightOverflow { max_order };

        let gap = max_order
            .floor()
            .checked_add(Decimal::ONE)
            .ok_or_else(overflow)?
            .max(Decimal::TWO);
        let squared = gap.checked_mul(gap).ok_or_else(overflow)?;
        let cubed = squared.checked_mul(gap).ok_or_else(overflow)?;

        Ok(Self {
            senior_redeem: cubed,
            junior_redeem: squared,
            junior_invest: gap,
            senior_invest: Decimal::ONE,
        })
    }

    /// Check positivity, strict priority order and the weight gap for the
    /// given orders.
    pub fn validate(&self, orders: &OrderState) -> Result<(), InputError> {
        for leg in OrderLeg::ALL {
            let weight = self.weight(leg);
            if weight <= Decimal::ZERO {
                return Err(InputError::NonPositiveWeight { leg, weight });
            }
        }

        for pair in OrderLeg::ALL.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if self.weight(higher) <= self.weight(lower) {
                return Err(InputError::PriorityOrder {
                    higher,
                    higher_weight: self.weight(higher),
                    lower,
                    lower_weight: self.weight(lower),
                });
            }
        }

        let max_order = orders.max_requested();
        let overflow = || InputError::WeightOverflow { max_order };
        for leg in OrderLeg::ALL {
            let below = leg
                .lower()
                .iter()
                .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(self.weight(*l)))
                .ok_or_else(overflow)?;
            let required = max_order.checked_mul(below).ok_or_else(overflow)?;
            let weight = self.weight(leg);
            if weight <= required {
                return Err(InputError::WeightGap {
                    leg,
                    weight,
                    required,
                });
            }
        }
        Ok(())
    }
}
