use crate::core::arith;
use crate::core::error::{InputError, NumericalFailure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four order legs an epoch can execute.
///
/// Variants are declared in priority order: senior redemptions are honored
/// first, senior investments last. [`OrderLeg::index`] doubles as the LP
/// variable index, so the highest priority leg is variable 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderLeg {
    SeniorRedeem,
    JuniorRedeem,
    JuniorInvest,
    SeniorInvest,
}

impl OrderLeg {
    /// All legs, highest priority first.
    pub const ALL: [OrderLeg; 4] = [
        OrderLeg::SeniorRedeem,
        OrderLeg::JuniorRedeem,
        OrderLeg::JuniorInvest,
        OrderLeg::SeniorInvest,
    ];

    pub fn index(self) -> usize {
        match self {
            OrderLeg::SeniorRedeem => 0,
            OrderLeg::JuniorRedeem => 1,
            OrderLeg::JuniorInvest => 2,
            OrderLeg::SeniorInvest => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderLeg::SeniorRedeem => "seniorRedeem",
            OrderLeg::JuniorRedeem => "juniorRedeem",
            OrderLeg::JuniorInvest => "juniorInvest",
            OrderLeg::SeniorInvest => "seniorInvest",
        }
    }

    /// Legs strictly below this one in priority.
    pub fn lower(self) -> &'static [OrderLeg] {
        match self {
            OrderLeg::SeniorRedeem => &[
                OrderLeg::JuniorRedeem,
                OrderLeg::JuniorInvest,
                OrderLeg::SeniorInvest,
            ],
            OrderLeg::JuniorRedeem => &[OrderLeg::JuniorInvest, OrderLeg::SeniorInvest],
            OrderLeg::JuniorInvest => &[OrderLeg::SeniorInvest],
            OrderLeg::SeniorInvest => &[],
        }
    }
}

impl fmt::Display for OrderLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending, unexecuted investor intent for the closing epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub junior_redeem: Decimal,
    pub senior_redeem: Decimal,
    pub junior_invest: Decimal,
    pub senior_invest: Decimal,
}

impl OrderState {
    pub fn new(
        junior_redeem: Decimal,
        senior_redeem: Decimal,
        junior_invest: Decimal,
        senior_invest: Decimal,
    ) -> Self {
        Self {
            junior_redeem,
            senior_redeem,
            junior_invest,
            senior_invest,
        }
    }

    /// Requested amount of a single leg.
    pub fn requested(&self, leg: OrderLeg) -> Decimal {
        match leg {
            OrderLeg::SeniorRedeem => self.senior_redeem,
            OrderLeg::JuniorRedeem => self.junior_redeem,
            OrderLeg::JuniorInvest => self.junior_invest,
            OrderLeg::SeniorInvest => self.senior_invest,
        }
    }

    /// The largest requested amount across all legs.
    pub fn max_requested(&self) -> Decimal {
        OrderLeg::ALL
            .iter()
            .map(|leg| self.requested(*leg))
            .fold(Decimal::ZERO, Decimal::max)
    }

    pub fn is_empty(&self) -> bool {
        OrderLeg::ALL.iter().all(|leg| self.requested(*leg).is_zero())
    }

    pub fn validate(&self) -> Result<(), InputError> {
        for leg in OrderLeg::ALL {
            let value = self.requested(leg);
            if value < Decimal::ZERO {
                return Err(InputError::NegativeAmount {
                    field: leg.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Executed amount of each order leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    pub junior_redeem: Decimal,
    pub senior_redeem: Decimal,
    pub junior_invest: Decimal,
    pub senior_invest: Decimal,
}

impl Fulfillment {
    /// Nothing executed.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from values indexed by [`OrderLeg::index`].
    pub fn from_legs(values: [Decimal; 4]) -> Self {
        Self {
            senior_redeem: values[OrderLeg::SeniorRedeem.index()],
            junior_redeem: values[OrderLeg::JuniorRedeem.index()],
            junior_invest: values[OrderLeg::JuniorInvest.index()],
            senior_invest: values[OrderLeg::SeniorInvest.index()],
        }
    }

    pub fn amount(&self, leg: OrderLeg) -> Decimal {
        match leg {
            OrderLeg::SeniorRedeem => self.senior_redeem,
            OrderLeg::JuniorRedeem => self.junior_redeem,
            OrderLeg::JuniorInvest => self.junior_invest,
            OrderLeg::SeniorInvest => self.senior_invest,
        }
    }

    /// Cash leaving the reserve.
    pub fn total_redeemed(&self) -> Result<Decimal, NumericalFailure> {
        arith::add(self.senior_redeem, self.junior_redeem)
    }

    /// Cash entering the reserve.
    pub fn total_invested(&self) -> Result<Decimal, NumericalFailure> {
        arith::add(self.senior_invest, self.junior_invest)
    }

    pub fn is_zero(&self) -> bool {
        OrderLeg::ALL.iter().all(|leg| self.amount(*leg).is_zero())
    }
}

impl fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leg in OrderLeg::ALL {
            writeln!(f, "  {:<14}{}", leg.as_str(), self.amount(leg))?;
        }
        Ok(())
    }
}
