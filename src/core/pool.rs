use crate::core::arith;
use crate::core::error::{InputError, NumericalFailure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a two-tranche pool's balance sheet at epoch close.
///
/// `net_asset_value` values the invested portfolio only. The reserve sits on
/// top of it, so the figure tranche ratios are measured against is
/// [`PoolState::pool_value`] (`net_asset_value + reserve`).
///
/// # Examples
///
/// ```
/// use epoch_solver::core::pool::PoolState;
/// use rust_decimal_macros::dec;
///
/// let state = PoolState {
///     net_asset_value: dec!(800),
///     reserve: dec!(200),
///     senior_asset_value: dec!(800),
///     min_junior_ratio: dec!(0.15),
///     max_junior_ratio: dec!(0.2),
///     max_reserve: dec!(10000),
/// };
///
/// assert_eq!(state.pool_value(), Ok(dec!(1000)));
/// assert_eq!(state.junior_ratio(), Ok(Some(dec!(0.2))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    /// Value of the invested assets.
    pub net_asset_value: Decimal,
    /// Uninvested cash available to fund redemptions.
    pub reserve: Decimal,
    /// Value attributable to the senior tranche.
    pub senior_asset_value: Decimal,
    /// Lower bound on the junior share of the pool value.
    pub min_junior_ratio: Decimal,
    /// Upper bound on the junior share of the pool value.
    pub max_junior_ratio: Decimal,
    /// Cap on the reserve after execution.
    pub max_reserve: Decimal,
}

impl PoolState {
    /// Total value the tranches have a claim on.
    pub fn pool_value(&self) -> Result<Decimal, NumericalFailure> {
        arith::add(self.net_asset_value, self.reserve)
    }

    /// Value attributable to the junior (first-loss) tranche.
    pub fn junior_asset_value(&self) -> Result<Decimal, NumericalFailure> {
        arith::sub(self.pool_value()?, self.senior_asset_value)
    }

    /// Junior share of the pool value, `None` for an empty pool.
    pub fn junior_ratio(&self) -> Result<Option<Decimal>, NumericalFailure> {
        Ok(junior_ratio(self.junior_asset_value()?, self.pool_value()?))
    }

    /// Check every balance-sheet invariant.
    pub fn validate(&self) -> Result<(), InputError> {
        let amounts = [
            ("netAssetValue", self.net_asset_value),
            ("reserve", self.reserve),
            ("seniorAssetValue", self.senior_asset_value),
            ("maxReserve", self.max_reserve),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(InputError::NegativeAmount { field, value });
            }
        }

        let ratios = [
            ("minJuniorRatio", self.min_junior_ratio),
            ("maxJuniorRatio", self.max_junior_ratio),
        ];
        for (field, value) in ratios {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(InputError::RatioOutOfRange { field, value });
            }
        }

        if self.min_junior_ratio > self.max_junior_ratio {
            return Err(InputError::InvertedRatioBounds {
                min: self.min_junior_ratio,
                max: self.max_junior_ratio,
            });
        }
        if self.reserve > self.net_asset_value {
            return Err(InputError::ReserveExceedsNav {
                reserve: self.reserve,
                nav: self.net_asset_value,
            });
        }
        if self.senior_asset_value > self.net_asset_value {
            return Err(InputError::SeniorAssetExceedsNav {
                senior: self.senior_asset_value,
                nav: self.net_asset_value,
            });
        }
        if self.pool_value().is_err() {
            return Err(InputError::PoolValueOverflow {
                nav: self.net_asset_value,
                reserve: self.reserve,
            });
        }
        Ok(())
    }
}

/// Guarded `junior / pool`. An empty pool has no ratio to speak of.
pub(crate) fn junior_ratio(junior: Decimal, pool: Decimal) -> Option<Decimal> {
    if pool.is_zero() {
        None
    } else {
        junior.checked_div(pool)
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pool State ===")?;
        writeln!(f, "NAV:            {}", self.net_asset_value)?;
        writeln!(f, "Reserve:        {}", self.reserve)?;
        let shown = |value: Result<Decimal, NumericalFailure>| match value {
            Ok(v) => v.to_string(),
            Err(_) => "overflow".to_string(),
        };
        writeln!(f, "Pool Value:     {}", shown(self.pool_value()))?;
        writeln!(f, "Senior Asset:   {}", self.senior_asset_value)?;
        writeln!(f, "Junior Asset:   {}", shown(self.junior_asset_value()))?;
        let ratio = match self.junior_ratio() {
            Ok(Some(r)) => r.round_dp(6).to_string(),
            Ok(None) => "n/a".to_string(),
            Err(_) => "overflow".to_string(),
        };
        writeln!(
            f,
            "Junior Ratio:   {} (bounds {} .. {})",
            ratio,
            self.min_junior_ratio,
            self.max_junior_ratio
        )?;
        writeln!(f, "Max Reserve:    {}", self.max_reserve)
    }
}
