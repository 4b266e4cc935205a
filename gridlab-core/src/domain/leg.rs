//! Leg: one discrete open position in the grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Trade direction of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for Long, -1.0 for Short. Multiply a favorable distance by this
    /// to get a signed price offset.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Errors raised when a leg would be constructed with inconsistent levels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LegError {
    #[error("{direction} leg at {entry}: take-profit {take_profit} is not on the profit side")]
    TakeProfitWrongSide {
        direction: Direction,
        entry: f64,
        take_profit: f64,
    },

    #[error("{direction} leg at {entry}: stop-loss {stop_loss} is not on the loss side")]
    StopLossWrongSide {
        direction: Direction,
        entry: f64,
        stop_loss: f64,
    },

    #[error("leg size must be finite and > 0, got {0}")]
    InvalidSize(f64),

    #[error("leg entry price must be finite and > 0, got {0}")]
    InvalidEntry(f64),
}

/// One grid position.
///
/// Levels are checked once at construction. Afterwards the only mutation is a
/// take-profit rewrite by re-anchoring, which may deliberately move the target
/// past the entry for the oldest legs of a cohort.
///
/// Legs serialize for reports but cannot be deserialized, so every leg in a
/// ledger went through [`Leg::new`]:
///
/// ```compile_fail
/// use gridlab_core::domain::Leg;
/// let _: Leg = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    entry_price: f64,
    size: f64,
    direction: Direction,
    take_profit: f64,
    stop_loss: f64,
}

impl Leg {
    pub fn new(
        direction: Direction,
        entry_price: f64,
        size: f64,
        take_profit: f64,
        stop_loss: f64,
    ) -> Result<Self, LegError> {
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Err(LegError::InvalidEntry(entry_price));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(LegError::InvalidSize(size));
        }

        // NaN levels compare false here and are rejected along with wrong-side levels.
        let sign = direction.sign();
        let tp_on_profit_side = (take_profit - entry_price) * sign > 0.0;
        let sl_on_loss_side = (entry_price - stop_loss) * sign > 0.0;
        if !tp_on_profit_side {
            return Err(LegError::TakeProfitWrongSide {
                direction,
                entry: entry_price,
                take_profit,
            });
        }
        if !sl_on_loss_side {
            return Err(LegError::StopLossWrongSide {
                direction,
                entry: entry_price,
                stop_loss,
            });
        }

        Ok(Self {
            entry_price,
            size,
            direction,
            take_profit,
            stop_loss,
        })
    }

    /// Build a leg from an entry price and favorable/adverse distances.
    pub fn from_distances(
        direction: Direction,
        entry_price: f64,
        size: f64,
        tp_distance: f64,
        sl_distance: f64,
    ) -> Result<Self, LegError> {
        let sign = direction.sign();
        Self::new(
            direction,
            entry_price,
            size,
            entry_price + sign * tp_distance,
            entry_price - sign * sl_distance,
        )
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    /// Risk contribution of this leg (see [`position_risk`]).
    pub fn risk(&self) -> f64 {
        position_risk(self.entry_price, self.stop_loss, self.size)
    }

    /// Signed profit of closing this leg at `exit_price`, in price × size units.
    pub fn pnl_at(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) * self.direction.sign() * self.size
    }

    pub(crate) fn set_take_profit(&mut self, take_profit: f64) {
        self.take_profit = take_profit;
    }
}

/// Fractional risk of a position: `|entry - stop| * size / entry`.
///
/// A zero or non-finite entry has no defined risk; it is reported as
/// `f64::INFINITY` so any budget check against it fails.
pub fn position_risk(entry: f64, stop: f64, size: f64) -> f64 {
    if entry == 0.0 || !entry.is_finite() {
        return f64::INFINITY;
    }
    (entry - stop).abs() * size / entry.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_serializes_for_reports() {
        let leg = Leg::from_distances(Direction::Short, 100.0, 0.01, 0.8, 20.0).unwrap();
        let value = serde_json::to_value(&leg).unwrap();
        assert_eq!(value["direction"], "short");
        assert_eq!(value["stop_loss"], 120.0);
    }

    #[test]
    fn long_leg_levels_from_distances() {
        let leg = Leg::from_distances(Direction::Long, 100.0, 0.01, 0.8, 20.0).unwrap();
        assert!((leg.take_profit() - 100.8).abs() < 1e-9);
        assert_eq!(leg.stop_loss(), 80.0);
    }

    #[test]
    fn short_leg_levels_from_distances() {
        let leg = Leg::from_distances(Direction::Short, 100.0, 0.01, 0.8, 20.0).unwrap();
        assert!((leg.take_profit() - 99.2).abs() < 1e-9);
        assert_eq!(leg.stop_loss(), 120.0);
    }

    #[test]
    fn take_profit_on_loss_side_is_rejected() {
        let err = Leg::new(Direction::Long, 100.0, 1.0, 99.0, 90.0).unwrap_err();
        assert!(matches!(err, LegError::TakeProfitWrongSide { .. }));
    }

    #[test]
    fn stop_loss_on_profit_side_is_rejected() {
        let err = Leg::new(Direction::Short, 100.0, 1.0, 95.0, 99.0).unwrap_err();
        assert!(matches!(err, LegError::StopLossWrongSide { .. }));
    }

    #[test]
    fn nan_levels_are_rejected() {
        assert!(Leg::new(Direction::Long, 100.0, 1.0, f64::NAN, 90.0).is_err());
        assert!(Leg::new(Direction::Long, 100.0, f64::NAN, 101.0, 90.0).is_err());
    }

    #[test]
    fn zero_entry_is_rejected() {
        let err = Leg::new(Direction::Long, 0.0, 1.0, 1.0, -1.0).unwrap_err();
        assert_eq!(err, LegError::InvalidEntry(0.0));
    }

    #[test]
    fn position_risk_formula() {
        // |100 - 80| * 0.5 / 100 = 0.1
        assert!((position_risk(100.0, 80.0, 0.5) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn position_risk_zero_entry_is_infinite() {
        assert_eq!(position_risk(0.0, 10.0, 1.0), f64::INFINITY);
    }

    #[test]
    fn pnl_is_signed_by_direction() {
        let long = Leg::from_distances(Direction::Long, 100.0, 2.0, 1.0, 5.0).unwrap();
        let short = Leg::from_distances(Direction::Short, 100.0, 2.0, 1.0, 5.0).unwrap();
        assert_eq!(long.pnl_at(101.0), 2.0);
        assert_eq!(short.pnl_at(101.0), -2.0);
    }
}
