//! Entry engine: the gates a new leg must pass, in order:
//!
//! 1. total leg cap
//! 2. per-direction leg cap
//! 3. candidate levels from close ± distances
//! 4. risk budget (daily cap, aggregate risk cap)
//! 5. grid spacing against the last leg
//!
//! Evaluation only builds the candidate leg. Appending it, counting it against
//! the day, and re-anchoring are the caller's job.

use crate::components::GridParams;
use crate::config::EngineConfig;
use crate::domain::{position_risk, Direction, Leg, LegError};
use crate::grid::ledger::Ledger;
use crate::grid::risk::RiskBudget;
use chrono::NaiveDate;
use thiserror::Error;

/// Why a candidate leg was not opened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryRejection {
    #[error("total leg cap reached ({open}/{limit})")]
    TotalCap { open: usize, limit: usize },

    #[error("{direction} leg cap reached ({open}/{limit})")]
    DirectionCap {
        direction: Direction,
        open: usize,
        limit: usize,
    },

    #[error("daily open cap reached ({opened_today} today)")]
    DailyCap { opened_today: usize },

    #[error("risk budget exceeded: projected {projected:.6} > limit {limit:.6}")]
    RiskBudget { projected: f64, limit: f64 },

    #[error("grid spacing not met: close {close} vs last entry {last_entry} (step {grid_step})")]
    GridSpacing {
        close: f64,
        last_entry: f64,
        grid_step: f64,
    },

    #[error("candidate leg invalid: {0}")]
    InvalidLeg(#[from] LegError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryRules {
    max_total_positions: usize,
    max_positions_per_direction: usize,
}

impl EntryRules {
    pub fn new(max_total_positions: usize, max_positions_per_direction: usize) -> Self {
        Self {
            max_total_positions,
            max_positions_per_direction,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.grid.max_total_positions,
            config.grid.max_positions_per_direction,
        )
    }

    /// Run every gate for a `direction` entry at `close`. On success returns
    /// the leg to append.
    pub fn evaluate(
        &self,
        ledger: &Ledger,
        budget: &mut RiskBudget,
        day: NaiveDate,
        direction: Direction,
        close: f64,
        params: &GridParams,
    ) -> Result<Leg, EntryRejection> {
        let open = ledger.len();
        if open >= self.max_total_positions {
            return Err(EntryRejection::TotalCap {
                open,
                limit: self.max_total_positions,
            });
        }

        let same_side = ledger.count(direction);
        if same_side >= self.max_positions_per_direction {
            return Err(EntryRejection::DirectionCap {
                direction,
                open: same_side,
                limit: self.max_positions_per_direction,
            });
        }

        let sign = direction.sign();
        let take_profit = close + sign * params.tp_distance;
        let stop_loss = close - sign * params.sl_distance;

        let candidate_risk = position_risk(close, stop_loss, params.size);
        budget.can_open(day, candidate_risk)?;

        if let Some(last) = ledger.last() {
            let last_entry = last.entry_price();
            let spaced = match direction {
                Direction::Long => close < last_entry - params.grid_step,
                Direction::Short => close > last_entry + params.grid_step,
            };
            if !spaced {
                return Err(EntryRejection::GridSpacing {
                    close,
                    last_entry,
                    grid_step: params.grid_step,
                });
            }
        }

        Ok(Leg::new(direction, close, params.size, take_profit, stop_loss)?)
    }
}
