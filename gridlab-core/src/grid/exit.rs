//! Exit engine: closes legs whose take-profit or stop-loss the bar touched.
//!
//! Single oldest-to-newest pass over the ledger. Matches are collected first
//! and removed afterwards, so the removal order is stable. When a bar touches
//! both levels of a leg, the take-profit wins.

use crate::domain::{Direction, Leg};
use crate::grid::ledger::Ledger;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

/// A leg removed from the ledger, with the level that closed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedLeg {
    pub leg: Leg,
    pub reason: ExitReason,
    pub exit_price: f64,
    /// Signed profit at `exit_price`. Diagnostic only.
    pub realized: f64,
}

/// Which exit, if any, a bar with this high/low triggers on `leg`.
pub fn exit_trigger(leg: &Leg, high: f64, low: f64) -> Option<(ExitReason, f64)> {
    let (tp_hit, sl_hit) = match leg.direction() {
        Direction::Long => (high >= leg.take_profit(), low <= leg.stop_loss()),
        Direction::Short => (low <= leg.take_profit(), high >= leg.stop_loss()),
    };
    if tp_hit {
        Some((ExitReason::TakeProfit, leg.take_profit()))
    } else if sl_hit {
        Some((ExitReason::StopLoss, leg.stop_loss()))
    } else {
        None
    }
}

/// Remove every triggered leg from `ledger`, oldest first.
pub fn close_triggered(ledger: &mut Ledger, high: f64, low: f64) -> Vec<ClosedLeg> {
    let hits: Vec<(usize, ExitReason, f64)> = ledger
        .iter()
        .enumerate()
        .filter_map(|(i, leg)| exit_trigger(leg, high, low).map(|(r, px)| (i, r, px)))
        .collect();

    if hits.is_empty() {
        return Vec::new();
    }

    let indices: Vec<usize> = hits.iter().map(|(i, _, _)| *i).collect();
    let removed = ledger.remove_indices(&indices);

    removed
        .into_iter()
        .zip(hits)
        .map(|(leg, (_, reason, exit_price))| {
            let realized = leg.pnl_at(exit_price);
            ClosedLeg {
                leg,
                reason,
                exit_price,
                realized,
            }
        })
        .collect()
}
