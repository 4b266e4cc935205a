//! Take-profit re-anchoring.
//!
//! Once the ledger holds more than `threshold` legs, every leg's take-profit
//! is replaced by one shared level measured from the newest entry:
//!
//! ```text
//! spread = |last.entry - first.entry|
//! tp     = last.entry + spread * pct    (cohort Long)
//!        = last.entry - spread * pct    (cohort Short)
//! ```
//!
//! The cohort direction is the first leg's direction. Individual targets are
//! abandoned: after re-anchoring the ledger exits as one block.

use crate::domain::Direction;
use crate::grid::ledger::Ledger;

/// Re-anchor when `ledger.len() > threshold`. Returns the shared take-profit
/// if it fired.
pub fn reanchor(ledger: &mut Ledger, threshold: usize, pct: f64) -> Option<f64> {
    if ledger.len() <= threshold {
        return None;
    }
    let first = ledger.first()?;
    let last = ledger.last()?;

    let spread = (last.entry_price() - first.entry_price()).abs();
    let shift = spread * pct;
    let shared = match first.direction() {
        Direction::Long => last.entry_price() + shift,
        Direction::Short => last.entry_price() - shift,
    };

    for leg in ledger.legs_mut() {
        leg.set_take_profit(shared);
    }
    Some(shared)
}
