//! The position grid: ledger, exit scan, entry gates, risk budget, re-anchoring.

pub mod entry;
pub mod exit;
pub mod ledger;
pub mod reanchor;
pub mod risk;

pub use entry::{EntryRejection, EntryRules};
pub use exit::{close_triggered, exit_trigger, ClosedLeg, ExitReason};
pub use ledger::Ledger;
pub use reanchor::reanchor;
pub use risk::RiskBudget;
