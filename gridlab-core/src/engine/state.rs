//! Engine state for one instrument over one strategy run.

use crate::grid::{Ledger, RiskBudget};
use chrono::{NaiveDate, NaiveDateTime};

/// Reference price for session-relative trend classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionAnchor {
    pub day: NaiveDate,
    pub price: f64,
}

/// Mutable state that evolves tick by tick.
///
/// Owned by exactly one engine. The ledger is the source of truth: exposure
/// and risk are recomputed from it after every mutation.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub(crate) ledger: Ledger,
    pub(crate) budget: RiskBudget,
    pub(crate) total_exposure: f64,
    pub(crate) last_processed_key: Option<NaiveDateTime>,
    pub(crate) session: Option<SessionAnchor>,
}

impl EngineState {
    pub fn new(max_daily_positions: usize, max_total_risk: f64) -> Self {
        Self {
            ledger: Ledger::new(),
            budget: RiskBudget::new(max_daily_positions, max_total_risk),
            total_exposure: 0.0,
            last_processed_key: None,
            session: None,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn budget(&self) -> &RiskBudget {
        &self.budget
    }

    /// Sum of open leg sizes: the scalar handed to the allocation sink.
    pub fn total_exposure(&self) -> f64 {
        self.total_exposure
    }

    pub fn total_risk(&self) -> f64 {
        self.budget.total_risk()
    }

    pub fn last_processed_key(&self) -> Option<NaiveDateTime> {
        self.last_processed_key
    }

    pub fn session(&self) -> Option<SessionAnchor> {
        self.session
    }

    /// Start a new trading day. Clears the daily open count.
    pub fn reset_daily(&mut self, day: NaiveDate) {
        self.budget.reset_daily(day);
    }

    /// Re-derive exposure and risk from the ledger after it changed.
    pub(crate) fn sync_with_ledger(&mut self) {
        self.total_exposure = self.ledger.total_size();
        self.budget.recompute(&self.ledger);
    }

    /// Check the accounting identities against the ledger.
    ///
    /// Returns the current exposure. Panics in debug builds if either identity
    /// is violated beyond a tolerance relative to the ledger's magnitude.
    pub fn verify_accounting(&self) -> f64 {
        #[cfg(debug_assertions)]
        {
            const ACCOUNTING_EPSILON: f64 = 1e-9;
            let close = |tracked: f64, expected: f64| {
                (tracked - expected).abs() <= ACCOUNTING_EPSILON * expected.abs().max(1.0)
            };
            let size_sum = self.ledger.total_size();
            assert!(
                close(self.total_exposure, size_sum),
                "exposure accounting violated: tracked={}, ledger={size_sum}",
                self.total_exposure
            );
            let risk_sum = self.ledger.total_risk();
            assert!(
                close(self.budget.total_risk(), risk_sum),
                "risk accounting violated: tracked={}, ledger={risk_sum}",
                self.budget.total_risk()
            );
        }
        self.total_exposure
    }
}
