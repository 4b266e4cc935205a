//! Risk budget tracker: aggregate open risk and the daily open cap.

use crate::domain::Leg;
use crate::grid::entry::EntryRejection;
use crate::grid::ledger::Ledger;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskBudget {
    max_daily_positions: usize,
    max_total_risk: f64,
    total_risk: f64,
    daily_open_count: usize,
    last_trading_day: Option<NaiveDate>,
}

impl RiskBudget {
    pub fn new(max_daily_positions: usize, max_total_risk: f64) -> Self {
        Self {
            max_daily_positions,
            max_total_risk,
            total_risk: 0.0,
            daily_open_count: 0,
            last_trading_day: None,
        }
    }

    pub fn total_risk(&self) -> f64 {
        self.total_risk
    }

    pub fn daily_open_count(&self) -> usize {
        self.daily_open_count
    }

    pub fn last_trading_day(&self) -> Option<NaiveDate> {
        self.last_trading_day
    }

    /// Start a new trading day: the daily open count goes back to zero.
    pub fn reset_daily(&mut self, day: NaiveDate) {
        self.daily_open_count = 0;
        self.last_trading_day = Some(day);
    }

    /// Gate a candidate leg with risk `candidate_risk` opened on `day`.
    ///
    /// Rolls the daily counter first when `day` differs from the last
    /// trading day, then checks the daily cap and the aggregate risk cap.
    pub fn can_open(&mut self, day: NaiveDate, candidate_risk: f64) -> Result<(), EntryRejection> {
        if self.last_trading_day != Some(day) {
            self.reset_daily(day);
        }
        if self.daily_open_count >= self.max_daily_positions {
            return Err(EntryRejection::DailyCap {
                opened_today: self.daily_open_count,
            });
        }
        let projected = self.total_risk + candidate_risk;
        if projected.is_nan() || projected > self.max_total_risk {
            return Err(EntryRejection::RiskBudget {
                projected,
                limit: self.max_total_risk,
            });
        }
        Ok(())
    }

    /// Count an accepted open against today's cap.
    pub fn record_open(&mut self) {
        self.daily_open_count += 1;
    }

    /// Recompute aggregate risk from the ledger. Called after every mutation
    /// instead of patching incrementally, so float error cannot accumulate.
    pub fn recompute(&mut self, ledger: &Ledger) {
        self.total_risk = ledger.iter().map(Leg::risk).sum();
    }
}
