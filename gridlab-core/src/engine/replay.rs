//! Replay driver: precompute indicators, then one engine tick per bar.
//!
//! The only per-bar output is the exposure scalar handed to an
//! `AllocationSink`. Everything else is folded into `ReplayResult` counters.

use crate::config::{ConfigError, EngineConfig};
use crate::domain::Bar;
use crate::engine::grid_engine::{EntryOutcome, GridEngine, TickReport, TickStatus};
use crate::engine::precompute::GridIndicators;
use crate::fingerprint::ConfigHash;
use crate::grid::ExitReason;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

/// Receives the aggregate exposure after every tick.
pub trait AllocationSink {
    fn allocate(&mut self, timestamp: NaiveDateTime, exposure: f64);
}

/// One emitted allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    pub timestamp: NaiveDateTime,
    pub exposure: f64,
}

impl AllocationSink for Vec<Allocation> {
    fn allocate(&mut self, timestamp: NaiveDateTime, exposure: f64) {
        self.push(Allocation {
            timestamp,
            exposure,
        });
    }
}

/// Summary of a complete replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayResult {
    pub symbol: String,
    pub fingerprint: ConfigHash,
    pub bars: usize,
    pub processed: usize,
    /// Ticks that ended early: duplicates, invalid bars, session anchors,
    /// insufficient history.
    pub skipped: usize,
    pub invalid_bars: usize,
    pub opened: usize,
    pub rejected: usize,
    pub closed_take_profit: usize,
    pub closed_stop_loss: usize,
    pub reanchors: usize,
    pub max_open_legs: usize,
    pub open_legs: usize,
    pub final_exposure: f64,
    pub realized: f64,
}

impl ReplayResult {
    fn new(config: &EngineConfig, bars: usize) -> Self {
        Self {
            symbol: config.symbol.clone(),
            fingerprint: config.fingerprint(),
            bars,
            processed: 0,
            skipped: 0,
            invalid_bars: 0,
            opened: 0,
            rejected: 0,
            closed_take_profit: 0,
            closed_stop_loss: 0,
            reanchors: 0,
            max_open_legs: 0,
            open_legs: 0,
            final_exposure: 0.0,
            realized: 0.0,
        }
    }

    fn record(&mut self, report: &TickReport, open_legs: usize) {
        match report.status {
            TickStatus::Processed => self.processed += 1,
            TickStatus::InvalidBar => {
                self.invalid_bars += 1;
                self.skipped += 1;
            }
            _ => self.skipped += 1,
        }
        for closed in &report.closed {
            match closed.reason {
                ExitReason::TakeProfit => self.closed_take_profit += 1,
                ExitReason::StopLoss => self.closed_stop_loss += 1,
            }
            self.realized += closed.realized;
        }
        match report.entry {
            EntryOutcome::Opened(_) => self.opened += 1,
            EntryOutcome::Rejected(_) => self.rejected += 1,
            _ => {}
        }
        if report.reanchored.is_some() {
            self.reanchors += 1;
        }
        self.max_open_legs = self.max_open_legs.max(open_legs);
        self.open_legs = open_legs;
        self.final_exposure = report.exposure;
    }

    pub fn closed(&self) -> usize {
        self.closed_take_profit + self.closed_stop_loss
    }
}

/// Replay `bars` through a fresh engine built from `config`.
pub fn replay(
    config: &EngineConfig,
    bars: &[Bar],
    sink: &mut dyn AllocationSink,
) -> Result<ReplayResult, ConfigError> {
    let mut engine = GridEngine::new(config.clone())?;
    let indicators = GridIndicators::from_config(&config.indicators);
    let readings = indicators.precompute(bars);

    let mut result = ReplayResult::new(config, bars.len());
    info!(
        "replaying {} bars of {} (config {}, warmup {} bars)",
        bars.len(),
        config.symbol,
        result.fingerprint.short(),
        indicators.warmup()
    );

    for (bar, reading) in bars.iter().zip(&readings) {
        let report = engine.on_bar(bar, reading);
        sink.allocate(bar.timestamp, report.exposure);
        result.record(&report, engine.ledger().len());
    }

    info!(
        "replay done: {} opened, {} closed ({} tp / {} sl), {} re-anchors, {} legs open, exposure {:.4}",
        result.opened,
        result.closed(),
        result.closed_take_profit,
        result.closed_stop_loss,
        result.reanchors,
        result.open_legs,
        result.final_exposure
    );
    Ok(result)
}
