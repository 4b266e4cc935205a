//! The grid engine: one tick per bar.
//!
//! Each tick runs in a fixed order:
//!
//! 1. Duplicate check against the last processed bar key
//! 2. Bar sanity check
//! 3. Session anchoring (session-open trend reference only)
//! 4. Required indicator readings
//! 5. Trend classification and grid parameters
//! 6. Exits over the existing ledger
//! 7. At most one entry, then re-anchoring
//!
//! Exits run before entries, so a leg is never exit-checked on the tick that
//! opened it. Steps 1 through 4 can end the tick early as a no-op that leaves
//! every piece of state untouched and re-emits the current exposure.

use crate::components::{IndicatorReading, ParameterCalculator, Params, TrendClassifier};
use crate::config::{ConfigError, EngineConfig, Requirements, TrendReference};
use crate::domain::{Bar, Direction, Leg};
use crate::engine::state::{EngineState, SessionAnchor};
use crate::grid::{close_triggered, reanchor, ClosedLeg, EntryRejection, EntryRules, Ledger};
use tracing::{debug, info, warn};

/// How a tick was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// Exits and entries ran.
    Processed,
    /// Same bar key as the previous processed tick.
    Duplicate,
    /// NaN fields, inverted range or non-positive close.
    InvalidBar,
    /// First bar of a session; its close became the trend reference.
    SessionAnchored,
    /// Required readings are still warming up. The bar key is not recorded.
    InsufficientHistory { missing: Vec<&'static str> },
}

/// What happened on the entry side of a processed tick.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// The tick never reached the entry stage.
    NotEvaluated,
    /// The classifier produced no direction.
    NoSignal,
    /// Grid parameters could not be derived; names the degenerate input.
    ParamsUnavailable(&'static str),
    Rejected(EntryRejection),
    Opened(Leg),
}

/// Diagnostics for a single tick. Only `exposure` leaves the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub status: TickStatus,
    pub exposure: f64,
    pub direction: Option<Direction>,
    pub closed: Vec<ClosedLeg>,
    pub entry: EntryOutcome,
    /// Grid step the entry gate used, when parameters were available.
    pub grid_step: Option<f64>,
    /// Shared take-profit when re-anchoring fired on this tick.
    pub reanchored: Option<f64>,
}

impl TickReport {
    fn no_op(status: TickStatus, exposure: f64) -> Self {
        Self {
            status,
            exposure,
            direction: None,
            closed: Vec::new(),
            entry: EntryOutcome::NotEvaluated,
            grid_step: None,
            reanchored: None,
        }
    }

    pub fn opened(&self) -> Option<&Leg> {
        match &self.entry {
            EntryOutcome::Opened(leg) => Some(leg),
            _ => None,
        }
    }
}

/// Incremental position manager for a single instrument.
#[derive(Debug, Clone)]
pub struct GridEngine {
    config: EngineConfig,
    classifier: TrendClassifier,
    calculator: ParameterCalculator,
    rules: EntryRules,
    requirements: Requirements,
    state: EngineState,
}

impl GridEngine {
    /// Build an engine. Refuses to start on an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: TrendClassifier::from_config(&config),
            calculator: ParameterCalculator::from_config(&config),
            rules: EntryRules::from_config(&config),
            requirements: config.requirements(),
            state: EngineState::new(
                config.grid.max_daily_positions,
                config.grid.max_total_risk,
            ),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn total_exposure(&self) -> f64 {
        self.state.total_exposure
    }

    /// Process one bar with its indicator readings.
    pub fn on_bar(&mut self, bar: &Bar, reading: &IndicatorReading) -> TickReport {
        let exposure = self.state.total_exposure;

        if self.state.last_processed_key == Some(bar.timestamp) {
            debug!("{} {}: duplicate tick", bar.symbol, bar.timestamp);
            return TickReport::no_op(TickStatus::Duplicate, exposure);
        }

        if !bar.is_sane() {
            warn!(
                "{} {}: invalid bar o={} h={} l={} c={} v={}, skipping",
                bar.symbol, bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
            );
            return TickReport::no_op(TickStatus::InvalidBar, exposure);
        }

        let day = bar.day();
        if self.config.trend.reference == TrendReference::SessionOpen
            && self.state.session.map(|s| s.day) != Some(day)
        {
            self.state.session = Some(SessionAnchor {
                day,
                price: bar.close,
            });
            self.state.last_processed_key = Some(bar.timestamp);
            debug!("{} {}: session anchored at {}", bar.symbol, bar.timestamp, bar.close);
            return TickReport::no_op(TickStatus::SessionAnchored, exposure);
        }

        let reading = reading.sanitized();
        let missing = self.requirements.missing(&reading);
        if !missing.is_empty() {
            debug!(
                "{} {}: insufficient history, missing {}",
                bar.symbol,
                bar.timestamp,
                missing.join(", ")
            );
            return TickReport::no_op(TickStatus::InsufficientHistory { missing }, exposure);
        }

        let direction = match (self.config.trend.reference, self.state.session) {
            (TrendReference::SessionOpen, Some(anchor)) => {
                self.classifier
                    .classify_session(anchor.price, bar.close, &reading)
            }
            _ => self.classifier.classify(bar.open, bar.close, &reading),
        };
        let params = self.calculator.compute(bar, &reading);
        let grid_step = match params {
            Params::Ready(grid) => Some(grid.grid_step),
            Params::Unavailable(_) => None,
        };

        let closed = self.run_exits(bar);

        let mut reanchored = None;
        let entry = match (direction, params) {
            (None, _) => EntryOutcome::NoSignal,
            (Some(_), Params::Unavailable(name)) => {
                debug!("{} {}: parameters unavailable ({name})", bar.symbol, bar.timestamp);
                EntryOutcome::ParamsUnavailable(name)
            }
            (Some(direction), Params::Ready(grid)) => {
                match self.rules.evaluate(
                    &self.state.ledger,
                    &mut self.state.budget,
                    day,
                    direction,
                    bar.close,
                    &grid,
                ) {
                    Ok(leg) => {
                        self.open_leg(bar, leg.clone());
                        reanchored = self.run_reanchor(bar);
                        EntryOutcome::Opened(leg)
                    }
                    Err(rejection) => {
                        debug!(
                            "{} {}: {direction} entry rejected: {rejection}",
                            bar.symbol, bar.timestamp
                        );
                        EntryOutcome::Rejected(rejection)
                    }
                }
            }
        };

        self.state.last_processed_key = Some(bar.timestamp);
        let exposure = self.state.verify_accounting();
        debug!(
            "{} {}: exposure={exposure:.4} legs={} risk={:.6}",
            bar.symbol,
            bar.timestamp,
            self.state.ledger.len(),
            self.state.total_risk()
        );

        TickReport {
            status: TickStatus::Processed,
            exposure,
            direction,
            closed,
            entry,
            grid_step,
            reanchored,
        }
    }

    fn run_exits(&mut self, bar: &Bar) -> Vec<ClosedLeg> {
        let closed = close_triggered(&mut self.state.ledger, bar.high, bar.low);
        if closed.is_empty() {
            return closed;
        }
        for c in &closed {
            info!(
                "{} {}: closed {} {} @ {} via {:?} at {} (pnl {:+.4})",
                bar.symbol,
                bar.timestamp,
                c.leg.direction(),
                c.leg.size(),
                c.leg.entry_price(),
                c.reason,
                c.exit_price,
                c.realized
            );
        }
        self.state.sync_with_ledger();
        closed
    }

    fn open_leg(&mut self, bar: &Bar, leg: Leg) {
        info!(
            "{} {}: opened {} {} @ {} tp={} sl={}",
            bar.symbol,
            bar.timestamp,
            leg.direction(),
            leg.size(),
            leg.entry_price(),
            leg.take_profit(),
            leg.stop_loss()
        );
        self.state.ledger.push(leg);
        self.state.sync_with_ledger();
        self.state.budget.record_open();
    }

    fn run_reanchor(&mut self, bar: &Bar) -> Option<f64> {
        let shared = reanchor(
            &mut self.state.ledger,
            self.config.grid.adjustment_threshold,
            self.config.grid.reanchor_pct,
        )?;
        info!(
            "{} {}: re-anchored {} legs to shared take-profit {shared}",
            bar.symbol,
            bar.timestamp,
            self.state.ledger.len()
        );
        Some(shared)
    }
}
