//! GridLab Core: incremental grid position manager for a single instrument.
//!
//! This crate contains:
//! - Domain types (bars, legs, directions)
//! - Indicators (ATR, RSI, SMA over closes and volume) and their precomputation
//! - Trend classification with an optional RSI/SMA confirmation gate
//! - Grid parameters, fixed or ATR/RSI/volume-driven
//! - The position grid: ledger, exits, entry gates, risk budget, re-anchoring
//! - The per-tick engine and a replay driver emitting aggregate exposure
//! - Configuration, presets and fingerprints
//! - CSV and synthetic bar sources

pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod grid;
pub mod indicators;

pub use config::{ConfigError, EngineConfig, GridPreset};
pub use domain::{Bar, Direction, Leg};
pub use engine::{replay, AllocationSink, GridEngine, ReplayResult, TickReport, TickStatus};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types can move between threads.
    ///
    /// A host may drive one engine per instrument from a worker pool. If any
    /// type here stops being Send + Sync, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Leg>();
        require_sync::<domain::Leg>();

        // Grid types
        require_send::<grid::Ledger>();
        require_sync::<grid::Ledger>();
        require_send::<grid::RiskBudget>();
        require_sync::<grid::RiskBudget>();
        require_send::<grid::ClosedLeg>();
        require_sync::<grid::ClosedLeg>();

        // Component types
        require_send::<components::IndicatorReading>();
        require_sync::<components::IndicatorReading>();
        require_send::<components::IndicatorValues>();
        require_sync::<components::IndicatorValues>();
        require_send::<components::TrendClassifier>();
        require_sync::<components::TrendClassifier>();
        require_send::<components::ParameterCalculator>();
        require_sync::<components::ParameterCalculator>();

        // Engine types
        require_send::<engine::GridEngine>();
        require_sync::<engine::GridEngine>();
        require_send::<engine::EngineState>();
        require_sync::<engine::EngineState>();
        require_send::<engine::TickReport>();
        require_sync::<engine::TickReport>();
        require_send::<engine::ReplayResult>();
        require_sync::<engine::ReplayResult>();
        require_send::<engine::GridIndicators>();
        require_sync::<engine::GridIndicators>();

        // Config types
        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();
        require_send::<fingerprint::ConfigHash>();
        require_sync::<fingerprint::ConfigHash>();
    }

    /// Architecture contract: trend classification and grid parameters are
    /// pure functions of the bar and its readings.
    ///
    /// Neither signature accepts engine state, so neither can read the ledger
    /// or the risk budget.
    #[test]
    fn classifier_and_calculator_take_no_engine_state() {
        fn _classify(
            c: &components::TrendClassifier,
            bar: &domain::Bar,
            reading: &components::IndicatorReading,
        ) -> Option<domain::Direction> {
            c.classify(bar.open, bar.close, reading)
        }
        fn _params(
            p: &components::ParameterCalculator,
            bar: &domain::Bar,
            reading: &components::IndicatorReading,
        ) -> components::Params {
            p.compute(bar, reading)
        }
    }
}
