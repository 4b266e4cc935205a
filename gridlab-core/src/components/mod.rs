//! Per-tick components feeding the grid engine.
//!
//! - Indicator trait and readings: precomputed numeric series, one reading per bar
//! - Trend classifier: directional signal with an optional confirmation gate
//! - Parameter calculator: grid step, take-profit/stop-loss distances, leg size

pub mod indicator;
pub mod params;
pub mod trend;

pub use indicator::{Indicator, IndicatorReading, IndicatorValues};
pub use params::{GridParams, ParameterCalculator, Params};
pub use trend::TrendClassifier;
