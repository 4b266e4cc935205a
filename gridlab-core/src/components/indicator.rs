//! Indicator trait, precomputed indicator values container, and the per-bar
//! reading handed to the grid engine.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They are precomputed once before replay and fed per-bar into the engine.
//! No recomputation on each bar.

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values should be `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator values.
///
/// Built once before replay, then queried by bar index.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Get the indicator value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Get the value at `bar_index`, treating warmup NaN as unavailable.
    pub fn get_valid(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name, bar_index).filter(|v| v.is_finite())
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Indicator readings for a single bar.
///
/// Each field is `None` while its series is still warming up (or was never
/// configured). The engine decides per tick which readings it requires.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorReading {
    pub atr: Option<f64>,
    pub rsi: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub avg_volume: Option<f64>,
}

impl IndicatorReading {
    /// Drop non-finite values so NaN from an external source reads as unavailable.
    pub fn sanitized(self) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            atr: finite(self.atr),
            rsi: finite(self.rsi),
            sma_short: finite(self.sma_short),
            sma_long: finite(self.sma_long),
            avg_volume: finite(self.avg_volume),
        }
    }
}
