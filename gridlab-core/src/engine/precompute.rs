//! Indicator precomputation for a replay.
//!
//! Every series is computed once over the full bar history before the first
//! tick, then sliced into one `IndicatorReading` per bar. Each indicator only
//! reads bars up to and including its own index, so reading `t` never sees
//! bar `t + 1`.

use crate::components::indicator::{Indicator, IndicatorReading, IndicatorValues};
use crate::config::IndicatorConfig;
use crate::domain::Bar;
use crate::indicators::{Atr, Rsi, Sma};

/// The indicator set the grid engine reads, built from configuration.
#[derive(Debug, Clone)]
pub struct GridIndicators {
    atr: Atr,
    rsi: Rsi,
    sma_short: Option<Sma>,
    sma_long: Sma,
    avg_volume: Sma,
}

impl GridIndicators {
    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self {
            atr: Atr::new(config.atr_period),
            rsi: Rsi::new(config.rsi_period),
            sma_short: config.sma_short_period.map(Sma::new),
            sma_long: Sma::new(config.sma_long_period),
            avg_volume: Sma::of_volume(config.volume_window),
        }
    }

    fn all(&self) -> Vec<&dyn Indicator> {
        let mut list: Vec<&dyn Indicator> =
            vec![&self.atr, &self.rsi, &self.sma_long, &self.avg_volume];
        if let Some(short) = &self.sma_short {
            list.push(short);
        }
        list
    }

    /// Longest lookback across the set: bars before every reading can exist.
    pub fn warmup(&self) -> usize {
        self.all().iter().map(|i| i.lookback()).max().unwrap_or(0)
    }

    /// Compute every series over `bars`.
    pub fn compute_values(&self, bars: &[Bar]) -> IndicatorValues {
        let mut values = IndicatorValues::new();
        for indicator in self.all() {
            let series = indicator.compute(bars);
            debug_assert_eq!(
                series.len(),
                bars.len(),
                "indicator '{}' produced {} values for {} bars",
                indicator.name(),
                series.len(),
                bars.len()
            );
            values.insert(indicator.name(), series);
        }
        values
    }

    /// One reading per bar. Warmup and NaN positions read as `None`.
    pub fn precompute(&self, bars: &[Bar]) -> Vec<IndicatorReading> {
        let values = self.compute_values(bars);
        (0..bars.len())
            .map(|t| IndicatorReading {
                atr: values.get_valid(self.atr.name(), t),
                rsi: values.get_valid(self.rsi.name(), t),
                sma_short: self
                    .sma_short
                    .as_ref()
                    .and_then(|s| values.get_valid(s.name(), t)),
                sma_long: values.get_valid(self.sma_long.name(), t),
                avg_volume: values.get_valid(self.avg_volume.name(), t),
            })
            .collect()
    }
}
