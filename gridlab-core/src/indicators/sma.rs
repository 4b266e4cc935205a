//! Simple Moving Average (SMA) over closes or volume.
//!
//! Rolling mean over a fixed window. The first valid value sits at index
//! `period - 1`; any NaN inside the window makes that output NaN.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

/// Which bar field the average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmaSource {
    Close,
    Volume,
}

impl SmaSource {
    fn read(self, bar: &Bar) -> f64 {
        match self {
            SmaSource::Close => bar.close,
            SmaSource::Volume => bar.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: SmaSource,
    name: String,
}

impl Sma {
    /// SMA of closing prices.
    pub fn new(period: usize) -> Self {
        Self::with_source(period, SmaSource::Close)
    }

    /// SMA of traded volume, used as the average-volume baseline.
    pub fn of_volume(period: usize) -> Self {
        Self::with_source(period, SmaSource::Volume)
    }

    pub fn with_source(period: usize, source: SmaSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let name = match source {
            SmaSource::Close => format!("sma_{period}"),
            SmaSource::Volume => format!("volume_sma_{period}"),
        };
        Self {
            period,
            source,
            name,
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let values: Vec<f64> = bars.iter().map(|b| self.source.read(b)).collect();
        let mut result = vec![f64::NAN; values.len()];

        // Running sum over finite values plus a count of NaNs in the window,
        // so a NaN leaving the window re-enables output without a rescan.
        let mut sum = 0.0;
        let mut nan_count = 0usize;

        for (i, &entering) in values.iter().enumerate() {
            if entering.is_nan() {
                nan_count += 1;
            } else {
                sum += entering;
            }

            if i >= self.period {
                let leaving = values[i - self.period];
                if leaving.is_nan() {
                    nan_count -= 1;
                } else {
                    sum -= leaving;
                }
            }

            if i + 1 >= self.period && nan_count == 0 {
                result[i] = sum / self.period as f64;
            }
        }

        result
    }
}
