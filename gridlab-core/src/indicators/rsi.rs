//! Relative Strength Index (RSI).
//!
//! Wilder-smoothed average gain and loss of close-to-close changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss). Lookback: period.
//! Flat history reads 50; all gains read 100; all losses read 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (false, true) => 100.0,
        (true, false) => 0.0,
        (false, false) => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        let p = self.period as f64;

        let mut gain = 0.0;
        let mut loss = 0.0;
        let mut seen = 0usize;

        for i in 1..bars.len() {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                gain = 0.0;
                loss = 0.0;
                seen = 0;
                continue;
            }

            let up = change.max(0.0);
            let down = (-change).max(0.0);
            seen += 1;

            if seen <= self.period {
                gain += up;
                loss += down;
                if seen < self.period {
                    continue;
                }
                gain /= p;
                loss /= p;
            } else {
                gain = (gain * (p - 1.0) + up) / p;
                loss = (loss * (p - 1.0) + down) / p;
            }

            result[i] = rsi_from_averages(gain, loss);
        }

        result
    }
}
