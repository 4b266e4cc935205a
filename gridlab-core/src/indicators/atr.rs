//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR seeds with the mean of the first `period` true ranges, then applies
//! Wilder smoothing (alpha = 1/period). The first bar has no previous close
//! and contributes no true range, so the first value sits at index `period`.
//!
//! A void bar breaks the chain: output is NaN until `period` clean true ranges
//! have been seen again.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// True range of `bar` given the previous bar's close.
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    let hl = bar.high - bar.low;
    let hc = (bar.high - prev_close).abs();
    let lc = (bar.low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Wilder smoothing state: seeding phase, then recursive average.
#[derive(Debug, Clone, Copy)]
enum Smoother {
    Seeding { sum: f64, count: usize },
    Running(f64),
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        let alpha = 1.0 / self.period as f64;
        let mut state = Smoother::Seeding { sum: 0.0, count: 0 };

        for i in 1..bars.len() {
            let tr = true_range(&bars[i], bars[i - 1].close);
            // f64::max drops NaN operands, so check the inputs directly.
            if bars[i].high.is_nan() || bars[i].low.is_nan() || bars[i - 1].close.is_nan() {
                state = Smoother::Seeding { sum: 0.0, count: 0 };
                continue;
            }

            state = match state {
                Smoother::Seeding { sum, count } => {
                    let (sum, count) = (sum + tr, count + 1);
                    if count == self.period {
                        let seed = sum / self.period as f64;
                        result[i] = seed;
                        Smoother::Running(seed)
                    } else {
                        Smoother::Seeding { sum, count }
                    }
                }
                Smoother::Running(prev) => {
                    let next = alpha * tr + (1.0 - alpha) * prev;
                    result[i] = next;
                    Smoother::Running(next)
                }
            };
        }

        result
    }
}
