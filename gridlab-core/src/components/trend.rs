//! Trend classifier: raw direction plus an optional RSI/SMA confirmation gate.
//!
//! Pure: no state, no side effects. The same bar and readings always produce
//! the same answer.

use crate::components::indicator::IndicatorReading;
use crate::config::EngineConfig;
use crate::domain::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendClassifier {
    confirm: bool,
    use_short_sma: bool,
    overbought: f64,
    oversold: f64,
}

impl TrendClassifier {
    pub fn new(confirm: bool, use_short_sma: bool, overbought: f64, oversold: f64) -> Self {
        Self {
            confirm,
            use_short_sma,
            overbought,
            oversold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.trend.confirm,
            config.indicators.sma_short_period.is_some(),
            config.indicators.rsi_overbought,
            config.indicators.rsi_oversold,
        )
    }

    /// Bar-open rule: Long if the bar closed above its open, otherwise Short.
    pub fn classify(
        &self,
        open: f64,
        close: f64,
        reading: &IndicatorReading,
    ) -> Option<Direction> {
        let raw = if close > open {
            Direction::Long
        } else {
            Direction::Short
        };
        self.gate(raw, close, reading)
    }

    /// Session rule: direction of the close relative to the session's first
    /// close. An unchanged price carries no direction.
    pub fn classify_session(
        &self,
        session_open: f64,
        close: f64,
        reading: &IndicatorReading,
    ) -> Option<Direction> {
        let raw = if close > session_open {
            Direction::Long
        } else if close < session_open {
            Direction::Short
        } else {
            return None;
        };
        self.gate(raw, close, reading)
    }

    fn gate(&self, raw: Direction, close: f64, reading: &IndicatorReading) -> Option<Direction> {
        if !self.confirm || self.confirms(raw, close, reading) {
            Some(raw)
        } else {
            None
        }
    }

    /// Confirmation test. Missing readings never confirm.
    pub fn confirms(&self, direction: Direction, close: f64, reading: &IndicatorReading) -> bool {
        let (Some(rsi), Some(sma_long)) = (reading.rsi, reading.sma_long) else {
            return false;
        };
        let sma_short = if self.use_short_sma {
            match reading.sma_short {
                Some(v) => Some(v),
                None => return false,
            }
        } else {
            None
        };

        match direction {
            Direction::Long => {
                rsi < self.overbought
                    && close > sma_long
                    && sma_short.map_or(true, |s| s > sma_long)
            }
            Direction::Short => {
                rsi > self.oversold
                    && close < sma_long
                    && sma_short.map_or(true, |s| s < sma_long)
            }
        }
    }
}
