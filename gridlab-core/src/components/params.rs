//! Dynamic parameter calculator: per-tick grid step, take-profit and
//! stop-loss distances, and leg size.
//!
//! # Formulas (dynamic mode)
//! ```text
//! vf          = clamp(ATR / close, clamp_min, clamp_max)
//! grid_step   = ATR * grid_multiplier * (1 + vf)
//! tp_distance = ATR * tp_mult(RSI)            [* (1 -/+ vf) when scaling]
//! sl_distance = ATR * sl_multiplier * (1 + vf)
//! size        = base_size * volume_multiplier  if volume > avg_volume * threshold
//!             = base_size                      otherwise
//!               capped at max_size
//! ```
//! `tp_mult` picks the overbought multiplier above the overbought band, the
//! oversold multiplier below the oversold band, and the normal one otherwise.
//! With scaling on, overbought distances shrink by `(1 - vf)` and oversold
//! distances stretch by `(1 + vf)`.
//!
//! The calculator never touches engine state.

use crate::components::indicator::IndicatorReading;
use crate::config::{DynamicParams, EngineConfig, FixedParams, SizingMode};
use crate::domain::Bar;

/// Distances and size for one tick. All strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub grid_step: f64,
    pub tp_distance: f64,
    pub sl_distance: f64,
    pub size: f64,
}

/// Outcome of a parameter computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Params {
    Ready(GridParams),
    /// A required reading is missing or degenerate; names the reading.
    Unavailable(&'static str),
}

impl Params {
    pub fn ready(self) -> Option<GridParams> {
        match self {
            Params::Ready(p) => Some(p),
            Params::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCalculator {
    mode: SizingMode,
    base_size: f64,
    max_size: f64,
    overbought: f64,
    oversold: f64,
}

impl ParameterCalculator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            mode: config.sizing.clone(),
            base_size: config.grid.base_size,
            max_size: config.grid.max_size,
            overbought: config.indicators.rsi_overbought,
            oversold: config.indicators.rsi_oversold,
        }
    }

    pub fn compute(&self, bar: &Bar, reading: &IndicatorReading) -> Params {
        match &self.mode {
            SizingMode::Fixed(fixed) => Params::Ready(self.fixed(fixed)),
            SizingMode::Dynamic(dynamic) => self.dynamic(dynamic, bar, reading),
        }
    }

    fn fixed(&self, p: &FixedParams) -> GridParams {
        GridParams {
            grid_step: p.grid_step,
            tp_distance: p.tp_distance,
            sl_distance: p.sl_distance,
            size: self.base_size.min(self.max_size),
        }
    }

    fn dynamic(&self, p: &DynamicParams, bar: &Bar, reading: &IndicatorReading) -> Params {
        let Some(atr) = reading.atr else {
            return Params::Unavailable("atr");
        };
        let Some(rsi) = reading.rsi else {
            return Params::Unavailable("rsi");
        };
        let Some(avg_volume) = reading.avg_volume else {
            return Params::Unavailable("avg_volume");
        };
        // A flat ATR would collapse every distance to zero.
        if !(atr.is_finite() && atr > 0.0) {
            return Params::Unavailable("atr");
        }
        if !(bar.close.is_finite() && bar.close > 0.0) {
            return Params::Unavailable("close");
        }

        let vf = volatility_factor(atr, bar.close, p.volatility_clamp_min, p.volatility_clamp_max);

        let tp_mult = if rsi > self.overbought {
            let scale = if p.tp_volatility_scaling { 1.0 - vf } else { 1.0 };
            p.tp_multiplier_overbought * scale
        } else if rsi < self.oversold {
            let scale = if p.tp_volatility_scaling { 1.0 + vf } else { 1.0 };
            p.tp_multiplier_oversold * scale
        } else {
            p.tp_multiplier_normal
        };

        let boosted = bar.volume > avg_volume * p.volume_threshold;
        let size = if boosted {
            self.base_size * p.volume_multiplier
        } else {
            self.base_size
        };

        Params::Ready(GridParams {
            grid_step: atr * p.grid_multiplier * (1.0 + vf),
            tp_distance: atr * tp_mult,
            sl_distance: atr * p.sl_multiplier * (1.0 + vf),
            size: size.min(self.max_size),
        })
    }
}

/// `ATR / close` clamped into `[min, max]`.
pub fn volatility_factor(atr: f64, close: f64, min: f64, max: f64) -> f64 {
    (atr / close).clamp(min, max)
}
