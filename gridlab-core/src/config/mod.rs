//! Engine configuration: every constant the grid engine reads, with validation.
//!
//! Configs load from TOML (one table per section) and are validated before an
//! engine is built. Source strategy variants are expressed as presets
//! (`GridPreset`) rather than separate code paths.

pub mod preset;

pub use preset::GridPreset;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be >= 1")]
    ZeroCount { field: &'static str },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),

    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Instrument the engine manages. Used for log context and output rows.
    pub symbol: String,
    pub grid: GridConfig,
    pub sizing: SizingMode,
    pub trend: TrendConfig,
    pub indicators: IndicatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        GridPreset::GoldFixedGrid.to_config()
    }
}

/// Caps, budget and re-anchoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub max_total_positions: usize,
    pub max_positions_per_direction: usize,
    /// Size of a leg before any volume boost.
    pub base_size: f64,
    /// Upper bound on a single leg's size.
    pub max_size: f64,
    /// Re-anchoring fires once the ledger holds more legs than this.
    pub adjustment_threshold: usize,
    /// Fraction of the first-to-last entry spread added to the last entry.
    pub reanchor_pct: f64,
    pub max_daily_positions: usize,
    /// Cap on the sum of per-leg fractional risk.
    pub max_total_risk: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_total_positions: 17,
            max_positions_per_direction: 17,
            base_size: 0.01,
            max_size: 0.05,
            adjustment_threshold: 6,
            reanchor_pct: 0.70,
            max_daily_positions: 17,
            max_total_risk: 1.0,
        }
    }
}

/// How grid step, take-profit, stop-loss and size are derived each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingMode {
    /// Constant distances in price units.
    Fixed(FixedParams),
    /// ATR/RSI/volume-driven distances.
    Dynamic(DynamicParams),
}

impl Default for SizingMode {
    fn default() -> Self {
        SizingMode::Fixed(FixedParams::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedParams {
    pub grid_step: f64,
    pub tp_distance: f64,
    pub sl_distance: f64,
}

impl Default for FixedParams {
    fn default() -> Self {
        Self {
            grid_step: 1.0,
            tp_distance: 0.8,
            sl_distance: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicParams {
    pub grid_multiplier: f64,
    pub tp_multiplier_normal: f64,
    pub tp_multiplier_overbought: f64,
    pub tp_multiplier_oversold: f64,
    pub sl_multiplier: f64,
    /// Size multiplier applied on above-average volume.
    pub volume_multiplier: f64,
    /// Volume must exceed `avg_volume * volume_threshold` to boost size.
    pub volume_threshold: f64,
    pub volatility_clamp_min: f64,
    pub volatility_clamp_max: f64,
    /// Shrink overbought and stretch oversold take-profits by the volatility factor.
    pub tp_volatility_scaling: bool,
}

impl Default for DynamicParams {
    fn default() -> Self {
        Self {
            grid_multiplier: 0.5,
            tp_multiplier_normal: 1.0,
            tp_multiplier_overbought: 0.7,
            tp_multiplier_oversold: 1.3,
            sl_multiplier: 3.0,
            volume_multiplier: 1.5,
            volume_threshold: 1.2,
            volatility_clamp_min: 0.001,
            volatility_clamp_max: 0.05,
            tp_volatility_scaling: false,
        }
    }
}

/// Price the raw trend direction is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendReference {
    /// Close versus the bar's own open.
    BarOpen,
    /// Close versus the first close of the calendar day.
    SessionOpen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub reference: TrendReference,
    /// Require RSI and SMA agreement before a raw direction counts.
    pub confirm: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            reference: TrendReference::BarOpen,
            confirm: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub atr_period: usize,
    pub rsi_period: usize,
    /// Optional fast SMA for the confirmation gate.
    pub sma_short_period: Option<usize>,
    pub sma_long_period: usize,
    /// Window for the average-volume baseline.
    pub volume_window: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            rsi_period: 14,
            sma_short_period: None,
            sma_long_period: 50,
            volume_window: 20,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::ZeroCount { field })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl EngineConfig {
    /// Load a config from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject any configuration that would produce undefined sizing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        nonzero("grid.max_total_positions", g.max_total_positions)?;
        nonzero("grid.max_positions_per_direction", g.max_positions_per_direction)?;
        nonzero("grid.max_daily_positions", g.max_daily_positions)?;
        nonzero("grid.adjustment_threshold", g.adjustment_threshold)?;
        positive("grid.base_size", g.base_size)?;
        positive("grid.max_size", g.max_size)?;
        positive("grid.max_total_risk", g.max_total_risk)?;
        positive("grid.reanchor_pct", g.reanchor_pct)?;
        in_range("grid.reanchor_pct", g.reanchor_pct, 0.0, 1.0)?;
        if g.max_size < g.base_size {
            return Err(ConfigError::Inconsistent(format!(
                "grid.max_size {} is below grid.base_size {}",
                g.max_size, g.base_size
            )));
        }

        match &self.sizing {
            SizingMode::Fixed(f) => {
                positive("sizing.grid_step", f.grid_step)?;
                positive("sizing.tp_distance", f.tp_distance)?;
                positive("sizing.sl_distance", f.sl_distance)?;
            }
            SizingMode::Dynamic(d) => {
                positive("sizing.grid_multiplier", d.grid_multiplier)?;
                positive("sizing.tp_multiplier_normal", d.tp_multiplier_normal)?;
                positive("sizing.tp_multiplier_overbought", d.tp_multiplier_overbought)?;
                positive("sizing.tp_multiplier_oversold", d.tp_multiplier_oversold)?;
                positive("sizing.sl_multiplier", d.sl_multiplier)?;
                positive("sizing.volume_multiplier", d.volume_multiplier)?;
                positive("sizing.volume_threshold", d.volume_threshold)?;
                // The upper clamp stays below 1 so (1 - factor) scaling keeps
                // take-profit distances strictly positive.
                in_range("sizing.volatility_clamp_min", d.volatility_clamp_min, 0.0, 0.99)?;
                in_range("sizing.volatility_clamp_max", d.volatility_clamp_max, 0.0, 0.99)?;
                if d.volatility_clamp_min > d.volatility_clamp_max {
                    return Err(ConfigError::Inconsistent(format!(
                        "sizing.volatility_clamp_min {} exceeds volatility_clamp_max {}",
                        d.volatility_clamp_min, d.volatility_clamp_max
                    )));
                }
            }
        }

        let ind = &self.indicators;
        nonzero("indicators.atr_period", ind.atr_period)?;
        nonzero("indicators.rsi_period", ind.rsi_period)?;
        nonzero("indicators.sma_long_period", ind.sma_long_period)?;
        nonzero("indicators.volume_window", ind.volume_window)?;
        if let Some(short) = ind.sma_short_period {
            nonzero("indicators.sma_short_period", short)?;
            if short >= ind.sma_long_period {
                return Err(ConfigError::Inconsistent(format!(
                    "indicators.sma_short_period {short} must be below sma_long_period {}",
                    ind.sma_long_period
                )));
            }
        }
        in_range("indicators.rsi_oversold", ind.rsi_oversold, 0.0, 100.0)?;
        in_range("indicators.rsi_overbought", ind.rsi_overbought, 0.0, 100.0)?;
        if ind.rsi_oversold >= ind.rsi_overbought {
            return Err(ConfigError::Inconsistent(format!(
                "indicators.rsi_oversold {} must be below rsi_overbought {}",
                ind.rsi_oversold, ind.rsi_overbought
            )));
        }

        Ok(())
    }

    /// Indicator readings a tick cannot proceed without.
    pub fn requirements(&self) -> Requirements {
        let dynamic = matches!(self.sizing, SizingMode::Dynamic(_));
        let confirm = self.trend.confirm;
        Requirements {
            atr: dynamic,
            rsi: dynamic || confirm,
            sma_long: confirm,
            sma_short: confirm && self.indicators.sma_short_period.is_some(),
            avg_volume: dynamic,
        }
    }
}

/// Which indicator readings must be present for a tick to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Requirements {
    pub atr: bool,
    pub rsi: bool,
    pub sma_short: bool,
    pub sma_long: bool,
    pub avg_volume: bool,
}

impl Requirements {
    /// Names of required readings that `reading` lacks.
    pub fn missing(&self, reading: &crate::components::IndicatorReading) -> Vec<&'static str> {
        let checks = [
            (self.atr, reading.atr, "atr"),
            (self.rsi, reading.rsi, "rsi"),
            (self.sma_short, reading.sma_short, "sma_short"),
            (self.sma_long, reading.sma_long, "sma_long"),
            (self.avg_volume, reading.avg_volume, "avg_volume"),
        ];
        checks
            .into_iter()
            .filter(|(required, value, _)| *required && value.is_none())
            .map(|(_, _, name)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::IndicatorReading;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_total_risk_is_rejected() {
        let mut config = EngineConfig::default();
        config.grid.max_total_risk = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "grid.max_total_risk",
                ..
            }
        ));
    }

    #[test]
    fn negative_multiplier_is_rejected() {
        let mut config = GridPreset::AdaptiveGrid.to_config();
        if let SizingMode::Dynamic(ref mut d) = config.sizing {
            d.sl_multiplier = -1.0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_grid_step_is_rejected() {
        let mut config = EngineConfig::default();
        config.sizing = SizingMode::Fixed(FixedParams {
            grid_step: f64::NAN,
            ..FixedParams::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn max_size_below_base_is_rejected() {
        let mut config = EngineConfig::default();
        config.grid.max_size = config.grid.base_size / 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Inconsistent(_))
        ));
    }

    #[test]
    fn inverted_volatility_clamp_is_rejected() {
        let mut config = GridPreset::AdaptiveGrid.to_config();
        if let SizingMode::Dynamic(ref mut d) = config.sizing {
            d.volatility_clamp_min = 0.2;
            d.volatility_clamp_max = 0.1;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_sma_must_be_faster() {
        let mut config = GridPreset::AdaptiveGrid.to_config();
        config.indicators.sma_short_period = Some(config.indicators.sma_long_period);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = r#"
symbol = "GLD"

[grid]
max_total_positions = 5

[sizing]
mode = "fixed"
grid_step = 2.5
"#;
        let config = EngineConfig::from_toml(text).unwrap();
        assert_eq!(config.grid.max_total_positions, 5);
        assert_eq!(config.grid.adjustment_threshold, 6);
        match config.sizing {
            SizingMode::Fixed(f) => {
                assert_eq!(f.grid_step, 2.5);
                assert_eq!(f.tp_distance, 0.8);
            }
            other => panic!("expected fixed sizing, got {other:?}"),
        }
    }

    #[test]
    fn invalid_toml_values_fail_validation() {
        let text = r#"
[grid]
max_total_positions = 0
"#;
        assert!(matches!(
            EngineConfig::from_toml(text),
            Err(ConfigError::ZeroCount { .. })
        ));
    }

    #[test]
    fn fixed_mode_requires_no_indicators() {
        let req = EngineConfig::default().requirements();
        assert_eq!(req, Requirements::default());
        assert!(req.missing(&IndicatorReading::default()).is_empty());
    }

    #[test]
    fn dynamic_confirmed_mode_requires_everything_configured() {
        let config = GridPreset::AdaptiveGrid.to_config();
        let req = config.requirements();
        let missing = req.missing(&IndicatorReading::default());
        assert!(missing.contains(&"atr"));
        assert!(missing.contains(&"rsi"));
        assert!(missing.contains(&"sma_long"));
        assert!(missing.contains(&"avg_volume"));
        assert_eq!(
            missing.contains(&"sma_short"),
            config.indicators.sma_short_period.is_some()
        );
    }
}
