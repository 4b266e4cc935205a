//! Named presets: the recurring strategy variants as configurations.

use super::{
    DynamicParams, EngineConfig, FixedParams, GridConfig, IndicatorConfig, SizingMode,
    TrendConfig, TrendReference,
};

/// Named engine presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPreset {
    /// Daily gold grid with constant distances and bar-open trend.
    GoldFixedGrid,
    /// Intraday gold grid measuring trend against the session's first close.
    GoldSessionGrid,
    /// ATR/RSI/volume-driven grid with the confirmation gate enabled.
    AdaptiveGrid,
}

impl GridPreset {
    pub const ALL: [GridPreset; 3] = [
        GridPreset::GoldFixedGrid,
        GridPreset::GoldSessionGrid,
        GridPreset::AdaptiveGrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GoldFixedGrid => "gold_fixed_grid",
            Self::GoldSessionGrid => "gold_session_grid",
            Self::AdaptiveGrid => "adaptive_grid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GoldFixedGrid => "fixed 1.0 step / 0.8 TP / 20.0 SL, 0.01 lots, up to 17 legs",
            Self::GoldSessionGrid => "fixed distances, trend vs. first close of each day",
            Self::AdaptiveGrid => "ATR-scaled step/TP/SL, RSI-banded TP, volume-boosted size",
        }
    }

    /// Convert to a full `EngineConfig`.
    pub fn to_config(self) -> EngineConfig {
        match self {
            Self::GoldFixedGrid => EngineConfig {
                symbol: "GLD".into(),
                grid: GridConfig::default(),
                sizing: SizingMode::Fixed(FixedParams::default()),
                trend: TrendConfig::default(),
                indicators: IndicatorConfig::default(),
            },
            Self::GoldSessionGrid => EngineConfig {
                symbol: "GLD".into(),
                grid: GridConfig::default(),
                sizing: SizingMode::Fixed(FixedParams::default()),
                trend: TrendConfig {
                    reference: TrendReference::SessionOpen,
                    confirm: false,
                },
                indicators: IndicatorConfig::default(),
            },
            Self::AdaptiveGrid => EngineConfig {
                symbol: "GLD".into(),
                grid: GridConfig {
                    max_total_positions: 12,
                    max_positions_per_direction: 8,
                    base_size: 0.02,
                    max_size: 0.05,
                    adjustment_threshold: 6,
                    reanchor_pct: 0.70,
                    max_daily_positions: 3,
                    max_total_risk: 0.05,
                },
                sizing: SizingMode::Dynamic(DynamicParams {
                    tp_volatility_scaling: true,
                    ..DynamicParams::default()
                }),
                trend: TrendConfig {
                    reference: TrendReference::BarOpen,
                    confirm: true,
                },
                indicators: IndicatorConfig {
                    sma_short_period: Some(20),
                    sma_long_period: 50,
                    ..IndicatorConfig::default()
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for preset in GridPreset::ALL {
            preset
                .to_config()
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {e}", preset.name()));
        }
    }

    #[test]
    fn names_roundtrip() {
        for preset in GridPreset::ALL {
            assert_eq!(GridPreset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(GridPreset::from_name("martingale"), None);
    }

    #[test]
    fn presets_have_distinct_fingerprints() {
        let a = GridPreset::GoldFixedGrid.to_config().fingerprint();
        let b = GridPreset::GoldSessionGrid.to_config().fingerprint();
        let c = GridPreset::AdaptiveGrid.to_config().fingerprint();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }
}
