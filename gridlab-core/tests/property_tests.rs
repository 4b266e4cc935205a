//! Property tests for engine invariants.
//!
//! Uses proptest to drive random bar paths through the engine and verify,
//! after every tick:
//! 1. Exposure accounting: tracked exposure equals the ledger's size sum
//! 2. Risk accounting: tracked risk equals the ledger's risk sum
//! 3. Caps: total, per-direction, per-day and aggregate risk limits hold
//! 4. Grid spacing: each new leg clears the tick's grid step against the previous last leg
//! 5. Re-anchoring: all legs share one take-profit right after it fires
//! 6. Idempotence: replaying the same bar changes nothing

use chrono::{Duration, NaiveDate, NaiveDateTime};
use gridlab_core::components::IndicatorReading;
use gridlab_core::config::{EngineConfig, GridPreset, SizingMode};
use gridlab_core::domain::{Bar, Direction};
use gridlab_core::engine::{GridEngine, GridIndicators, TickStatus};
use proptest::prelude::*;
use std::collections::HashMap;

const EPS: f64 = 1e-9;

/// Equality within `EPS` relative to the magnitude of `expected`.
fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= EPS * expected.abs().max(1.0)
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// One step of a bar path: close-to-close move, wick extensions, volume,
/// and whether the bar starts a new calendar day.
#[derive(Debug, Clone)]
struct Step {
    ret: f64,
    up_wick: f64,
    down_wick: f64,
    volume: f64,
    new_day: bool,
}

fn arb_step() -> impl Strategy<Value = Step> {
    (
        -0.02..0.02_f64,
        0.0..0.01_f64,
        0.0..0.01_f64,
        100.0..10_000.0_f64,
        proptest::bool::weighted(0.4),
    )
        .prop_map(|(ret, up_wick, down_wick, volume, new_day)| Step {
            ret,
            up_wick,
            down_wick,
            volume,
            new_day,
        })
}

fn arb_path() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(arb_step(), 20..160)
}

fn build_bars(steps: &[Step]) -> Vec<Bar> {
    let mut timestamp: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let mut price = 100.0_f64;
    let mut bars = Vec::with_capacity(steps.len());
    for step in steps {
        let open = price;
        let close = price * (1.0 + step.ret);
        bars.push(Bar {
            symbol: "GLD".into(),
            timestamp,
            open,
            high: open.max(close) * (1.0 + step.up_wick),
            low: open.min(close) * (1.0 - step.down_wick),
            close,
            volume: step.volume,
        });
        price = close;
        timestamp = if step.new_day {
            (timestamp.date() + Duration::days(1))
                .and_hms_opt(9, 0, 0)
                .unwrap()
        } else {
            timestamp + Duration::hours(1)
        };
    }
    bars
}

/// Fixed-distance config with tight caps so every limit gets exercised.
fn tight_fixed_config() -> EngineConfig {
    let mut config = GridPreset::GoldFixedGrid.to_config();
    config.grid.max_total_positions = 6;
    config.grid.max_positions_per_direction = 4;
    config.grid.max_daily_positions = 3;
    config.grid.adjustment_threshold = 3;
    config.grid.max_total_risk = 0.0015;
    if let SizingMode::Fixed(ref mut f) = config.sizing {
        f.grid_step = 0.5;
        f.tp_distance = 1.5;
        f.sl_distance = 4.0;
    }
    config
}

/// Adaptive preset with short indicator periods so readings arrive quickly.
fn fast_adaptive_config() -> EngineConfig {
    let mut config = GridPreset::AdaptiveGrid.to_config();
    config.trend.confirm = false;
    config.indicators.atr_period = 5;
    config.indicators.rsi_period = 5;
    config.indicators.sma_short_period = Some(3);
    config.indicators.sma_long_period = 8;
    config.indicators.volume_window = 5;
    config.grid.max_total_risk = 0.2;
    config
}

/// Adaptive config with share-count sizes and a volume boost that mixes them.
fn large_size_adaptive_config() -> EngineConfig {
    let mut config = fast_adaptive_config();
    config.grid.base_size = 123_456.789;
    config.grid.max_size = 1e9;
    config.grid.max_total_risk = 1e9;
    if let SizingMode::Dynamic(ref mut d) = config.sizing {
        d.volume_multiplier = 1.37;
    }
    config
}

/// Drive `bars` through an engine, checking every invariant after each tick.
fn check_invariants(config: &EngineConfig, bars: &[Bar]) -> Result<(), TestCaseError> {
    let mut engine = GridEngine::new(config.clone()).unwrap();
    let readings = GridIndicators::from_config(&config.indicators).precompute(bars);
    let mut opened_per_day: HashMap<NaiveDate, usize> = HashMap::new();

    for (bar, reading) in bars.iter().zip(&readings) {
        let last_before = engine.ledger().last().map(|l| l.entry_price());
        let report = engine.on_bar(bar, reading);
        let ledger = engine.ledger();
        let g = &config.grid;

        // 1 + 2: accounting identities
        prop_assert!(approx(engine.total_exposure(), ledger.total_size()));
        prop_assert!(approx(engine.state().total_risk(), ledger.total_risk()));
        prop_assert_eq!(report.exposure, engine.total_exposure());

        // 3: caps
        prop_assert!(ledger.len() <= g.max_total_positions);
        prop_assert!(ledger.count(Direction::Long) <= g.max_positions_per_direction);
        prop_assert!(ledger.count(Direction::Short) <= g.max_positions_per_direction);

        if let Some(leg) = report.opened() {
            let count = opened_per_day.entry(bar.day()).or_default();
            *count += 1;
            prop_assert!(*count <= g.max_daily_positions);
            prop_assert!(engine.state().total_risk() <= g.max_total_risk * (1.0 + EPS));
            prop_assert_eq!(leg.entry_price(), bar.close);

            // 4: spacing, with the tick's own grid step, against the leg that
            // was last before this open, unless exits ran first
            prop_assert!(report.grid_step.is_some());
            if let (Some(step), Some(prev)) = (report.grid_step, last_before) {
                if report.closed.is_empty() {
                    match leg.direction() {
                        Direction::Long => prop_assert!(leg.entry_price() < prev - step),
                        Direction::Short => prop_assert!(leg.entry_price() > prev + step),
                    }
                }
            }
        }

        // 5: re-anchoring uniformity
        if let Some(shared) = report.reanchored {
            prop_assert!(ledger.len() > g.adjustment_threshold);
            prop_assert!(ledger.iter().all(|l| l.take_profit() == shared));
        }

        // 6: idempotence on the processed key
        if report.status == TickStatus::Processed || report.status == TickStatus::SessionAnchored {
            let snapshot = ledger.clone();
            let again = engine.on_bar(bar, reading);
            prop_assert_eq!(&again.status, &TickStatus::Duplicate);
            prop_assert_eq!(again.exposure, report.exposure);
            prop_assert!(again.closed.is_empty());
            prop_assert!(again.opened().is_none());
            prop_assert_eq!(engine.ledger(), &snapshot);
        }
    }
    Ok(())
}

// ── Invariants across configurations ────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fixed_grid_invariants(steps in arb_path()) {
        let bars = build_bars(&steps);
        check_invariants(&tight_fixed_config(), &bars)?;
    }

    #[test]
    fn session_grid_invariants(steps in arb_path()) {
        let bars = build_bars(&steps);
        let mut config = GridPreset::GoldSessionGrid.to_config();
        config.grid.max_daily_positions = 4;
        config.grid.adjustment_threshold = 4;
        check_invariants(&config, &bars)?;
    }

    #[test]
    fn adaptive_grid_invariants(steps in arb_path()) {
        let bars = build_bars(&steps);
        check_invariants(&fast_adaptive_config(), &bars)?;
    }

    #[test]
    fn large_size_adaptive_invariants(steps in arb_path()) {
        let bars = build_bars(&steps);
        check_invariants(&large_size_adaptive_config(), &bars)?;
    }

    /// Missing readings never mutate state and never record the bar key.
    #[test]
    fn insufficient_history_is_inert(steps in arb_path()) {
        let bars = build_bars(&steps);
        let mut engine = GridEngine::new(GridPreset::AdaptiveGrid.to_config()).unwrap();
        for bar in &bars {
            let report = engine.on_bar(bar, &IndicatorReading::default());
            let is_insufficient =
                matches!(report.status, TickStatus::InsufficientHistory { .. });
            prop_assert!(is_insufficient);
            prop_assert_eq!(report.exposure, 0.0);
        }
        prop_assert!(engine.ledger().is_empty());
        prop_assert_eq!(engine.state().last_processed_key(), None);
    }

    /// Two engines fed the same bars emit the same exposure stream.
    #[test]
    fn replay_is_deterministic(steps in arb_path()) {
        let bars = build_bars(&steps);
        let config = tight_fixed_config();
        let mut a = GridEngine::new(config.clone()).unwrap();
        let mut b = GridEngine::new(config).unwrap();
        let none = IndicatorReading::default();
        for bar in &bars {
            prop_assert_eq!(a.on_bar(bar, &none), b.on_bar(bar, &none));
        }
    }
}
