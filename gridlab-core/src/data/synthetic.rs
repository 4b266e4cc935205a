//! Seeded synthetic bars for demos, tests and benchmarks.
//!
//! A multiplicative random walk from a fixed starting price. Weekends are
//! skipped. The same seed always yields the same series.

use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START_PRICE: f64 = 180.0;
/// Intraday bars run from 09:00 to 16:00 inclusive.
const SESSION_HOURS: std::ops::RangeInclusive<u32> = 9..=16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInterval {
    /// One bar per weekday at midnight.
    Daily,
    /// Eight hourly bars per weekday.
    Hourly,
}

fn timestamps(interval: BarInterval, count: usize) -> Vec<NaiveDateTime> {
    let mut out = Vec::with_capacity(count);
    let Some(mut day) = NaiveDate::from_ymd_opt(2024, 1, 2) else {
        return out;
    };
    while out.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let hours: Vec<u32> = match interval {
                BarInterval::Daily => vec![0],
                BarInterval::Hourly => SESSION_HOURS.collect(),
            };
            for hour in hours {
                if out.len() == count {
                    break;
                }
                if let Some(ts) = day.and_hms_opt(hour, 0, 0) {
                    out.push(ts);
                }
            }
        }
        day += Duration::days(1);
    }
    out
}

/// Generate `count` bars for `symbol` starting 2024-01-02.
pub fn generate_synthetic_bars(
    symbol: &str,
    interval: BarInterval,
    count: usize,
    seed: u64,
) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_move = match interval {
        BarInterval::Daily => 0.015,
        BarInterval::Hourly => 0.004,
    };

    let mut price = START_PRICE;
    timestamps(interval, count)
        .into_iter()
        .map(|timestamp| {
            let ret: f64 = rng.gen_range(-max_move..max_move);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..max_move / 2.0));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..max_move / 2.0));
            let volume = rng.gen_range(500_000..5_000_000u64) as f64;
            price = close;
            Bar {
                symbol: symbol.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}
