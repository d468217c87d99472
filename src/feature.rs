//! Windowed price-change features derived from a close series.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    model::Price,
    utils::{pct_change, ratio_change, MovingAverage},
};

/// Percentage-change features over the most recent 1/3/5 bars.
///
/// Return windows are `None` when the history is too short or the base close
/// is unusable, so "no signal" never reads as a flat day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    pub change_1d: Option<f64>,
    pub change_3d: Option<f64>,
    pub change_5d: Option<f64>,
    /// Fractional single-day returns of the last 3 sessions, oldest first.
    /// Empty when any of them is unavailable.
    pub daily_returns_3d: Vec<f64>,
    pub daily_changes_5d: Vec<f64>,
    pub avg_daily_change_5d: Option<f64>,
}

impl FeatureSet {
    /// `closes` runs oldest to newest. Returns `None` with fewer than two bars.
    pub fn extract(closes: &[Price]) -> Option<Self> {
        if closes.len() < 2 {
            return None;
        }

        let daily_changes_5d = recent_daily_changes(closes, 5).unwrap_or_default();

        let mut avg = MovingAverage::default();
        for change in &daily_changes_5d {
            avg.feed(*change);
        }

        Some(Self {
            change_1d: window_change(closes, 1),
            change_3d: window_change(closes, 3),
            change_5d: window_change(closes, 5),
            daily_returns_3d: recent_daily_returns(closes, 3).unwrap_or_default(),
            daily_changes_5d,
            avg_daily_change_5d: avg.avg(),
        })
    }

    /// Each of the last 3 sessions gained at least `min_pct` percent.
    pub fn consecutive_gain(&self, min_pct: f64) -> bool {
        let min_ratio = min_pct / 100.0;

        self.daily_returns_3d.len() == 3 && self.daily_returns_3d.iter().all(|r| *r >= min_ratio)
    }

    /// Average 5-day daily change, read as 0 when the window is unavailable.
    pub fn acceleration_baseline(&self) -> f64 {
        self.avg_daily_change_5d.unwrap_or(0.0)
    }
}

fn window_change(closes: &[Price], bars: usize) -> Option<f64> {
    let latest = *closes.last()?;
    let ix = closes.len().checked_sub(bars + 1)?;
    let base = *closes.get(ix)?;

    pct_change(base, latest)
}

/// Single-day percentage returns of the last `days` sessions, oldest first.
fn recent_daily_changes(closes: &[Price], days: usize) -> Option<Vec<f64>> {
    recent_daily_returns(closes, days).map(|returns| returns.iter().map(|r| r * 100.0).collect())
}

fn recent_daily_returns(closes: &[Price], days: usize) -> Option<Vec<f64>> {
    let start = closes.len().checked_sub(days + 1)?;

    closes[start..]
        .iter()
        .tuple_windows()
        .map(|(prev, next)| ratio_change(*prev, *next))
        .collect()
}
