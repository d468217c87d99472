use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{config::ClassifierConfig, feature::FeatureSet, model::StockSnapshot};

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[display(fmt = "strong_trend")]
    StrongTrend,
    #[display(fmt = "panic")]
    Panic,
    #[display(fmt = "euphoria")]
    Euphoria,
    #[display(fmt = "none")]
    #[serde(rename = "none")]
    Unclassified,
}

/// A single classification rule. `Some(reason)` means the rule fired; when
/// several conditions hold the first one checked supplies the reason.
pub trait Strategy {
    fn category(&self) -> Category;
    fn evaluate(&self, snapshot: &StockSnapshot, features: &FeatureSet) -> Option<String>;
}

/// fires: 3 consecutive sessions each up `min_daily_gain` %, or 3-day gain
/// of `min_total_gain_3d` % with a positive last session
pub struct StrongTrendStrategy {
    pub min_daily_gain: f64,
    pub min_total_gain_3d: f64,
}

impl Strategy for StrongTrendStrategy {
    fn category(&self) -> Category {
        Category::StrongTrend
    }

    fn evaluate(&self, _: &StockSnapshot, features: &FeatureSet) -> Option<String> {
        let min_daily_gain = self.min_daily_gain;
        if features.consecutive_gain(min_daily_gain) {
            return Some(format!("3 consecutive days with {min_daily_gain:.1}%+ gains each"));
        }

        let change_3d = features.change_3d.filter(|c| *c >= self.min_total_gain_3d)?;
        let momentum = features.change_1d.is_some_and(|c| c > 0.0);

        momentum.then(|| format!("{change_3d:.1}% gain over 3 days with positive momentum"))
    }
}

/// fires: 1-day drop of `max_drop_1d` % (volume spike only decorates the
/// reason), or 3-day drop of `max_drop_3d` %
pub struct PanicStrategy {
    pub max_drop_1d: f64,
    pub max_drop_3d: f64,
    pub volume_multiplier: f64,
}

impl PanicStrategy {
    fn volume_spike(&self, snapshot: &StockSnapshot) -> Option<f64> {
        if !(snapshot.average_volume > 0.0) {
            return None;
        }

        let latest = snapshot.latest_volume as f64;
        (latest > snapshot.average_volume * self.volume_multiplier)
            .then(|| latest / snapshot.average_volume)
    }
}

impl Strategy for PanicStrategy {
    fn category(&self) -> Category {
        Category::Panic
    }

    fn evaluate(&self, snapshot: &StockSnapshot, features: &FeatureSet) -> Option<String> {
        if let Some(change_1d) = features.change_1d.filter(|c| *c <= -self.max_drop_1d) {
            let drop = change_1d.abs();

            return Some(match self.volume_spike(snapshot) {
                Some(ratio) => format!("{drop:.1}% drop in 1 day with {ratio:.1}x volume spike"),
                None => format!("{drop:.1}% drop in 1 day"),
            });
        }

        features
            .change_3d
            .filter(|c| *c <= -self.max_drop_3d)
            .map(|c| format!("{:.1}% drop over 3 days", c.abs()))
    }
}

/// fires: 1-day gain of `min_gain_1d` %, or 5-day gain of `min_gain_5d` %
pub struct EuphoriaStrategy {
    pub min_gain_1d: f64,
    pub min_gain_5d: f64,
}

impl Strategy for EuphoriaStrategy {
    fn category(&self) -> Category {
        Category::Euphoria
    }

    fn evaluate(&self, _: &StockSnapshot, features: &FeatureSet) -> Option<String> {
        if let Some(change_1d) = features.change_1d.filter(|c| *c >= self.min_gain_1d) {
            let avg = features.acceleration_baseline();

            return Some(if avg > 0.0 && change_1d > avg {
                format!("{change_1d:.1}% gain in 1 day with acceleration (avg: {avg:.1}%)")
            } else {
                format!("{change_1d:.1}% gain in 1 day")
            });
        }

        features
            .change_5d
            .filter(|c| *c >= self.min_gain_5d)
            .map(|c| format!("{c:.1}% gain over 5 days"))
    }
}

impl From<&ClassifierConfig> for StrongTrendStrategy {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            min_daily_gain: config.strong_trend_min_gain,
            min_total_gain_3d: config.strong_trend_3day_total,
        }
    }
}

impl From<&ClassifierConfig> for PanicStrategy {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            max_drop_1d: config.panic_1day_drop,
            max_drop_3d: config.panic_3day_drop,
            volume_multiplier: config.panic_volume_multiplier,
        }
    }
}

impl From<&ClassifierConfig> for EuphoriaStrategy {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            min_gain_1d: config.euphoria_1day_gain,
            min_gain_5d: config.euphoria_5day_gain,
        }
    }
}
