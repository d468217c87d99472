use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{error::SeriesError, feature::FeatureSet, utils::MovingAverage};

pub type Price = f64;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub market_cap: f64,
    pub trades: BTreeMap<NaiveDate, DaySeriesData>,
}

impl Stock {
    pub fn closes(&self) -> Vec<Price> {
        self.trades.values().map(|d| d.close).collect()
    }

    pub fn current_price(&self) -> Option<Price> {
        self.trades.last_key_value().map(|(_, d)| d.close)
    }

    pub fn latest_volume(&self) -> Option<usize> {
        self.trades.last_key_value().map(|(_, d)| d.volume)
    }

    /// Mean volume of the last `days` bars, or of every bar when fewer exist.
    pub fn average_volume(&self, days: usize) -> Option<f64> {
        let mut avg = MovingAverage::default();

        for data in self.trades.values().rev().take(days) {
            avg.feed(data.volume as Price);
        }

        avg.avg()
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySeriesData {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: usize,
}

/// Builds a series from bars that must arrive oldest-first with distinct dates.
pub fn collect_series(
    bars: impl IntoIterator<Item = (NaiveDate, DaySeriesData)>,
) -> Result<BTreeMap<NaiveDate, DaySeriesData>, SeriesError> {
    let mut trades = BTreeMap::new();
    let mut prev: Option<NaiveDate> = None;

    for (date, data) in bars {
        if let Some(prev) = prev {
            if prev == date {
                return Err(SeriesError::DuplicateDate(date));
            }
            if prev > date {
                return Err(SeriesError::NonMonotonicDates { prev, next: date });
            }
        }

        prev = Some(date);
        trades.insert(date, data);
    }

    Ok(trades)
}

/// Rejects closes that would poison a ratio.
pub fn validate_series(trades: &BTreeMap<NaiveDate, DaySeriesData>) -> Result<(), SeriesError> {
    let unusable = |d: &DaySeriesData| !(d.close.is_finite() && d.close > 0.0);

    match trades.iter().find(|(_, d)| unusable(*d)) {
        Some((date, d)) => Err(SeriesError::NonPositivePrice {
            date: *date,
            price: d.close,
        }),
        None => Ok(()),
    }
}

/// Everything the classifier needs to know about one stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub current_price: Price,
    pub market_cap: f64,
    pub average_volume: f64,
    pub latest_volume: usize,
    pub features: Option<FeatureSet>,
}

impl StockSnapshot {
    /// Returns `None` only for a stock without a single bar. Short or invalid
    /// histories still produce a snapshot, just one without features.
    pub fn capture(stock: &Stock, avg_volume_days: usize) -> Option<Self> {
        let current_price = stock.current_price()?;
        let latest_volume = stock.latest_volume()?;
        let average_volume = stock.average_volume(avg_volume_days).unwrap_or_default();

        let features = match validate_series(&stock.trades) {
            Ok(()) => FeatureSet::extract(&stock.closes()),
            Err(e) => {
                warn!("{}: {e}", stock.symbol);
                None
            }
        };

        Some(Self {
            symbol: stock.symbol.clone(),
            current_price,
            market_cap: stock.market_cap,
            average_volume,
            latest_volume,
            features,
        })
    }

    pub fn dollar_volume(&self) -> f64 {
        self.current_price * self.average_volume
    }
}
