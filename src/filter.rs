use std::fmt;

use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use serde::Serialize;

use crate::{config::UniverseConfig, model::StockSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    MarketCap { actual: f64, min: f64 },
    Price { actual: f64, min: f64 },
    DollarVolume { actual: f64, min: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketCap { actual, min } => {
                write!(f, "market cap ${:.2}B < ${:.2}B", actual / 1e9, min / 1e9)
            }
            Self::Price { actual, min } => write!(f, "price ${actual:.2} < ${min:.2}"),
            Self::DollarVolume { actual, min } => {
                write!(f, "avg volume ${:.1}M < ${:.0}M", actual / 1e6, min / 1e6)
            }
        }
    }
}

pub struct UniverseFilter {
    pub config: UniverseConfig,
}

impl UniverseFilter {
    pub fn new(config: UniverseConfig) -> Self {
        Self { config }
    }

    /// Checks market cap, then price, then dollar volume.
    pub fn check(&self, stock: &StockSnapshot) -> Result<(), Rejection> {
        let config = &self.config;

        if stock.market_cap < config.min_market_cap {
            return Err(Rejection::MarketCap {
                actual: stock.market_cap,
                min: config.min_market_cap,
            });
        }

        if stock.current_price < config.min_price {
            return Err(Rejection::Price {
                actual: stock.current_price,
                min: config.min_price,
            });
        }

        let dollar_volume = stock.dollar_volume();
        if dollar_volume < config.min_avg_dollar_volume {
            return Err(Rejection::DollarVolume {
                actual: dollar_volume,
                min: config.min_avg_dollar_volume,
            });
        }

        Ok(())
    }

    pub fn apply(&self, stocks: Vec<StockSnapshot>) -> Vec<StockSnapshot> {
        let initial = stocks.len();

        let filtered = stocks
            .into_iter()
            .filter(|stock| match self.check(stock) {
                Ok(()) => true,
                Err(rejection) => {
                    debug!("{}: filtered out ({rejection})", stock.symbol);
                    false
                }
            })
            .collect_vec();

        info!(
            "Filtering complete: {} stocks passed, {} filtered out",
            filtered.len(),
            initial - filtered.len()
        );

        filtered
    }
}

pub fn rank_by_market_cap(mut stocks: Vec<StockSnapshot>) -> Vec<StockSnapshot> {
    stocks.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    stocks
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FilterStats {
    pub count: usize,
    pub avg_market_cap: f64,
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_volume: f64,
}

impl FilterStats {
    pub fn collect(stocks: &[StockSnapshot]) -> Self {
        if stocks.is_empty() {
            return Self::default();
        }

        let count = stocks.len();
        let mean = |f: fn(&StockSnapshot) -> f64| stocks.iter().map(f).sum::<f64>() / count as f64;
        let bounds = |f: fn(&StockSnapshot) -> f64| {
            match stocks.iter().map(f).minmax_by(|a, b| a.total_cmp(b)) {
                MinMaxResult::NoElements => (0.0, 0.0),
                MinMaxResult::OneElement(v) => (v, v),
                MinMaxResult::MinMax(min, max) => (min, max),
            }
        };

        let (min_market_cap, max_market_cap) = bounds(|s| s.market_cap);
        let (min_price, max_price) = bounds(|s| s.current_price);

        Self {
            count,
            avg_market_cap: mean(|s| s.market_cap),
            min_market_cap,
            max_market_cap,
            avg_price: mean(|s| s.current_price),
            min_price,
            max_price,
            avg_volume: mean(|s| s.average_volume),
        }
    }
}
