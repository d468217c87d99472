use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    error::{Result, ScanError},
    model::{collect_series, DaySeriesData, Stock},
};

/// Fewest bars a stock needs after the history window to be scanned.
pub const MIN_HISTORY_BARS: usize = 5;

pub trait StockDataLoader {
    fn load(&self, symbols: &[String]) -> Result<Vec<Stock>>;
}

/// Reads `<data>/profiles.csv` and one `<data>/prices/<SYMBOL>.csv` per stock.
pub struct DirectoryLoader {
    pub data_dir: PathBuf,
    pub history_days: i64,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    shares_outstanding: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

impl StockDataLoader for DirectoryLoader {
    fn load(&self, symbols: &[String]) -> Result<Vec<Stock>> {
        let profiles = load_profiles(self.data_dir.join("profiles.csv"))?;
        let mut stocks = Vec::new();

        for (ix, symbol) in symbols.iter().enumerate() {
            debug!("[{}/{}] loading {symbol}", ix + 1, symbols.len());

            match self.load_stock(symbol, profiles.get(symbol)) {
                Ok(Some(stock)) => {
                    debug!(
                        "{symbol}: ${:.2}, MCap ${:.1}B",
                        stock.current_price().unwrap_or_default(),
                        stock.market_cap / 1e9
                    );
                    stocks.push(stock);
                }
                Ok(None) => {}
                Err(e) => warn!("{symbol}: {e}"),
            }
        }

        info!("Loaded {}/{} stocks", stocks.len(), symbols.len());

        Ok(stocks)
    }
}

impl DirectoryLoader {
    pub fn new(data_dir: impl Into<PathBuf>, history_days: i64) -> Self {
        Self {
            data_dir: data_dir.into(),
            history_days,
        }
    }

    fn load_stock(&self, symbol: &str, profile: Option<&ProfileRow>) -> Result<Option<Stock>> {
        let path = self.data_dir.join("prices").join(format!("{symbol}.csv"));
        if !path.exists() {
            warn!("{symbol}: no price history at {}", path.display());
            return Ok(None);
        }

        let trades = match load_stock_trades(&path) {
            Ok(trades) => trades,
            Err(ScanError::Series { source, .. }) => {
                let symbol = symbol.to_owned();
                return Err(ScanError::Series { symbol, source });
            }
            Err(e) => return Err(e),
        };
        let trades = recent_trades(trades, self.history_days);

        let bars = trades.len();
        if bars < MIN_HISTORY_BARS {
            warn!("{symbol}: insufficient historical data ({bars} bars)");
            return Ok(None);
        }
        let Some((_, latest)) = trades.last_key_value() else {
            return Ok(None);
        };

        let market_cap = profile.and_then(|p| {
            p.market_cap
                .or_else(|| p.shares_outstanding.map(|shares| shares * latest.close))
        });
        let Some(market_cap) = market_cap else {
            warn!("{symbol}: missing critical data (market cap)");
            return Ok(None);
        };

        Ok(Some(Stock {
            symbol: symbol.to_owned(),
            name: profile
                .and_then(|p| p.name.clone())
                .unwrap_or_else(|| symbol.to_owned()),
            market_cap,
            trades,
        }))
    }
}

fn load_profiles(path: impl AsRef<Path>) -> Result<HashMap<String, ProfileRow>> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(
            "no profiles at {}, every stock will lack a market cap",
            path.display()
        );
        return Ok(HashMap::new());
    }

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut profiles = HashMap::new();

    for row in reader.deserialize() {
        let row: ProfileRow = row?;
        profiles.insert(row.symbol.trim().to_uppercase(), row);
    }

    Ok(profiles)
}

fn load_stock_trades(path: impl AsRef<Path>) -> Result<BTreeMap<NaiveDate, DaySeriesData>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut bars = Vec::new();

    for row in reader.deserialize() {
        let row: PriceRow = row?;

        // blank open: halted or not yet listed
        let (Some(open), Some(close)) = (row.open, row.close) else {
            continue;
        };
        if open == 0f64 || close == 0f64 {
            continue;
        }

        let day = row.date.get(..10).unwrap_or(&row.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ScanError::Date {
            path: path.to_owned(),
            value: row.date.clone(),
        })?;

        bars.push((
            date,
            DaySeriesData {
                open,
                high: row.high.unwrap_or(close),
                low: row.low.unwrap_or(close),
                close,
                volume: row.volume.unwrap_or_default() as usize,
            },
        ));
    }

    collect_series(bars).map_err(|source| ScanError::Series {
        symbol: path.display().to_string(),
        source,
    })
}

/// Keeps bars within `days` calendar days of the latest bar.
fn recent_trades(
    trades: BTreeMap<NaiveDate, DaySeriesData>,
    days: i64,
) -> BTreeMap<NaiveDate, DaySeriesData> {
    let Some(latest) = trades.last_key_value().map(|(d, _)| *d) else {
        return trades;
    };
    let Some(cutoff) = latest.checked_sub_days(Days::new(days.max(0) as u64)) else {
        return trades;
    };

    trades.into_iter().filter(|(d, _)| *d >= cutoff).collect()
}
