//! Ticker universe sources: the saved ticker list, screener CSV exports and a
//! built-in large-cap fallback.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::{info, warn};

use crate::error::{Result, ScanError};

const TICKER_COLUMNS: [&str; 5] = ["ticker", "symbol", "tickers", "symbols", "stock"];

/// Largest US listings by market cap, used when no ticker list is available.
pub const FALLBACK_TICKERS: [&str; 100] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK-B", "UNH", "XOM", "JNJ", "JPM",
    "V", "PG", "MA", "HD", "CVX", "MRK", "ABBV", "PEP", "KO", "AVGO", "COST", "PFE", "WMT", "TMO",
    "MCD", "CSCO", "ACN", "DHR", "ADBE", "ABT", "NKE", "TXN", "NEE", "CRM", "LIN", "PM", "DIS",
    "ORCL", "VZ", "WFC", "CMCSA", "BMY", "AMD", "INTC", "RTX", "UPS", "QCOM", "HON", "AMGN", "BA",
    "INTU", "CAT", "AMAT", "GE", "IBM", "LOW", "SPGI", "SBUX", "BLK", "DE", "GILD", "ELV", "ADP",
    "LMT", "BKNG", "PLD", "MDLZ", "ADI", "ISRG", "CI", "TJX", "MMC", "VRTX", "SYK", "C", "REGN",
    "ZTS", "MO", "NOW", "CB", "SO", "PGR", "DUK", "ETN", "BSX", "BDX", "CME", "ITW", "EOG", "APD",
    "USB", "CL", "HUM", "MMM", "GD", "AON", "TGT", "SLB",
];

/// One symbol per line, blank lines and `#` comments skipped.
pub fn load_ticker_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut tickers = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        tickers.push(line.to_owned());
    }

    Ok(tickers)
}

pub fn save_ticker_list(path: impl AsRef<Path>, tickers: &[String]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for ticker in tickers {
        writeln!(writer, "{ticker}")?;
    }
    writer.flush()?;

    info!("Saved {} tickers to {}", tickers.len(), path.display());

    Ok(())
}

/// Loads the saved list, falling back to [`FALLBACK_TICKERS`] when it does
/// not exist, and keeps the first `top_n` entries.
pub fn resolve_universe(path: impl AsRef<Path>, top_n: Option<usize>) -> Result<Vec<String>> {
    let path = path.as_ref();

    let mut tickers = if path.exists() {
        load_ticker_list(path)?
    } else {
        warn!(
            "ticker list {} not found, using the built-in top {} list",
            path.display(),
            FALLBACK_TICKERS.len()
        );
        FALLBACK_TICKERS.iter().map(|t| t.to_string()).collect()
    };

    if let Some(n) = top_n {
        tickers.truncate(n);
    }

    Ok(tickers)
}

/// Extracts a cleaned, sorted, de-duplicated ticker list from a screener
/// export. `column` overrides ticker-column detection.
pub fn import_from_csv(path: impl AsRef<Path>, column: Option<&str>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let headers = reader.headers()?.clone();

    let position = match column {
        Some(column) => headers.iter().position(|h| h.trim() == column),
        None => headers
            .iter()
            .position(|h| TICKER_COLUMNS.contains(&h.trim().to_lowercase().as_str())),
    };
    let Some(position) = position else {
        return Err(ScanError::MissingTickerColumn {
            path: path.to_owned(),
            columns: headers.iter().map(str::to_owned).collect(),
        });
    };

    let mut tickers = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(ticker) = record.get(position).and_then(clean_ticker) {
            tickers.insert(ticker);
        }
    }

    let count = tickers.len();
    info!("Imported {count} unique tickers from {}", path.display());

    Ok(tickers.into_iter().collect())
}

/// Normalizes a raw symbol to the `BRK-B` style. `None` for index symbols and
/// anything that does not look like a listed ticker.
pub fn clean_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase().replace('.', "-");

    if ticker.is_empty() || ticker.contains('$') || ticker.contains('^') {
        return None;
    }

    let plain = ticker.len() <= 5 && ticker.chars().all(|c| c.is_ascii_alphabetic());
    (plain || ticker.contains('-')).then_some(ticker)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, process};

    use super::{
        clean_ticker, import_from_csv, load_ticker_list, resolve_universe, save_ticker_list,
    };
    use crate::error::ScanError;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[test]
    fn unittest_clean_ticker() {
        assert_eq!(clean_ticker(" aapl ").as_deref(), Some("AAPL"));
        assert_eq!(clean_ticker("BRK.B").as_deref(), Some("BRK-B"));
        assert_eq!(clean_ticker("$SPX"), None);
        assert_eq!(clean_ticker("^VIX"), None);
        assert_eq!(clean_ticker("GOOGLE"), None);
        assert_eq!(clean_ticker("AB1"), None);
        assert_eq!(clean_ticker(""), None);
    }

    #[test]
    fn unittest_import_from_csv() -> eyre::Result<()> {
        let tickers = import_from_csv(data_dir().join("screener_export.csv"), None)?;

        assert_eq!(tickers, ["AAPL", "BRK-B", "MSFT", "NVDA"]);

        Ok(())
    }

    #[test]
    fn unittest_import_without_ticker_column() {
        let result = import_from_csv(data_dir().join("profiles.csv"), Some("Ticker"));

        match result {
            Err(ScanError::MissingTickerColumn { columns, .. }) => {
                assert!(columns.contains(&"symbol".to_owned()))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unittest_ticker_list_round_trip() -> eyre::Result<()> {
        let dir = std::env::temp_dir().join(format!("market-scanner-universe-{}", process::id()));
        let path = dir.join("universe.txt");
        let tickers = vec!["AAPL".to_owned(), "BRK-B".to_owned()];

        save_ticker_list(&path, &tickers)?;
        let loaded = load_ticker_list(&path)?;
        fs::remove_dir_all(&dir)?;

        assert_eq!(loaded, tickers);

        Ok(())
    }

    #[test]
    fn unittest_resolve_universe() -> eyre::Result<()> {
        let tickers = resolve_universe(data_dir().join("universe.txt"), Some(3))?;
        assert_eq!(tickers, ["AAPL", "MSFT", "NVDA"]);

        let fallback = resolve_universe(data_dir().join("missing.txt"), None)?;
        assert_eq!(fallback.len(), 100);
        assert_eq!(fallback[7], "BRK-B");

        Ok(())
    }
}
