use log::{error, info};
use rayon::prelude::*;

use crate::{
    classifier::{ClassificationVerdict, StockClassifier},
    config::ScannerConfig,
    error::Result,
    filter::{rank_by_market_cap, FilterStats, UniverseFilter},
    loader::StockDataLoader,
    model::{Stock, StockSnapshot},
    report::{ScanReport, ScanResults},
};

pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        config.classifier.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// load → filter → classify. `None` when nothing survives loading or
    /// filtering.
    pub fn run<L>(&self, loader: &L, tickers: &[String]) -> Result<Option<ScanReport>>
    where
        L: StockDataLoader,
    {
        info!("Loading data for {} tickers", tickers.len());
        let stocks = loader.load(tickers)?;

        if stocks.is_empty() {
            error!("No stock data loaded");
            return Ok(None);
        }

        Ok(self.scan(&stocks))
    }

    pub fn scan(&self, stocks: &[Stock]) -> Option<ScanReport> {
        let avg_volume_days = self.config.avg_volume_days;
        let snapshots = stocks
            .iter()
            .filter_map(|stock| StockSnapshot::capture(stock, avg_volume_days))
            .collect();

        let filter = UniverseFilter::new(self.config.universe.clone());
        let filtered = rank_by_market_cap(filter.apply(snapshots));
        if filtered.is_empty() {
            error!("No stocks passed filters");
            return None;
        }

        info!("Classifying {} stocks", filtered.len());
        let stats = FilterStats::collect(&filtered);
        let results = self.classify_all(&filtered);

        Some(ScanReport::new(&self.config, results, stats))
    }

    fn classify_all(&self, snapshots: &[StockSnapshot]) -> ScanResults {
        let classifier = StockClassifier::new(&self.config.classifier);

        let verdicts: Vec<ClassificationVerdict> = snapshots
            .par_iter()
            .map(|snapshot| classifier.classify(snapshot))
            .collect();

        let mut results = ScanResults::default();
        for (snapshot, verdict) in snapshots.iter().zip(&verdicts) {
            results.push(snapshot, verdict);
        }

        results
    }
}
