use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use log::info;
use serde::Serialize;

use crate::{
    classifier::ClassificationVerdict,
    config::{ScannerConfig, UniverseConfig},
    filter::FilterStats,
    model::StockSnapshot,
    strategy::Category,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub ticker: String,
    pub price: f64,
    pub change_1d: Option<f64>,
    pub change_3d: Option<f64>,
    pub change_5d: Option<f64>,
    pub reason: String,
}

impl ReportEntry {
    pub fn new(snapshot: &StockSnapshot, verdict: &ClassificationVerdict) -> Self {
        let features = snapshot.features.as_ref();

        Self {
            ticker: snapshot.symbol.clone(),
            price: snapshot.current_price,
            change_1d: features.and_then(|f| f.change_1d),
            change_3d: features.and_then(|f| f.change_3d),
            change_5d: features.and_then(|f| f.change_5d),
            reason: verdict.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResults {
    pub strong_trend: Vec<ReportEntry>,
    pub panic: Vec<ReportEntry>,
    pub euphoria: Vec<ReportEntry>,
}

impl ScanResults {
    /// Unclassified verdicts are dropped.
    pub fn push(&mut self, snapshot: &StockSnapshot, verdict: &ClassificationVerdict) {
        let bucket = match verdict.category {
            Category::StrongTrend => &mut self.strong_trend,
            Category::Panic => &mut self.panic,
            Category::Euphoria => &mut self.euphoria,
            Category::Unclassified => return,
        };

        bucket.push(ReportEntry::new(snapshot, verdict));
    }

    pub fn total(&self) -> usize {
        self.strong_trend.len() + self.panic.len() + self.euphoria.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub strong_trend_count: usize,
    pub panic_count: usize,
    pub euphoria_count: usize,
    pub total_classified: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub universe: UniverseConfig,
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub timestamp: String,
    pub analysis_date: String,
    pub config: ReportConfig,
    pub results: ScanResults,
    pub summary: ScanSummary,
    pub stats: FilterStats,
}

impl ScanReport {
    pub fn new(config: &ScannerConfig, results: ScanResults, stats: FilterStats) -> Self {
        let now = Local::now();

        Self {
            timestamp: now.format("%Y%m%d_%H%M%S").to_string(),
            analysis_date: now.to_rfc3339(),
            config: ReportConfig {
                universe: config.universe.clone(),
                top_n: config.top_n,
            },
            summary: ScanSummary {
                strong_trend_count: results.strong_trend.len(),
                panic_count: results.panic.len(),
                euphoria_count: results.euphoria.len(),
                total_classified: results.total(),
            },
            results,
            stats,
        }
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(80);
        let mut out = vec![rule.clone(), "MARKET SCANNER RESULTS".into(), rule.clone()];

        let sections = [
            ("STRONG TREND", &self.results.strong_trend, "3d"),
            ("PANIC", &self.results.panic, "3d"),
            ("EUPHORIA", &self.results.euphoria, "5d"),
        ];

        for (title, entries, window) in sections {
            out.push(String::new());
            out.push(format!("=== {title} ({} stocks) ===", entries.len()));

            if entries.is_empty() {
                out.push("No stocks found".to_owned());
            }

            for entry in entries {
                let change = if window == "5d" {
                    entry.change_5d
                } else {
                    entry.change_3d
                };

                out.push(format!(
                    "{:6} | ${:8.2} | {} (1d) | {} ({window}) | {}",
                    entry.ticker,
                    entry.price,
                    signed_pct(entry.change_1d),
                    signed_pct(change),
                    entry.reason
                ));
            }
        }

        out.push(String::new());
        out.push(rule.clone());
        let total = self.summary.total_classified;
        out.push(format!("Total classified stocks: {total}"));
        out.push(rule);

        out.join("\n")
    }

    /// Writes `scan_<timestamp>.json` under `dir` and returns its path.
    pub fn save(&self, dir: impl AsRef<Path>) -> crate::error::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("scan_{}.json", self.timestamp));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        info!("Results saved to {}", path.display());

        Ok(path)
    }
}

fn signed_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+6.1}%"),
        None => format!("{:>7}", "n/a"),
    }
}
