use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Thresholds of the three classification rules, all in percent except the
/// volume multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strong_trend_min_gain: f64,
    pub strong_trend_3day_total: f64,
    pub panic_1day_drop: f64,
    pub panic_3day_drop: f64,
    pub panic_volume_multiplier: f64,
    pub euphoria_1day_gain: f64,
    pub euphoria_5day_gain: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strong_trend_min_gain: 5.0,
            strong_trend_3day_total: 15.0,
            panic_1day_drop: 8.0,
            panic_3day_drop: 15.0,
            panic_volume_multiplier: 1.5,
            euphoria_1day_gain: 8.0,
            euphoria_5day_gain: 20.0,
        }
    }
}

impl ClassifierConfig {
    pub fn with_strong_trend_min_gain(mut self, value: f64) -> Self {
        self.strong_trend_min_gain = value;
        self
    }

    pub fn with_strong_trend_3day_total(mut self, value: f64) -> Self {
        self.strong_trend_3day_total = value;
        self
    }

    pub fn with_panic_1day_drop(mut self, value: f64) -> Self {
        self.panic_1day_drop = value;
        self
    }

    pub fn with_panic_3day_drop(mut self, value: f64) -> Self {
        self.panic_3day_drop = value;
        self
    }

    pub fn with_panic_volume_multiplier(mut self, value: f64) -> Self {
        self.panic_volume_multiplier = value;
        self
    }

    pub fn with_euphoria_1day_gain(mut self, value: f64) -> Self {
        self.euphoria_1day_gain = value;
        self
    }

    pub fn with_euphoria_5day_gain(mut self, value: f64) -> Self {
        self.euphoria_5day_gain = value;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("strong_trend_min_gain", self.strong_trend_min_gain),
            ("strong_trend_3day_total", self.strong_trend_3day_total),
            ("panic_1day_drop", self.panic_1day_drop),
            ("panic_3day_drop", self.panic_3day_drop),
            ("euphoria_1day_gain", self.euphoria_1day_gain),
            ("euphoria_5day_gain", self.euphoria_5day_gain),
        ];

        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ScanError::InvalidThreshold { name, value });
            }
        }

        let multiplier = self.panic_volume_multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ScanError::InvalidThreshold {
                name: "panic_volume_multiplier",
                value: multiplier,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub min_market_cap: f64,
    pub min_price: f64,
    /// Minimum of price × average volume, in dollars.
    pub min_avg_dollar_volume: f64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            min_market_cap: 500_000_000.0,
            min_price: 3.0,
            min_avg_dollar_volume: 20_000_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub universe: UniverseConfig,
    pub classifier: ClassifierConfig,
    pub top_n: Option<usize>,
    pub history_days: i64,
    pub avg_volume_days: usize,
    pub data_dir: PathBuf,
    pub universe_file: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            classifier: ClassifierConfig::default(),
            top_n: None,
            history_days: 30,
            avg_volume_days: 20,
            data_dir: PathBuf::from("data"),
            universe_file: PathBuf::from("data/universe.txt"),
            results_dir: PathBuf::from("results"),
        }
    }
}

impl ScannerConfig {
    /// Layers an optional TOML file and `SCANNER__*` environment variables
    /// over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix("SCANNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = cfg.try_deserialize()?;
        config.classifier.validate()?;

        Ok(config)
    }

    pub fn with_data_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.data_dir = value.into();
        self
    }

    pub fn with_universe_file(mut self, value: impl Into<PathBuf>) -> Self {
        self.universe_file = value.into();
        self
    }

    pub fn with_results_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.results_dir = value.into();
        self
    }

    pub fn with_top_n(mut self, value: Option<usize>) -> Self {
        self.top_n = value;
        self
    }

    pub fn with_classifier(mut self, value: ClassifierConfig) -> Self {
        self.classifier = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, process};

    use super::{ClassifierConfig, ScannerConfig};

    #[test]
    fn unittest_defaults_match_scanner_thresholds() {
        let config = ClassifierConfig::default();

        assert_eq!(config.strong_trend_min_gain, 5.0);
        assert_eq!(config.strong_trend_3day_total, 15.0);
        assert_eq!(config.panic_1day_drop, 8.0);
        assert_eq!(config.panic_3day_drop, 15.0);
        assert_eq!(config.panic_volume_multiplier, 1.5);
        assert_eq!(config.euphoria_1day_gain, 8.0);
        assert_eq!(config.euphoria_5day_gain, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unittest_validate_rejects_bad_thresholds() {
        assert!(ClassifierConfig::default()
            .with_panic_1day_drop(-1.0)
            .validate()
            .is_err());
        assert!(ClassifierConfig::default()
            .with_euphoria_5day_gain(f64::NAN)
            .validate()
            .is_err());
        assert!(ClassifierConfig::default()
            .with_panic_volume_multiplier(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn unittest_load_toml_overrides() -> eyre::Result<()> {
        let dir = std::env::temp_dir().join(format!("market-scanner-config-{}", process::id()));
        fs::create_dir_all(&dir)?;
        let path = dir.join("scanner.toml");
        fs::write(
            &path,
            "top_n = 50\n\n[classifier]\npanic_1day_drop = 10.0\n\n[universe]\nmin_price = 5.0\n",
        )?;

        let config = ScannerConfig::load(Some(path.as_path()))?;
        fs::remove_dir_all(&dir)?;

        assert_eq!(config.top_n, Some(50));
        assert_eq!(config.classifier.panic_1day_drop, 10.0);
        assert_eq!(config.classifier.panic_3day_drop, 15.0);
        assert_eq!(config.universe.min_price, 5.0);
        assert_eq!(config.avg_volume_days, 20);
        assert_eq!(config.data_dir, PathBuf::from("data"));

        Ok(())
    }
}
