pub mod classifier;
pub mod config;
pub mod error;
pub mod feature;
pub mod filter;
pub mod loader;
pub mod logger;
pub mod model;
pub mod report;
pub mod scanner;
pub mod strategy;
pub mod universe;
pub mod utils;

pub use crate::classifier::{classify, ClassificationVerdict, RuleVerdicts, StockClassifier};
pub use crate::config::{ClassifierConfig, ScannerConfig, UniverseConfig};
pub use crate::error::{ScanError, SeriesError};
pub use crate::feature::FeatureSet;
pub use crate::model::{DaySeriesData, Stock, StockSnapshot};
pub use crate::scanner::Scanner;
pub use crate::strategy::Category;
