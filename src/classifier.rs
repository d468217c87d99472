use serde::Serialize;

use crate::{
    config::ClassifierConfig,
    model::StockSnapshot,
    strategy::{Category, EuphoriaStrategy, PanicStrategy, Strategy, StrongTrendStrategy},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationVerdict {
    pub category: Category,
    pub reason: String,
}

impl ClassificationVerdict {
    fn unclassified(reason: &str) -> Self {
        Self {
            category: Category::Unclassified,
            reason: reason.to_owned(),
        }
    }

    pub fn is_classified(&self) -> bool {
        self.category != Category::Unclassified
    }
}

/// Raw outcome of every rule before arbitration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleVerdicts {
    pub strong_trend: Option<String>,
    pub panic: Option<String>,
    pub euphoria: Option<String>,
}

pub struct StockClassifier {
    strong_trend: StrongTrendStrategy,
    panic: PanicStrategy,
    euphoria: EuphoriaStrategy,
}

impl StockClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            strong_trend: config.into(),
            panic: config.into(),
            euphoria: config.into(),
        }
    }

    /// Runs all three rules independently. `None` when the snapshot has no
    /// features to evaluate.
    pub fn evaluate(&self, snapshot: &StockSnapshot) -> Option<RuleVerdicts> {
        let features = snapshot.features.as_ref()?;

        Some(RuleVerdicts {
            strong_trend: self.strong_trend.evaluate(snapshot, features),
            panic: self.panic.evaluate(snapshot, features),
            euphoria: self.euphoria.evaluate(snapshot, features),
        })
    }

    /// priority: strong trend > panic > euphoria
    /// a stock flagged as both panic and euphoria is noise and stays unclassified
    pub fn classify(&self, snapshot: &StockSnapshot) -> ClassificationVerdict {
        let Some(verdicts) = self.evaluate(snapshot) else {
            return ClassificationVerdict::unclassified("insufficient price history");
        };

        if verdicts.panic.is_some() && verdicts.euphoria.is_some() {
            return ClassificationVerdict::unclassified("conflicting panic and euphoria signals");
        }

        [
            (self.strong_trend.category(), verdicts.strong_trend),
            (self.panic.category(), verdicts.panic),
            (self.euphoria.category(), verdicts.euphoria),
        ]
        .into_iter()
        .find_map(|(category, reason)| {
            reason.map(|reason| ClassificationVerdict { category, reason })
        })
        .unwrap_or_else(|| ClassificationVerdict::unclassified(""))
    }
}

pub fn classify(snapshot: &StockSnapshot, config: &ClassifierConfig) -> ClassificationVerdict {
    StockClassifier::new(config).classify(snapshot)
}

#[cfg(test)]
mod tests {
    use super::{classify, StockClassifier};
    use crate::{
        config::ClassifierConfig,
        feature::FeatureSet,
        model::{tests::stock_with, StockSnapshot},
        strategy::{tests::snapshot, Category},
    };

    fn classify_closes(closes: &[f64], volumes: &[usize]) -> (StockSnapshot, Category) {
        let config = ClassifierConfig::default();
        let stock = stock_with("TEST", closes, volumes);
        let snapshot = StockSnapshot::capture(&stock, 20).unwrap();
        let category = classify(&snapshot, &config).category;

        (snapshot, category)
    }

    #[test]
    fn unittest_short_history_is_unclassified() {
        let (_, category) = classify_closes(&[100.0], &[]);
        assert_eq!(category, Category::Unclassified);

        let mut snapshot = snapshot(FeatureSet::default(), 1, 1.0);
        snapshot.features = None;
        let verdict = classify(&snapshot, &ClassifierConfig::default());
        assert_eq!(verdict.category, Category::Unclassified);
        assert!(!verdict.is_classified());
    }

    #[test]
    fn unittest_consecutive_gains_are_strong_trend() {
        let config = ClassifierConfig::default();
        let stock = stock_with("TEST", &[100.0, 106.0, 112.9, 119.9], &[]);
        let snapshot = StockSnapshot::capture(&stock, 20).unwrap();
        let verdict = classify(&snapshot, &config);

        assert_eq!(verdict.category, Category::StrongTrend);
        assert!(verdict.reason.contains("consecutive"));
    }

    #[test]
    fn unittest_consecutive_gain_threshold_follows_config() {
        // three sessions of +6%
        let stock = stock_with("TEST", &[100.0, 106.0, 112.36, 119.1016], &[]);
        let snapshot = StockSnapshot::capture(&stock, 20).unwrap();

        let config = ClassifierConfig::default();
        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::StrongTrend);
        assert_eq!(verdict.reason, "3 consecutive days with 5.0%+ gains each");

        let config = config.with_strong_trend_min_gain(10.0);
        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::StrongTrend);
        assert_eq!(
            verdict.reason,
            "19.1% gain over 3 days with positive momentum"
        );

        let config = config.with_strong_trend_3day_total(25.0);
        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::Unclassified);
    }

    #[test]
    fn unittest_panic_with_volume_spike() {
        let features = FeatureSet {
            change_1d: Some(-8.0),
            change_3d: Some(-5.0),
            ..Default::default()
        };
        let snapshot = snapshot(features, 2_000_000, 1_000_000.0);
        let verdict = classify(&snapshot, &ClassifierConfig::default());

        assert_eq!(verdict.category, Category::Panic);
        assert!(verdict.reason.contains("2.0x"));
    }

    // Panic together with euphoria is treated as noise. This is a product
    // rule, not something the individual thresholds imply.
    #[test]
    fn unittest_panic_and_euphoria_cancel_out() {
        let config = ClassifierConfig::default();
        let closes = [100.0, 100.0, 110.0, 120.0, 130.0, 140.0, 126.0];
        let stock = stock_with("TEST", &closes, &[]);
        let snapshot = StockSnapshot::capture(&stock, 20).unwrap();

        let verdicts = StockClassifier::new(&config).evaluate(&snapshot).unwrap();
        assert!(verdicts.panic.is_some());
        assert!(verdicts.euphoria.is_some());
        assert!(verdicts.strong_trend.is_none());

        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::Unclassified);
    }

    #[test]
    fn unittest_noise_suppression_beats_strong_trend() {
        let features = FeatureSet {
            daily_returns_3d: vec![0.06, 0.06, 0.06],
            change_1d: Some(-9.0),
            change_5d: Some(25.0),
            ..Default::default()
        };
        let verdict = classify(&snapshot(features, 1, 1.0), &ClassifierConfig::default());

        assert_eq!(verdict.category, Category::Unclassified);
    }

    #[test]
    fn unittest_strong_trend_outranks_panic() {
        let features = FeatureSet {
            daily_returns_3d: vec![0.06, 0.06, 0.06],
            change_1d: Some(1.0),
            change_3d: Some(-20.0),
            ..Default::default()
        };
        let snapshot = snapshot(features, 1, 1.0);
        let classifier = StockClassifier::new(&ClassifierConfig::default());

        assert!(classifier.evaluate(&snapshot).unwrap().panic.is_some());
        let verdict = classifier.classify(&snapshot);
        assert_eq!(verdict.category, Category::StrongTrend);
    }

    #[test]
    fn unittest_three_day_threshold_is_inclusive() {
        let features = FeatureSet {
            change_1d: Some(2.0),
            change_3d: Some(15.0),
            ..Default::default()
        };
        let verdict = classify(&snapshot(features, 1, 1.0), &ClassifierConfig::default());

        assert_eq!(verdict.category, Category::StrongTrend);
    }

    #[test]
    fn unittest_panic_outranks_euphoria_only_when_alone() {
        let (_, category) =
            classify_closes(&[100.0, 104.0, 108.0, 112.0, 116.0, 120.0, 108.0], &[]);
        // -10% on the day, 5-day gain of 3.8%
        assert_eq!(category, Category::Panic);

        let (_, category) =
            classify_closes(&[100.0, 100.0, 100.0, 100.0, 100.0, 101.0, 110.0], &[]);
        assert_eq!(category, Category::Euphoria);

        let (_, category) = classify_closes(&[100.0, 100.5, 101.0, 100.5, 101.0, 101.5], &[]);
        assert_eq!(category, Category::Unclassified);
    }

    #[test]
    fn unittest_thresholds_are_injected() {
        let features = FeatureSet {
            change_1d: Some(-5.0),
            ..Default::default()
        };
        let snapshot = snapshot(features, 1, 1.0);

        let config = ClassifierConfig::default();
        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::Unclassified);

        let config = config.with_panic_1day_drop(5.0);
        let verdict = classify(&snapshot, &config);
        assert_eq!(verdict.category, Category::Panic);
    }

    #[test]
    fn unittest_classify_is_idempotent() {
        let (snapshot, _) = classify_closes(&[100.0, 106.0, 112.9, 119.9, 90.0, 130.0], &[]);
        let config = ClassifierConfig::default();
        let copy = snapshot.clone();

        assert_eq!(classify(&snapshot, &config), classify(&snapshot, &config));
        assert_eq!(snapshot, copy);
    }
}
