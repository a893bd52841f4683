use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Drift readings strictly above this count as an alert.
pub const DRIFT_ALERT_THRESHOLD: f64 = 0.15;
/// Drift readings strictly above this count as a critical alert.
pub const DRIFT_CRITICAL_THRESHOLD: f64 = 0.25;

/// Metrics reported in the KPI list.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    Auc,
    KsStatistic,
    Gini,
    Psi,
    PopulationStability,
    ModelDrift,
    DataQualityScore,
    MissingRate,
    BadRate,
    ProductionCoverage,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 10] = [
        KpiMetric::Auc,
        KpiMetric::KsStatistic,
        KpiMetric::Gini,
        KpiMetric::Psi,
        KpiMetric::PopulationStability,
        KpiMetric::ModelDrift,
        KpiMetric::DataQualityScore,
        KpiMetric::MissingRate,
        KpiMetric::BadRate,
        KpiMetric::ProductionCoverage,
    ];

    /// Display name used in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            KpiMetric::Auc => "AUC",
            KpiMetric::KsStatistic => "KS Statistic",
            KpiMetric::Gini => "Gini",
            KpiMetric::Psi => "PSI",
            KpiMetric::PopulationStability => "Population Stability",
            KpiMetric::ModelDrift => "Model Drift",
            KpiMetric::DataQualityScore => "Data Quality Score",
            KpiMetric::MissingRate => "Missing Rate",
            KpiMetric::BadRate => "Bad Rate",
            KpiMetric::ProductionCoverage => "Production Coverage",
        }
    }
}

impl fmt::Display for KpiMetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for KpiMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        KpiMetric::ALL
            .iter()
            .copied()
            .find(|m| m.label().to_lowercase().replace(' ', "_") == normalized)
            .or(match normalized.as_str() {
                "ks" => Some(KpiMetric::KsStatistic),
                "quality_score" => Some(KpiMetric::DataQualityScore),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown KPI metric: {}", s))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum KpiCategory {
    Performance,
    Stability,
    Features,
    Business,
}

impl fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KpiCategory::Performance => write!(f, "performance"),
            KpiCategory::Stability => write!(f, "stability"),
            KpiCategory::Features => write!(f, "features"),
            KpiCategory::Business => write!(f, "business"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    Good,
    Warning,
    Critical,
}

impl fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KpiStatus::Good => write!(f, "good"),
            KpiStatus::Warning => write!(f, "warning"),
            KpiStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Baseline and two-threshold rule for one KPI.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct KpiThreshold {
    pub metric: KpiMetric,
    pub category: KpiCategory,
    #[serde(default)]
    pub unit: String,
    pub baseline: f64,
    pub direction: Direction,
    pub good: f64,
    pub warning: f64,
}

impl KpiThreshold {
    pub fn new(
        metric: KpiMetric,
        category: KpiCategory,
        unit: &str,
        baseline: f64,
        direction: Direction,
        good: f64,
        warning: f64,
    ) -> Self {
        Self {
            metric,
            category,
            unit: unit.to_string(),
            baseline,
            direction,
            good,
            warning,
        }
    }

    /// Classify `value`; `good` is checked before `warning`.
    pub fn classify(&self, value: f64) -> KpiStatus {
        match self.direction {
            Direction::HigherIsBetter if value >= self.good => KpiStatus::Good,
            Direction::HigherIsBetter if value >= self.warning => KpiStatus::Warning,
            Direction::LowerIsBetter if value <= self.good => KpiStatus::Good,
            Direction::LowerIsBetter if value <= self.warning => KpiStatus::Warning,
            _ => KpiStatus::Critical,
        }
    }

    /// Percentage change of `value` against the baseline, `0.0` for a zero baseline.
    pub fn delta_pct(&self, value: f64) -> f64 {
        if self.baseline == 0.0 {
            return 0.0;
        }
        (value - self.baseline) / self.baseline * 100.0
    }
}

/// Enumerable KPI configuration, one entry per reported metric.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    pub metrics: Vec<KpiThreshold>,
}

impl ThresholdTable {
    pub fn new(metrics: Vec<KpiThreshold>) -> Self {
        Self { metrics }
    }

    pub fn get(&self, metric: KpiMetric) -> Option<&KpiThreshold> {
        self.metrics.iter().find(|t| t.metric == metric)
    }

    /// Load a table from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalyticsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AnalyticsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| AnalyticsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        use Direction::*;
        use KpiCategory::*;
        use KpiMetric::*;

        Self {
            metrics: vec![
                KpiThreshold::new(Auc, Performance, "", 0.75, HigherIsBetter, 0.85, 0.75),
                KpiThreshold::new(KsStatistic, Performance, "", 0.35, HigherIsBetter, 0.40, 0.30),
                KpiThreshold::new(Gini, Performance, "", 0.50, HigherIsBetter, 0.70, 0.50),
                KpiThreshold::new(Psi, Stability, "", 0.10, LowerIsBetter, 0.05, 0.15),
                KpiThreshold::new(PopulationStability, Stability, "", 0.025, LowerIsBetter, 0.10, 0.25),
                KpiThreshold::new(ModelDrift, Stability, "", 0.020, LowerIsBetter, 0.05, 0.15),
                KpiThreshold::new(DataQualityScore, Features, "%", 85.0, HigherIsBetter, 90.0, 80.0),
                KpiThreshold::new(MissingRate, Features, "%", 2.0, LowerIsBetter, 2.0, 5.0),
                KpiThreshold::new(BadRate, Business, "", 0.05, LowerIsBetter, 0.05, 0.10),
                KpiThreshold::new(ProductionCoverage, Business, "%", 50.0, HigherIsBetter, 70.0, 40.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auc_bands() {
        let table = ThresholdTable::default();
        let auc = table.get(KpiMetric::Auc).unwrap();
        assert_eq!(auc.classify(0.90), KpiStatus::Good);
        assert_eq!(auc.classify(0.85), KpiStatus::Good);
        assert_eq!(auc.classify(0.80), KpiStatus::Warning);
        assert_eq!(auc.classify(0.70), KpiStatus::Critical);
    }

    #[test]
    fn psi_bands_lower_is_better() {
        let table = ThresholdTable::default();
        let psi = table.get(KpiMetric::Psi).unwrap();
        assert_eq!(psi.classify(0.03), KpiStatus::Good);
        assert_eq!(psi.classify(0.12), KpiStatus::Warning);
        assert_eq!(psi.classify(0.30), KpiStatus::Critical);
    }

    #[test]
    fn delta_against_zero_baseline_is_zero() {
        let t = KpiThreshold::new(
            KpiMetric::Auc,
            KpiCategory::Performance,
            "",
            0.0,
            Direction::HigherIsBetter,
            1.0,
            0.5,
        );
        assert_eq!(t.delta_pct(0.8), 0.0);
    }

    #[test]
    fn default_table_covers_every_metric() {
        let table = ThresholdTable::default();
        for metric in KpiMetric::ALL {
            assert!(table.get(metric).is_some(), "missing {}", metric);
        }
    }

    #[test]
    fn metric_from_str_accepts_labels() {
        assert_eq!("AUC".parse::<KpiMetric>().unwrap(), KpiMetric::Auc);
        assert_eq!(
            "data quality score".parse::<KpiMetric>().unwrap(),
            KpiMetric::DataQualityScore
        );
        assert_eq!("ks".parse::<KpiMetric>().unwrap(), KpiMetric::KsStatistic);
        assert!("lift".parse::<KpiMetric>().is_err());
    }

    #[test]
    fn table_loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(
            &path,
            r#"{"metrics": [{"metric": "auc", "category": "performance", "baseline": 0.7,
                "direction": "higher_is_better", "good": 0.8, "warning": 0.7}]}"#,
        )
        .unwrap();

        let table = ThresholdTable::from_json_file(&path).unwrap();
        assert_eq!(table.metrics.len(), 1);
        assert_eq!(table.get(KpiMetric::Auc).unwrap().classify(0.75), KpiStatus::Warning);
        assert!(table.get(KpiMetric::Psi).is_none());
    }

    #[test]
    fn unreadable_table_reports_path() {
        let err = ThresholdTable::from_json_file("/nonexistent/thresholds.json").unwrap_err();
        assert!(matches!(err, AnalyticsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/thresholds.json"));
    }
}
