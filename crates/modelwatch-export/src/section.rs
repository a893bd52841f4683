use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Report sections, declared in output order.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Kpis,
    PerformanceTrend,
    DriftDistribution,
    QualityHeatmap,
    DeploymentStatus,
    DecileAnalysis,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::Kpis,
        SectionKey::PerformanceTrend,
        SectionKey::DriftDistribution,
        SectionKey::QualityHeatmap,
        SectionKey::DeploymentStatus,
        SectionKey::DecileAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Kpis => "kpis",
            SectionKey::PerformanceTrend => "performance_trend",
            SectionKey::DriftDistribution => "drift_distribution",
            SectionKey::QualityHeatmap => "quality_heatmap",
            SectionKey::DeploymentStatus => "deployment_status",
            SectionKey::DecileAnalysis => "decile_analysis",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::Kpis => "Key Performance Indicators",
            SectionKey::PerformanceTrend => "Performance Trend",
            SectionKey::DriftDistribution => "Drift Distribution",
            SectionKey::QualityHeatmap => "Data Quality Heatmap",
            SectionKey::DeploymentStatus => "Deployment Status",
            SectionKey::DecileAnalysis => "Decile Analysis",
        }
    }

    /// The KPI block is a literal table; every other section is a captured chart.
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionKey::Kpis => SectionKind::Table,
            SectionKey::PerformanceTrend => SectionKind::Image { aspect_ratio: 2.0 },
            SectionKey::DriftDistribution => SectionKind::Image { aspect_ratio: 1.6 },
            SectionKey::QualityHeatmap => SectionKind::Image { aspect_ratio: 1.4 },
            SectionKey::DeploymentStatus => SectionKind::Image { aspect_ratio: 2.4 },
            SectionKey::DecileAnalysis => SectionKind::Image { aspect_ratio: 1.8 },
        }
    }

    /// Region id handed to the capture adapter.
    pub fn capture_target(&self) -> String {
        format!("section-{}", self.as_str().replace('_', "-"))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SectionKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("Unknown report section: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionKind {
    Table,
    /// Captured raster; `aspect_ratio` is width over height.
    Image { aspect_ratio: f64 },
}

impl SectionKind {
    pub fn is_image(&self) -> bool {
        matches!(self, SectionKind::Image { .. })
    }
}

/// One orderable unit of the exported report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSection {
    pub key: SectionKey,
    pub title: String,
    pub kind: SectionKind,
    pub capture_target: String,
    pub included: bool,
}

impl From<SectionKey> for ExportSection {
    fn from(key: SectionKey) -> Self {
        Self {
            key,
            title: key.title().to_string(),
            kind: key.kind(),
            capture_target: key.capture_target(),
            included: true,
        }
    }
}

/// Every section in report order, flagged by membership in `included`.
pub fn section_plan(included: &BTreeSet<SectionKey>) -> Vec<ExportSection> {
    SectionKey::ALL
        .iter()
        .map(|&key| ExportSection {
            included: included.contains(&key),
            ..ExportSection::from(key)
        })
        .collect()
}
