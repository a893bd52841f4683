use chrono::NaiveDate;
use modelwatch_analytics::records::{MetricRecord, RagStatus};

/// Entity name used when no entity is selected.
pub const DEFAULT_ENTITY: &str = "Portfolio";

/// Summary block laid out on the first page or slide.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverSummary {
    pub title: String,
    pub entity_name: String,
    pub generated_on: NaiveDate,
    pub record_count: usize,
    pub first_period: Option<String>,
    pub latest_period: Option<String>,
    pub latest_status: Option<RagStatus>,
    pub total_volume: u64,
    /// Latest metric values, in key order.
    pub headline: Vec<(String, f64)>,
}

impl CoverSummary {
    pub fn new(
        entity_name: Option<&str>,
        metrics: &[MetricRecord],
        latest: Option<&MetricRecord>,
        generated_on: NaiveDate,
    ) -> Self {
        let entity_name = entity_name.unwrap_or(DEFAULT_ENTITY).to_string();
        let first_period = metrics.iter().map(|r| r.period.clone()).min();
        let latest_period = latest
            .map(|r| r.period.clone())
            .or_else(|| metrics.iter().map(|r| r.period.clone()).max());

        Self {
            title: format!("{} Monitoring Report", entity_name),
            entity_name,
            generated_on,
            record_count: metrics.len(),
            first_period,
            latest_period,
            latest_status: latest.map(|r| r.status),
            total_volume: metrics.iter().map(|r| r.volume).sum(),
            headline: latest
                .map(|r| r.metrics.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default(),
        }
    }

    /// Body lines under the cover title.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Entity: {}", self.entity_name),
            format!("Generated: {}", self.generated_on.format("%Y-%m-%d")),
        ];

        match (&self.first_period, &self.latest_period) {
            (Some(first), Some(latest)) => lines.push(format!(
                "Periods: {} to {} ({} snapshots)",
                first, latest, self.record_count
            )),
            _ => lines.push("No metric history available".to_string()),
        }
        if let Some(status) = self.latest_status {
            lines.push(format!("Latest status: {}", status.to_string().to_uppercase()));
        }
        if self.record_count > 0 {
            lines.push(format!("Total volume: {}", self.total_volume));
        }
        for (name, value) in &self.headline {
            lines.push(format!("{}: {:.4}", name.to_uppercase(), value));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_to_portfolio_without_entity() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let cover = CoverSummary::new(None, &[], None, date);
        assert_eq!(cover.entity_name, "Portfolio");
        assert!(cover.lines().contains(&"No metric history available".to_string()));
    }

    #[test]
    fn headline_comes_from_latest_record() {
        let mut metrics = BTreeMap::new();
        metrics.insert("auc".to_string(), 0.8123);
        metrics.insert("ks".to_string(), 0.41);
        let latest = MetricRecord {
            entity_id: "m1".into(),
            period: "2024-06".into(),
            metrics,
            volume: 500,
            status: RagStatus::Amber,
        };
        let older = MetricRecord {
            period: "2024-05".into(),
            ..latest.clone()
        };
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let records = vec![older, latest.clone()];
        let cover = CoverSummary::new(Some("Retail PD"), &records, Some(&latest), date);

        let lines = cover.lines();
        assert!(lines.contains(&"Periods: 2024-05 to 2024-06 (2 snapshots)".to_string()));
        assert!(lines.contains(&"Latest status: AMBER".to_string()));
        assert!(lines.contains(&"AUC: 0.8123".to_string()));
        assert_eq!(cover.total_volume, 1000);
    }
}
