use serde::{Deserialize, Serialize};

use crate::records::MonitoringJobRecord;
use crate::stats::{summarize, BoxSummary};

/// Box-plot summary of one entity's pooled drift readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub entity_id: String,
    #[serde(flatten)]
    pub summary: BoxSummary,
}

/// One [`DriftSummary`] per entity, in order of first appearance.
///
/// Data and model drift are pooled per entity. Zero and absent readings are
/// left out of the sample rather than treated as measured zeros.
pub fn drift_distribution(jobs: &[MonitoringJobRecord]) -> Vec<DriftSummary> {
    let mut samples: Vec<(String, Vec<f64>)> = Vec::new();

    for job in jobs {
        let idx = match samples.iter().position(|(id, _)| id == &job.entity_id) {
            Some(idx) => idx,
            None => {
                samples.push((job.entity_id.clone(), Vec::new()));
                samples.len() - 1
            }
        };
        let readings = [job.data_drift, job.model_drift];
        samples[idx]
            .1
            .extend(readings.into_iter().flatten().filter(|&v| v != 0.0));
    }

    samples
        .into_iter()
        .map(|(entity_id, values)| DriftSummary {
            entity_id,
            summary: summarize(&values),
        })
        .collect()
}
