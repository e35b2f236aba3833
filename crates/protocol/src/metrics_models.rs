//! Run metrics and their aggregate view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

/// One entry in the append-only run log.
///
/// Metrics snapshot the agent's name at run time, so renaming or removing the
/// agent later does not rewrite history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RunMetric {
    /// Identifier shared with the `RunStarted` / `RunCompleted` events of
    /// the same run.
    #[ts(type = "string")]
    pub run_id: Uuid,

    /// Agent name at the time of the run.
    pub agent: String,

    /// Wall-clock latency in seconds.
    pub latency_seconds: f64,

    pub token_count: u32,

    pub provider_label: String,

    /// Commit time, serialized as ISO-8601.
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

/// Latency and token figures of a single run, in log order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RunPoint {
    pub agent: String,
    pub latency_seconds: f64,
    pub token_count: u32,
}

/// Aggregate view over the run log, as consumed by dashboards.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct MetricsSummary {
    /// One point per run, oldest first.
    pub runs: Vec<RunPoint>,

    /// Number of runs per provider label.
    pub runs_by_provider: BTreeMap<String, usize>,

    pub total_tokens: u64,

    pub total_latency_seconds: f64,
}

impl MetricsSummary {
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Mean latency across all runs, or `None` when nothing has run yet.
    pub fn mean_latency_seconds(&self) -> Option<f64> {
        if self.runs.is_empty() {
            None
        } else {
            Some(self.total_latency_seconds / self.runs.len() as f64)
        }
    }
}

impl From<&[RunMetric]> for MetricsSummary {
    fn from(metrics: &[RunMetric]) -> Self {
        let mut summary = MetricsSummary::default();

        for metric in metrics {
            summary.runs.push(RunPoint {
                agent: metric.agent.clone(),
                latency_seconds: metric.latency_seconds,
                token_count: metric.token_count,
            });
            *summary
                .runs_by_provider
                .entry(metric.provider_label.clone())
                .or_insert(0) += 1;
            summary.total_tokens += u64::from(metric.token_count);
            summary.total_latency_seconds += metric.latency_seconds;
        }

        summary
    }
}
