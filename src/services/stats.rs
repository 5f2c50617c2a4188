//! Shutdown-time distribution aggregation.

use futures::TryStreamExt;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::DistributionStat;
use crate::domain::ports::SequenceStore;

/// Recomputes the max-value distribution from scratch and appends one
/// snapshot row per statistic. Full scan; runs once per process lifetime,
/// at orderly shutdown, never in the hot loop.
pub struct StatsAggregator {
    store: Arc<dyn SequenceStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// Stream every committed max value, compute the distribution and
    /// persist it.
    pub async fn compute_and_persist(&self) -> DomainResult<Vec<DistributionStat>> {
        let values: Vec<u64> = self.store.all_max_values().try_collect().await?;
        let stats = distribution_of(&values);
        self.store.append_distribution(&stats).await?;
        info!(observations = values.len(), "distribution snapshot persisted");
        Ok(stats)
    }
}

/// Min, max, mean, median and population standard deviation of the
/// observations; all five are 0 when there are none.
fn distribution_of(values: &[u64]) -> Vec<DistributionStat> {
    let (min, max, mean, median, std_dev) = if values.is_empty() {
        (0.0, 0.0, 0.0, 0.0, 0.0)
    } else {
        let count = values.len() as f64;
        let min = *values.iter().min().unwrap_or(&0) as f64;
        let max = *values.iter().max().unwrap_or(&0) as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / count;

        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        };

        let variance = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / count;
        (min, max, mean, median, variance.sqrt())
    };

    vec![
        DistributionStat { stat_name: "min".to_string(), value: min },
        DistributionStat { stat_name: "max".to_string(), value: max },
        DistributionStat { stat_name: "mean".to_string(), value: mean },
        DistributionStat { stat_name: "median".to_string(), value: median },
        DistributionStat { stat_name: "std_dev".to_string(), value: std_dev },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(stats: &[DistributionStat], name: &str) -> f64 {
        stats.iter().find(|s| s.stat_name == name).map(|s| s.value).unwrap()
    }

    #[test]
    fn distribution_of_known_fixture() {
        let stats = distribution_of(&[1, 4, 2, 4, 16]);
        assert_eq!(stat(&stats, "min"), 1.0);
        assert_eq!(stat(&stats, "max"), 16.0);
        assert!((stat(&stats, "mean") - 5.4).abs() < 1e-12);
        assert_eq!(stat(&stats, "median"), 4.0);
        // population variance of [1,4,2,4,16] is 29.44
        assert!((stat(&stats, "std_dev") - 29.44_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn distribution_of_empty_is_all_zero() {
        let stats = distribution_of(&[]);
        assert_eq!(stats.len(), 5);
        assert!(stats.iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let stats = distribution_of(&[1, 2, 3, 10]);
        assert_eq!(stat(&stats, "median"), 2.5);
    }
}
