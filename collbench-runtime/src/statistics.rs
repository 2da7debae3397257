//! Statistical functions for summarizing per-worker throughput
//!
//! Workers with no measurable elapsed time have no rate and are left out
//! of every aggregate.

use crate::{TrialResult, WorkerId};
use serde::{Deserialize, Serialize};

/// Calculate the arithmetic mean of a slice of values
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice of values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Calculate the standard deviation of a slice of values
pub fn standard_deviation(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Aggregate throughput over all counted workers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub workers: usize,
    /// Sum of per-worker rates, checks/second for the whole machine
    pub total_rate: f64,
    pub mean_rate: f64,
    pub std_dev: f64,
    pub slowest: WorkerId,
    pub slowest_rate: f64,
    pub fastest: WorkerId,
    pub fastest_rate: f64,
}

impl RateSummary {
    /// Summarize `results`, or `None` if no worker has a rate
    pub fn from_results(results: &[TrialResult]) -> Option<Self> {
        let rated: Vec<(WorkerId, f64)> = results
            .iter()
            .filter(|r| r.worker != WorkerId::Warmup)
            .filter_map(|r| r.throughput().map(|rate| (r.worker, rate)))
            .collect();

        let (slowest, slowest_rate) = rated
            .iter()
            .copied()
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        let (fastest, fastest_rate) = rated
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let rates: Vec<f64> = rated.iter().map(|(_, rate)| *rate).collect();

        Some(Self {
            workers: rates.len(),
            total_rate: rates.iter().sum(),
            mean_rate: mean(&rates),
            std_dev: standard_deviation(&rates),
            slowest,
            slowest_rate,
            fastest,
            fastest_rate,
        })
    }

    /// Coefficient of variation across workers, in percent
    pub fn spread_pct(&self) -> f64 {
        if self.mean_rate > 0.0 {
            self.std_dev / self.mean_rate * 100.0
        } else {
            0.0
        }
    }
}
