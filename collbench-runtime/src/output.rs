use crate::config::BenchmarkConfig;
use crate::error::ReportError;
use crate::runner::BenchOutcome;
use crate::statistics::RateSummary;
use crate::{TrialResult, WorkerId};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Machine-readable record of one run, written with `--output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// RFC 3339 time the report was produced.
    pub timestamp: String,
    pub threads: usize,
    pub trials: u64,
    pub warmup: TrialResult,
    pub results: Vec<TrialResult>,
    pub summary: Option<RateSummary>,
}

impl BenchReport {
    pub fn new(config: &BenchmarkConfig, outcome: &BenchOutcome) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            threads: config.run.threads,
            trials: config.run.trials,
            warmup: outcome.warmup.clone(),
            results: outcome.results.clone(),
            summary: outcome.summary(),
        }
    }
}

pub fn save_report_to_file<P: AsRef<Path>>(report: &BenchReport, path: P) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn format_duration_human_readable(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}μs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Checks per second with two decimals, e.g. "12345.67 checks/s".
pub fn format_rate(rate: f64) -> String {
    format!("{:.2} checks/s", rate)
}

/// Mean time spent on one check.
pub fn time_per_check(result: &TrialResult) -> Option<Duration> {
    if result.trials == 0 {
        return None;
    }
    let nanos = result.elapsed.as_nanos() / u128::from(result.trials);
    Some(Duration::from_nanos(nanos as u64))
}

pub fn format_worker_result(result: &TrialResult) -> String {
    let label = match result.worker {
        WorkerId::Warmup => "WARMUP".dimmed().bold(),
        WorkerId::Worker(_) => "THREAD".green().bold(),
    };
    let rate = match result.throughput() {
        Some(rate) => format_rate(rate).cyan().bold(),
        None => "no measurable time".yellow(),
    };
    let per_check = time_per_check(result)
        .map(|d| format!(", {}/check", format_duration_human_readable(d)))
        .unwrap_or_default();

    let mut line = format!(
        "{} {:>7} {} ({} checks in {}{})",
        label,
        result.worker.to_string().cyan(),
        rate,
        result.trials,
        format_duration_human_readable(result.elapsed),
        per_check
    );

    if result.collisions > 0 {
        line.push_str(&format!(
            " {}",
            format!("[{} in collision]", result.collisions).yellow()
        ));
    }
    line
}

pub fn format_summary(summary: &RateSummary) -> String {
    format!(
        "{} {} across {} threads (mean {}, ±{:.1}%; slowest {} {}, fastest {} {})",
        "Summary:".cyan().bold(),
        format_rate(summary.total_rate).bold(),
        summary.workers,
        format_rate(summary.mean_rate),
        summary.spread_pct(),
        summary.slowest,
        format_rate(summary.slowest_rate).dimmed(),
        summary.fastest,
        format_rate(summary.fastest_rate).dimmed()
    )
}
