//! Error types for scene access, collision queries and benchmark runs.

use crate::{TrialResult, WorkerId};
use std::path::PathBuf;
use thiserror::Error;

/// A collision query could not be answered.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// The configuration does not have one value per joint of the model.
    #[error("configuration has {got} joint values, model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The configuration contains a NaN or infinite joint value.
    #[error("joint {joint} has non-finite value {value}")]
    NonFinite { joint: usize, value: f64 },

    /// Scene-specific failure reported by a provider implementation.
    #[error("collision query failed: {0}")]
    Failed(String),
}

/// The scene could not be acquired from its provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No scene source was configured.
    #[error("scene not configured")]
    NotConfigured,

    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The description parsed but does not describe a usable scene.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("could not start live scene updates: {0}")]
    LiveUpdates(String),
}

/// Rejected benchmark configuration, or a config file that could not be handled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("thread count must be greater than 0")]
    ZeroThreads,

    #[error("trials per thread must be greater than 0")]
    ZeroTrials,

    #[error("max contacts must be greater than 0")]
    ZeroMaxContacts,

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The JSON report could not be written.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("scene unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),

    /// No collision-free configuration was found within the attempt limit.
    #[error("no collision-free configuration found after {attempts} attempts")]
    SamplingExhausted { attempts: u64 },

    #[error("collision query failed while sampling: {0}")]
    SamplingQuery(#[source] QueryError),

    #[error("failed waiting for go-ahead: {0}")]
    Signal(#[source] std::io::Error),

    /// A worker's collision query failed. `completed` holds the results of
    /// every worker that did finish.
    #[error("worker {worker} failed: {source}")]
    WorkerQueryFailure {
        worker: WorkerId,
        #[source]
        source: QueryError,
        completed: Vec<TrialResult>,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked {
        worker: WorkerId,
        completed: Vec<TrialResult>,
    },

    #[error("could not start worker {worker}: {source}")]
    Spawn {
        worker: WorkerId,
        #[source]
        source: std::io::Error,
        completed: Vec<TrialResult>,
    },
}

impl BenchError {
    /// Results of workers that finished before the run failed.
    pub fn completed_results(&self) -> &[TrialResult] {
        match self {
            BenchError::WorkerQueryFailure { completed, .. }
            | BenchError::WorkerPanicked { completed, .. }
            | BenchError::Spawn { completed, .. } => completed,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::DimensionMismatch { expected: 3, got: 2 };
        assert_eq!(err.to_string(), "configuration has 2 joint values, model expects 3");

        let err = BenchError::SamplingExhausted { attempts: 50 };
        assert_eq!(
            err.to_string(),
            "no collision-free configuration found after 50 attempts"
        );

        let err: BenchError = ProviderError::NotConfigured.into();
        assert_eq!(err.to_string(), "scene unavailable: scene not configured");
    }

    #[test]
    fn test_completed_results_only_for_worker_failures() {
        let err: BenchError = ConfigError::ZeroThreads.into();
        assert!(err.completed_results().is_empty());

        let err = BenchError::WorkerPanicked {
            worker: WorkerId::Worker(1),
            completed: vec![TrialResult::new(WorkerId::Worker(0), 10, std::time::Duration::from_millis(1), 0)],
        };
        assert_eq!(err.completed_results().len(), 1);
    }
}
