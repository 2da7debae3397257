use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod config;
pub mod error;
pub mod geometry;
pub mod monitor;
pub mod observer;
pub mod output;
pub mod planar;
pub mod runner;
pub mod sampling;
pub mod scene;
pub mod signal;
pub mod statistics;
pub mod topology;
pub mod worker;

pub use config::BenchmarkConfig;
pub use error::{BenchError, ConfigError, ProviderError, QueryError, ReportError};
pub use monitor::FileSceneProvider;
pub use observer::{BenchEvent, BenchObserver, JsonObserver, NullObserver, RecordingObserver, TracingObserver};
pub use output::*;
pub use planar::{JointState, PlanarArmScene};
pub use runner::{BenchOutcome, BenchmarkRunner, Phase};
pub use sampling::SampleGenerator;
pub use scene::{CollisionRequest, CollisionResult, Scene, SceneProvider, StaticSceneProvider};
pub use statistics::RateSummary;
pub use signal::{GoAhead, Immediate, ReaderGoAhead, StdinGoAhead};
pub use worker::run_worker;

/// Identity of a worker run. The warm-up run is never one of the counted workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerId {
    Warmup,
    Worker(usize),
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerId::Warmup => write!(f, "warm-up"),
            WorkerId::Worker(id) => write!(f, "{}", id),
        }
    }
}

/// Timing of one worker's batch of collision checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub worker: WorkerId,
    pub trials: u64,
    pub elapsed: Duration,
    /// Checks that reported a collision. Non-zero only if the scene changed
    /// after the input was sampled.
    pub collisions: u64,
}

impl TrialResult {
    pub fn new(worker: WorkerId, trials: u64, elapsed: Duration, collisions: u64) -> Self {
        Self {
            worker,
            trials,
            elapsed,
            collisions,
        }
    }

    /// Checks per second, or `None` if no measurable time elapsed.
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            Some(self.trials as f64 / secs)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let result = TrialResult::new(WorkerId::Worker(0), 10_000, Duration::from_millis(500), 0);
        assert_eq!(result.throughput(), Some(20_000.0));
    }

    #[test]
    fn test_throughput_zero_trials() {
        let result = TrialResult::new(WorkerId::Worker(0), 0, Duration::from_nanos(40), 0);
        assert_eq!(result.throughput(), Some(0.0));
    }

    #[test]
    fn test_throughput_zero_elapsed_is_undefined() {
        let result = TrialResult::new(WorkerId::Worker(3), 0, Duration::ZERO, 0);
        assert_eq!(result.throughput(), None);
    }

    #[test]
    fn test_worker_id_display() {
        assert_eq!(WorkerId::Worker(7).to_string(), "7");
        assert_eq!(WorkerId::Warmup.to_string(), "warm-up");
    }

    #[test]
    fn test_worker_id_serialization() {
        assert_eq!(serde_json::to_string(&WorkerId::Warmup).unwrap(), "\"warmup\"");
        assert_eq!(
            serde_json::to_string(&WorkerId::Worker(2)).unwrap(),
            "{\"worker\":2}"
        );
    }
}
