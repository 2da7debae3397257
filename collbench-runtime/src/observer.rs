//! Observable output of a benchmark run.
//!
//! Components report typed events to an injected [`BenchObserver`] instead
//! of a global logger. Workers report from their own threads, so observers
//! must be `Sync`.

use crate::runner::Phase;
use crate::{TrialResult, WorkerId};
use serde::Serialize;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BenchEvent {
    PhaseChanged { phase: Phase },
    /// Rejection sampling of `count` inputs begins.
    SamplingStarted { count: usize },
    SampleAccepted { index: usize, attempts: u64 },
    /// Live updates are on and the run waits for the operator.
    WaitingForSignal,
    WorkerStarted { worker: WorkerId },
    /// A worker completed its checks. `trials_per_second` is `None` when
    /// the run took no measurable time.
    WorkerFinished {
        result: TrialResult,
        trials_per_second: Option<f64>,
    },
}

pub trait BenchObserver: Sync {
    fn on_event(&self, event: &BenchEvent);
}

/// Discards every event.
pub struct NullObserver;

impl BenchObserver for NullObserver {
    fn on_event(&self, _event: &BenchEvent) {}
}

/// Logs events through `tracing`.
pub struct TracingObserver;

impl BenchObserver for TracingObserver {
    fn on_event(&self, event: &BenchEvent) {
        match event {
            BenchEvent::PhaseChanged { phase } => {
                tracing::debug!(?phase, "phase changed");
            }
            BenchEvent::SamplingStarted { count } => {
                tracing::info!("Sampling {} valid states...", count);
            }
            BenchEvent::SampleAccepted { index, attempts } => {
                tracing::debug!(index, attempts, "accepted collision-free state");
            }
            BenchEvent::WaitingForSignal => {
                tracing::info!("Listening to scene updates, waiting for go-ahead");
            }
            BenchEvent::WorkerStarted { worker } => {
                tracing::info!("Starting thread {}", worker);
            }
            BenchEvent::WorkerFinished { result, .. } if result.worker == WorkerId::Warmup => {
                tracing::debug!(
                    trials = result.trials,
                    elapsed_ms = result.elapsed.as_secs_f64() * 1000.0,
                    "warm-up finished"
                );
            }
            BenchEvent::WorkerFinished {
                result,
                trials_per_second,
            } => match trials_per_second {
                Some(rate) => tracing::info!(
                    "Thread {} performed {:.2} collision checks per second",
                    result.worker,
                    rate
                ),
                None => tracing::info!(
                    "Thread {} performed {} collision checks in no measurable time",
                    result.worker,
                    result.trials
                ),
            },
        }
    }
}

/// Writes each event to stderr as one `{"event": ...}` JSON line.
pub struct JsonObserver;

impl BenchObserver for JsonObserver {
    fn on_event(&self, event: &BenchEvent) {
        if let Ok(json) = serde_json::to_string(&serde_json::json!({ "event": event })) {
            eprintln!("{}", json);
        }
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<BenchEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BenchEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn finished_workers(&self) -> Vec<TrialResult> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                BenchEvent::WorkerFinished { result, .. } => Some(result),
                _ => None,
            })
            .collect()
    }
}

impl BenchObserver for RecordingObserver {
    fn on_event(&self, event: &BenchEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
