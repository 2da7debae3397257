//! Orchestration of a benchmark run.
//!
//! A run moves strictly forward through [`Phase`]:
//! acquire the scene, wait for the operator (or settle), sample one
//! collision-free input per worker, warm up, run every worker in parallel
//! against the same snapshot, join them all.
//!
//! Workers are scoped threads borrowing the snapshot, so every worker is
//! joined before `run` returns, even when one of them fails or panics.

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, QueryError};
use crate::observer::{BenchEvent, BenchObserver};
use crate::sampling::SampleGenerator;
use crate::scene::{CollisionRequest, Scene, SceneProvider};
use crate::signal::GoAhead;
use crate::statistics::RateSummary;
use crate::topology;
use crate::worker::run_worker;
use crate::{TrialResult, WorkerId};
use serde::Serialize;
use std::io;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Unstarted,
    SceneAcquired,
    WaitingForExternalSignal,
    SettleDelay,
    InputsGenerated,
    WarmedUp,
    Running,
    Joined,
    Done,
    Failed,
}

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct BenchOutcome {
    /// The uncounted warm-up run.
    pub warmup: TrialResult,
    /// One result per worker, in spawn order.
    pub results: Vec<TrialResult>,
}

impl BenchOutcome {
    pub fn summary(&self) -> Option<RateSummary> {
        RateSummary::from_results(&self.results)
    }
}

enum WorkerExit {
    Finished(TrialResult),
    Failed(QueryError),
    Panicked,
    SpawnFailed(io::Error),
}

pub struct BenchmarkRunner<'a, P> {
    config: &'a BenchmarkConfig,
    provider: P,
    observer: &'a dyn BenchObserver,
    phase: Phase,
}

impl<'a, P: SceneProvider> BenchmarkRunner<'a, P> {
    pub fn new(config: &'a BenchmarkConfig, provider: P, observer: &'a dyn BenchObserver) -> Self {
        Self {
            config,
            provider,
            observer,
            phase: Phase::Unstarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run the benchmark once. `go_ahead` is only consulted when the
    /// configuration asks to wait for live scene updates.
    pub fn run(&mut self, go_ahead: &mut dyn GoAhead) -> Result<BenchOutcome, BenchError> {
        self.phase = Phase::Unstarted;
        let outcome = self.execute(go_ahead);
        if outcome.is_err() {
            self.enter(Phase::Failed);
        }
        outcome
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            next > self.phase,
            "phase {:?} cannot follow {:?}",
            next,
            self.phase
        );
        self.phase = next;
        self.observer.on_event(&BenchEvent::PhaseChanged { phase: next });
    }

    fn execute(&mut self, go_ahead: &mut dyn GoAhead) -> Result<BenchOutcome, BenchError> {
        let config = self.config;
        let observer = self.observer;
        config.validate()?;
        let request = config.collision.request();

        let mut scene = self.provider.acquire()?;
        self.enter(Phase::SceneAcquired);

        if config.run.wait {
            self.provider.enable_live_updates()?;
            self.enter(Phase::WaitingForExternalSignal);
            observer.on_event(&BenchEvent::WaitingForSignal);

            let signal = go_ahead.wait();
            self.provider.disable_live_updates();
            signal.map_err(BenchError::Signal)?;

            // Freeze the latest snapshot for the rest of the run
            scene = self.provider.acquire()?;
        } else {
            self.enter(Phase::SettleDelay);
            thread::sleep(Duration::from_millis(config.run.settle_delay_ms));
        }
        let scene: &P::Scene = &scene;

        let mut sampler = SampleGenerator::from_seed(
            config.sampling.seed,
            request,
            config.sampling.attempt_limit(),
        );
        let inputs = sampler.generate_many(scene, config.run.threads, observer)?;
        self.enter(Phase::InputsGenerated);

        let warmup = run_worker(
            WorkerId::Warmup,
            config.run.warmup_trials(),
            scene,
            &inputs[0],
            &request,
            observer,
        )
        .map_err(|source| BenchError::WorkerQueryFailure {
            worker: WorkerId::Warmup,
            source,
            completed: Vec::new(),
        })?;
        self.enter(Phase::WarmedUp);

        self.enter(Phase::Running);
        let exits = self.spawn_workers(scene, &inputs, &request);
        self.enter(Phase::Joined);

        let results = collect_results(exits)?;
        self.enter(Phase::Done);

        Ok(BenchOutcome { warmup, results })
    }

    /// Run one worker per input in parallel and join all of them.
    fn spawn_workers<S: Scene>(
        &self,
        scene: &S,
        inputs: &[S::State],
        request: &CollisionRequest,
    ) -> Vec<(WorkerId, WorkerExit)> {
        let trials = self.config.run.trials;
        let observer = self.observer;
        let cores = if self.config.run.pin_threads {
            topology::get_usable_cores()
        } else {
            Vec::new()
        };

        thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .enumerate()
                .map(|(index, state)| {
                    let worker = WorkerId::Worker(index);
                    let core = topology::core_for_worker(&cores, index);
                    let handle = thread::Builder::new()
                        .name(format!("collbench-worker-{}", index))
                        .spawn_scoped(s, move || {
                            if let Some(core) = core {
                                topology::pin_current_thread(core);
                            }
                            run_worker(worker, trials, scene, state, request, observer)
                        });
                    (worker, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(worker, handle)| {
                    let exit = match handle {
                        Ok(handle) => match handle.join() {
                            Ok(Ok(result)) => WorkerExit::Finished(result),
                            Ok(Err(e)) => WorkerExit::Failed(e),
                            Err(_) => WorkerExit::Panicked,
                        },
                        Err(e) => WorkerExit::SpawnFailed(e),
                    };
                    (worker, exit)
                })
                .collect()
        })
    }
}

/// Keep every finished result; report the first failure in spawn order.
fn collect_results(exits: Vec<(WorkerId, WorkerExit)>) -> Result<Vec<TrialResult>, BenchError> {
    let mut completed = Vec::with_capacity(exits.len());
    let mut first_failure = None;

    for (worker, exit) in exits {
        match exit {
            WorkerExit::Finished(result) => completed.push(result),
            failure => {
                if first_failure.is_none() {
                    first_failure = Some((worker, failure));
                }
            }
        }
    }

    match first_failure {
        None => Ok(completed),
        Some((worker, WorkerExit::Failed(source))) => Err(BenchError::WorkerQueryFailure {
            worker,
            source,
            completed,
        }),
        Some((worker, WorkerExit::SpawnFailed(source))) => Err(BenchError::Spawn {
            worker,
            source,
            completed,
        }),
        Some((worker, _)) => Err(BenchError::WorkerPanicked { worker, completed }),
    }
}
