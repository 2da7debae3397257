use crate::error::QueryError;
use crate::observer::{BenchEvent, BenchObserver};
use crate::scene::{CollisionRequest, Scene};
use crate::{TrialResult, WorkerId};
use std::hint::black_box;
use std::time::Instant;

/// Run `trials` collision checks of `state` against `scene` and time them.
///
/// Only the loop is timed. The first failed check ends the run; it is not
/// retried.
pub fn run_worker<S: Scene>(
    worker: WorkerId,
    trials: u64,
    scene: &S,
    state: &S::State,
    request: &CollisionRequest,
    observer: &dyn BenchObserver,
) -> Result<TrialResult, QueryError> {
    observer.on_event(&BenchEvent::WorkerStarted { worker });

    let mut collisions = 0u64;
    let start = Instant::now();
    for _ in 0..trials {
        let result = scene.check_collision(request, black_box(state))?;
        if black_box(result).collision {
            collisions += 1;
        }
    }
    let elapsed = start.elapsed();

    let result = TrialResult::new(worker, trials, elapsed, collisions);
    observer.on_event(&BenchEvent::WorkerFinished {
        result: result.clone(),
        trials_per_second: result.throughput(),
    });
    Ok(result)
}
