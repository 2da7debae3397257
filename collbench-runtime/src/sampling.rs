//! Rejection sampling of collision-free inputs.
//!
//! With no attempt limit the loop is unbounded: a scene in which every
//! configuration collides makes `generate` spin forever. A limit turns that
//! into [`BenchError::SamplingExhausted`].

use crate::error::BenchError;
use crate::observer::{BenchEvent, BenchObserver};
use crate::scene::{CollisionRequest, Scene};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A collision-free state and the number of draws it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub state: T,
    pub attempts: u64,
}

pub struct SampleGenerator<R = StdRng> {
    rng: R,
    request: CollisionRequest,
    max_attempts: Option<u64>,
}

impl SampleGenerator<StdRng> {
    /// Seeded generators produce the same inputs for the same scene.
    pub fn from_seed(seed: Option<u64>, request: CollisionRequest, max_attempts: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, request, max_attempts)
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn new(rng: R, request: CollisionRequest, max_attempts: Option<u64>) -> Self {
        Self {
            rng,
            request,
            max_attempts,
        }
    }

    /// Draw random states until one does not collide with `scene`.
    pub fn generate<S: Scene>(&mut self, scene: &S) -> Result<Sample<S::State>, BenchError> {
        let mut attempts = 0u64;
        loop {
            if let Some(limit) = self.max_attempts {
                if attempts >= limit {
                    return Err(BenchError::SamplingExhausted { attempts });
                }
            }
            attempts += 1;

            let state = scene.random_state(&mut self.rng);
            let result = scene
                .check_collision(&self.request, &state)
                .map_err(BenchError::SamplingQuery)?;
            if !result.collision {
                return Ok(Sample { state, attempts });
            }
        }
    }

    /// Generate `count` inputs one after another.
    pub fn generate_many<S: Scene>(
        &mut self,
        scene: &S,
        count: usize,
        observer: &dyn BenchObserver,
    ) -> Result<Vec<S::State>, BenchError> {
        observer.on_event(&BenchEvent::SamplingStarted { count });

        let mut states = Vec::with_capacity(count);
        for index in 0..count {
            let sample = self.generate(scene)?;
            observer.on_event(&BenchEvent::SampleAccepted {
                index,
                attempts: sample.attempts,
            });
            states.push(sample.state);
        }
        Ok(states)
    }
}
