//! The capability the benchmark consumes: a shared, read-only scene that
//! answers collision queries, and a provider that hands out snapshots of it.

use crate::error::{ProviderError, QueryError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What a collision query should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRequest {
    /// Also test the robot against itself.
    pub self_collision: bool,
    /// Stop searching once this many contacts were found.
    pub max_contacts: usize,
}

impl Default for CollisionRequest {
    fn default() -> Self {
        Self {
            self_collision: true,
            max_contacts: 1,
        }
    }
}

/// What a link touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactTarget {
    Obstacle(usize),
    Link(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub link: usize,
    pub target: ContactTarget,
}

/// Outcome of a single collision query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionResult {
    pub collision: bool,
    pub contacts: Vec<Contact>,
}

impl CollisionResult {
    pub fn add_contact(&mut self, contact: Contact) {
        self.collision = true;
        self.contacts.push(contact);
    }
}

/// A world snapshot that can be queried from many threads at once.
///
/// Queries take `&self`; an implementation that needs internal
/// synchronization must provide it itself.
pub trait Scene: Send + Sync {
    /// A robot configuration, e.g. one value per joint.
    type State: Clone + fmt::Debug + Send + Sync;

    /// Draw a configuration uniformly within the model's limits.
    fn random_state<R: Rng>(&self, rng: &mut R) -> Self::State;

    /// Check `state` against the whole scene. Every call returns a fresh result.
    fn check_collision(
        &self,
        request: &CollisionRequest,
        state: &Self::State,
    ) -> Result<CollisionResult, QueryError>;
}

/// Source of scene snapshots.
///
/// A snapshot is never mutated once handed out. Live updates replace the
/// provider's current snapshot; holders of an older `Arc` keep seeing the
/// old world.
pub trait SceneProvider {
    type Scene: Scene;

    fn acquire(&mut self) -> Result<Arc<Self::Scene>, ProviderError>;

    /// Start accepting external scene updates.
    fn enable_live_updates(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Stop accepting external scene updates. Must not return while an
    /// update is still being applied.
    fn disable_live_updates(&mut self) {}
}

/// Provider around an already built scene (or none at all).
pub struct StaticSceneProvider<S> {
    scene: Option<Arc<S>>,
}

impl<S: Scene> StaticSceneProvider<S> {
    pub fn new(scene: S) -> Self {
        Self {
            scene: Some(Arc::new(scene)),
        }
    }

    pub fn from_arc(scene: Arc<S>) -> Self {
        Self { scene: Some(scene) }
    }

    /// A provider with no scene loaded; `acquire` always fails.
    pub fn empty() -> Self {
        Self { scene: None }
    }
}

impl<S: Scene> SceneProvider for StaticSceneProvider<S> {
    type Scene = S;

    fn acquire(&mut self) -> Result<Arc<S>, ProviderError> {
        self.scene.clone().ok_or(ProviderError::NotConfigured)
    }
}
