//! Scene provider backed by a scene file, with optional live updates.
//!
//! While live updates are enabled a background thread polls the file and
//! swaps in a freshly loaded snapshot whenever it changes. Snapshots already
//! handed out are never touched.

use crate::error::ProviderError;
use crate::planar::PlanarArmScene;
use crate::scene::SceneProvider;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

type SharedScene = Arc<RwLock<Option<Arc<PlanarArmScene>>>>;

/// Modification time and size, enough to notice a rewritten file.
type FileStamp = (Option<SystemTime>, u64);

struct Updater {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Option<FileStamp>>,
}

pub struct FileSceneProvider {
    path: Option<PathBuf>,
    poll_interval: Duration,
    current: SharedScene,
    updater: Option<Updater>,
}

impl FileSceneProvider {
    pub fn new(path: Option<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            path,
            poll_interval,
            current: Arc::new(RwLock::new(None)),
            updater: None,
        }
    }

    pub fn is_updating(&self) -> bool {
        self.updater.is_some()
    }

    fn path(&self) -> Result<&Path, ProviderError> {
        self.path.as_deref().ok_or(ProviderError::NotConfigured)
    }

    fn snapshot(&self) -> Option<Arc<PlanarArmScene>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn store(current: &SharedScene, scene: Arc<PlanarArmScene>) {
    let mut guard = match current.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(scene);
}

fn file_stamp(path: &Path) -> Option<FileStamp> {
    let metadata = fs::metadata(path).ok()?;
    Some((metadata.modified().ok(), metadata.len()))
}

fn reload(path: &Path, current: &SharedScene) {
    match PlanarArmScene::load(path) {
        Ok(scene) => {
            tracing::info!(
                path = %path.display(),
                obstacles = scene.obstacles.len(),
                "scene updated"
            );
            store(current, Arc::new(scene));
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid scene update");
        }
    }
}

/// Poll `path` until stopped. Returns the last stamp it acted on.
fn watch(
    path: PathBuf,
    poll_interval: Duration,
    current: SharedScene,
    stop: Arc<AtomicBool>,
    mut last_stamp: Option<FileStamp>,
) -> Option<FileStamp> {
    while !stop.load(Ordering::Acquire) {
        thread::park_timeout(poll_interval);
        if stop.load(Ordering::Acquire) {
            break;
        }

        let stamp = file_stamp(&path);
        if stamp.is_none() || stamp == last_stamp {
            continue;
        }
        last_stamp = stamp;
        reload(&path, &current);
    }
    last_stamp
}

impl SceneProvider for FileSceneProvider {
    type Scene = PlanarArmScene;

    fn acquire(&mut self) -> Result<Arc<PlanarArmScene>, ProviderError> {
        if let Some(scene) = self.snapshot() {
            return Ok(scene);
        }
        let scene = Arc::new(PlanarArmScene::load(self.path()?)?);
        store(&self.current, scene.clone());
        Ok(scene)
    }

    fn enable_live_updates(&mut self) -> Result<(), ProviderError> {
        if self.updater.is_some() {
            return Ok(());
        }
        self.acquire()?;

        let path = self.path()?.to_path_buf();
        let stamp = file_stamp(&path);
        let poll_interval = self.poll_interval;
        let current = self.current.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("scene-monitor".to_string())
            .spawn(move || watch(path, poll_interval, current, thread_stop, stamp))
            .map_err(|e| ProviderError::LiveUpdates(e.to_string()))?;

        tracing::debug!("live scene updates enabled");
        self.updater = Some(Updater { stop, handle });
        Ok(())
    }

    fn disable_live_updates(&mut self) {
        if let Some(updater) = self.updater.take() {
            updater.stop.store(true, Ordering::Release);
            updater.handle.thread().unpark();
            let seen = match updater.handle.join() {
                Ok(stamp) => stamp,
                Err(_) => {
                    tracing::warn!("scene monitor thread panicked");
                    None
                }
            };

            // An edit saved after the last poll still belongs to the update window
            if let Some(path) = self.path.as_deref() {
                let stamp = file_stamp(path);
                if stamp.is_some() && stamp != seen {
                    reload(path, &self.current);
                }
            }
            tracing::debug!("live scene updates disabled");
        }
    }
}

impl Drop for FileSceneProvider {
    fn drop(&mut self) {
        self.disable_live_updates();
    }
}
