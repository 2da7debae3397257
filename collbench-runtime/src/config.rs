use crate::error::ConfigError;
use crate::scene::CollisionRequest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "collbench.toml";

/// How many workers run and how long each of them hammers the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Collision checks performed by each worker
    #[serde(default = "default_trials")]
    pub trials: u64,

    /// Wait for an operator go-ahead after enabling live scene updates
    #[serde(default)]
    pub wait: bool,

    /// Pause before sampling when not waiting for the operator
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Trials of the uncounted warm-up run (None = same as `trials`)
    #[serde(default)]
    pub warmup_trials: Option<u64>,

    /// Pin each worker to its own physical core
    #[serde(default)]
    pub pin_threads: bool,
}

fn default_threads() -> usize { 2 }
fn default_trials() -> u64 { 10_000 }
fn default_settle_delay_ms() -> u64 { 500 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            trials: default_trials(),
            wait: false,
            settle_delay_ms: default_settle_delay_ms(),
            warmup_trials: None,
            pin_threads: false,
        }
    }
}

impl RunConfig {
    pub fn warmup_trials(&self) -> u64 {
        self.warmup_trials.unwrap_or(self.trials)
    }
}

/// Rejection sampling of collision-free inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Fixed seed for reproducible inputs (None = OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Draws allowed per input before giving up (0 = unbounded)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,
}

fn default_max_attempts() -> u64 { 100_000 }

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts: default_max_attempts(),
        }
    }
}

impl SamplingConfig {
    pub fn attempt_limit(&self) -> Option<u64> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionConfig {
    #[serde(default = "default_self_collision")]
    pub self_collision: bool,

    #[serde(default = "default_max_contacts")]
    pub max_contacts: usize,
}

fn default_self_collision() -> bool { true }
fn default_max_contacts() -> usize { 1 }

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            self_collision: default_self_collision(),
            max_contacts: default_max_contacts(),
        }
    }
}

impl CollisionConfig {
    pub fn request(&self) -> CollisionRequest {
        CollisionRequest {
            self_collision: self.self_collision,
            max_contacts: self.max_contacts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Scene description file
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How often the scene file is checked for changes during live updates
    #[serde(default = "default_update_poll_ms")]
    pub update_poll_ms: u64,
}

fn default_update_poll_ms() -> u64 { 200 }

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: None,
            update_poll_ms: default_update_poll_ms(),
        }
    }
}

/// Complete collbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub collision: CollisionConfig,

    #[serde(default)]
    pub scene: SceneConfig,
}

impl BenchmarkConfig {
    /// Load configuration with priority: env vars > config file > defaults
    ///
    /// A missing config file is not an error, a malformed one is.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: BenchmarkConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(threads) = std::env::var("COLLBENCH_THREADS") {
            if let Ok(val) = threads.parse() {
                self.run.threads = val;
            }
        }

        if let Ok(trials) = std::env::var("COLLBENCH_TRIALS") {
            if let Ok(val) = trials.parse() {
                self.run.trials = val;
            }
        }

        if std::env::var("COLLBENCH_WAIT").is_ok() {
            self.run.wait = true;
        }

        if let Ok(seed) = std::env::var("COLLBENCH_SEED") {
            if let Ok(val) = seed.parse() {
                self.sampling.seed = Some(val);
            }
        }

        if let Ok(attempts) = std::env::var("COLLBENCH_MAX_ATTEMPTS") {
            if let Ok(val) = attempts.parse() {
                self.sampling.max_attempts = val;
            }
        }

        if let Ok(path) = std::env::var("COLLBENCH_SCENE") {
            self.scene.path = Some(PathBuf::from(path));
        }
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.run.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.collision.max_contacts == 0 {
            return Err(ConfigError::ZeroMaxContacts);
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }
}
