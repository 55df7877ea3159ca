//! Kernel configuration with sensible defaults. Grounded on
//! `system/config.rs`'s builder pattern, generalized from actor-system
//! knobs to the simulation kernel's own (mailbox capacity, property
//! file, checker bounds, trace output).

// Layer 1: Standard library imports
use std::path::PathBuf;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;
pub const DEFAULT_MAX_VISITED_STATES: usize = 100_000;
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

/// Kernel-wide configuration, loadable from a TOML property file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Default capacity applied to mailboxes created without an explicit
    /// bound.
    pub mailbox_capacity: usize,

    /// Upper bound on the number of distinct (app-state × automaton-state)
    /// pairs the liveness checker keeps in its visited set before evicting
    /// the oldest.
    pub max_visited_states: usize,

    /// Re-snapshot every N expanded pairs instead of replaying from the
    /// initial state on every backtrack.
    pub checkpoint_interval: usize,

    /// Optional path to write the explored state graph as Graphviz dot.
    pub dot_output: Option<PathBuf>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            max_visited_states: DEFAULT_MAX_VISITED_STATES,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            dot_output: None,
        }
    }
}

impl KernelConfig {
    pub fn builder() -> KernelConfigBuilder {
        KernelConfigBuilder::default()
    }

    /// Loads a configuration from a TOML file on disk.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
        let config: KernelConfig =
            toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid("mailbox_capacity must be non-zero".into()));
        }
        if self.max_visited_states == 0 {
            return Err(ConfigError::Invalid("max_visited_states must be non-zero".into()));
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::Invalid("checkpoint_interval must be non-zero".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Default)]
pub struct KernelConfigBuilder {
    mailbox_capacity: Option<usize>,
    max_visited_states: Option<usize>,
    checkpoint_interval: Option<usize>,
    dot_output: Option<PathBuf>,
}

impl KernelConfigBuilder {
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn max_visited_states(mut self, max: usize) -> Self {
        self.max_visited_states = Some(max);
        self
    }

    pub fn checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    pub fn dot_output(mut self, path: PathBuf) -> Self {
        self.dot_output = Some(path);
        self
    }

    pub fn build(self) -> Result<KernelConfig, ConfigError> {
        let defaults = KernelConfig::default();
        let config = KernelConfig {
            mailbox_capacity: self.mailbox_capacity.unwrap_or(defaults.mailbox_capacity),
            max_visited_states: self
                .max_visited_states
                .unwrap_or(defaults.max_visited_states),
            checkpoint_interval: self
                .checkpoint_interval
                .unwrap_or(defaults.checkpoint_interval),
            dot_output: self.dot_output,
        };
        config.validate()?;
        Ok(config)
    }
}
