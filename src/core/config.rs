/*!
 * Kernel Configuration
 *
 * Defaults come from `core::limits`. An optional JSON file named by
 * `KERNEL_CONFIG` is layered on top, then individual environment overrides:
 *
 * - `INTERSECTION_CAPACITY`: vehicles allowed inside at once
 * - `KERNEL_MAX_PID`: largest PID handed out
 * - `TRAFFIC_THREADS`: simulation threads
 * - `TRAFFIC_VEHICLES`: vehicles per simulation thread
 * - `TRAFFIC_SEED`: simulation RNG seed
 * - `KERNEL_WORKLOAD_CHILDREN`: children forked by the process workload
 */

use super::errors::ConfigError;
use crate::process::PidTableConfig;
use crate::traffic::{IntersectionConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "KERNEL_CONFIG";

const DEFAULT_WORKLOAD_CHILDREN: usize = 8;

/// Top-level kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub intersection: IntersectionConfig,
    pub pids: PidTableConfig,
    pub simulation: SimulationConfig,
    /// Children forked by the fork/exit/waitpid workload
    pub workload_children: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            intersection: IntersectionConfig::default(),
            pids: PidTableConfig::default(),
            simulation: SimulationConfig::default(),
            workload_children: DEFAULT_WORKLOAD_CHILDREN,
        }
    }
}

impl KernelConfig {
    /// Defaults, then `KERNEL_CONFIG` file, then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply individual environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(capacity) = env_override("INTERSECTION_CAPACITY")? {
            self.intersection.capacity = capacity;
        }
        if let Some(max_pid) = env_override("KERNEL_MAX_PID")? {
            self.pids.max_pid = max_pid;
        }
        if let Some(threads) = env_override("TRAFFIC_THREADS")? {
            self.simulation.threads = threads;
        }
        if let Some(vehicles) = env_override("TRAFFIC_VEHICLES")? {
            self.simulation.vehicles_per_thread = vehicles;
        }
        if let Some(seed) = env_override("TRAFFIC_SEED")? {
            self.simulation.seed = seed;
        }
        if let Some(children) = env_override("KERNEL_WORKLOAD_CHILDREN")? {
            self.workload_children = children;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.intersection.validate()?;
        self.pids.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
        Err(_) => Ok(None),
    }
}
