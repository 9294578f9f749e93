/*!
 * Simulation Configuration
 *
 * Construction parameters of the engine and their environment overrides
 */

use crate::core::serde::duration_millis;
use crate::core::types::{SimResult, Tick};
use crate::core::SimError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HORIZON: Tick = 12;
pub const DEFAULT_QUANTUM: Tick = 4;
pub const DEFAULT_CORES: usize = 2;

/// How the clock driver spaces ticks in wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Advance as soon as every actor finished the current tick
    #[default]
    Lockstep,
    /// Sleep a fixed interval (lock released) before each advance
    Interval(#[serde(with = "duration_millis")] Duration),
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tick at which the simulation halts regardless of remaining work
    pub horizon: Tick,
    /// Maximum consecutive ticks a process runs before preemption
    pub quantum: Tick,
    /// Number of core executors
    pub cores: usize,
    #[serde(default)]
    pub pacing: Pacing,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON, DEFAULT_QUANTUM, DEFAULT_CORES)
    }
}

impl SimConfig {
    pub const fn new(horizon: Tick, quantum: Tick, cores: usize) -> Self {
        Self {
            horizon,
            quantum,
            cores,
            pacing: Pacing::Lockstep,
        }
    }

    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.quantum == 0 {
            return Err(SimError::InvalidConfig("quantum must be at least 1 tick".into()));
        }
        if self.cores == 0 {
            return Err(SimError::InvalidConfig("at least one core is required".into()));
        }
        Ok(())
    }

    /// Defaults overridden by `RRSIM_HORIZON`, `RRSIM_QUANTUM`, `RRSIM_CORES`
    /// and `RRSIM_TICK_MS` (0 keeps lockstep pacing)
    pub fn from_env() -> SimResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SimConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(horizon) = parse_var(&lookup, "RRSIM_HORIZON")? {
            config.horizon = horizon;
        }
        if let Some(quantum) = parse_var(&lookup, "RRSIM_QUANTUM")? {
            config.quantum = quantum;
        }
        if let Some(cores) = parse_var(&lookup, "RRSIM_CORES")? {
            config.cores = cores;
        }
        match parse_var::<u64, _>(&lookup, "RRSIM_TICK_MS")? {
            Some(0) | None => {}
            Some(ms) => config.pacing = Pacing::Interval(Duration::from_millis(ms)),
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> SimResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SimError::InvalidConfig(format!("{}='{}' is not a valid number", key, raw))),
    }
}
