//! Runner settings from `NN_*` environment variables.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use eyre::eyre;
use nn_registry::Vec3;
use nn_tick::SystemConfig;

/// Largest accepted half-extent. Keeps `[-e, e]` sampling finite.
const MAX_EXTENT: f32 = f32::MAX / 4.0;

/// Everything the runner needs, with defaults for unset variables.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub system: SystemConfig,
    /// Agents spawned at startup and preallocated in the pool.
    pub start_pool_size: usize,
    /// Upper bound on simultaneously active agents.
    pub max_pool_size: usize,
    /// Agent speed in units per second.
    pub movement_speed: f32,
    /// Half-extents of the box agents wander in.
    pub movement_area: Vec3,
    /// Fixed steps per second.
    pub target_fps: f32,
    /// Stop after this many steps; `None` runs until `quit`.
    pub max_ticks: Option<u64>,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            start_pool_size: 100,
            max_pool_size: 10_000,
            movement_speed: 2.0,
            movement_area: Vec3::new(10.0, 10.0, 10.0),
            target_fps: 50.0,
            max_ticks: None,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Read the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let defaults = Self::default();

        let start_pool_size = parse_or(&lookup, "NN_START_POOL_SIZE", defaults.start_pool_size)?;
        let system = SystemConfig {
            update_interval: parse_or(
                &lookup,
                "NN_UPDATE_INTERVAL",
                defaults.system.update_interval,
            )?,
            initial_capacity: start_pool_size,
            batch_size: parse_or(&lookup, "NN_BATCH_SIZE", defaults.system.batch_size)?,
            worker_threads: parse_opt(&lookup, "NN_WORKERS")?,
        };
        system.validate()?;

        let config = Self {
            system,
            start_pool_size,
            max_pool_size: parse_or(&lookup, "NN_MAX_POOL_SIZE", defaults.max_pool_size)?,
            movement_speed: parse_or(&lookup, "NN_MOVEMENT_SPEED", defaults.movement_speed)?,
            movement_area: match lookup("NN_MOVEMENT_AREA") {
                Some(raw) => parse_extent(&raw)?,
                None => defaults.movement_area,
            },
            target_fps: parse_or(&lookup, "NN_TARGET_FPS", defaults.target_fps)?,
            max_ticks: parse_opt(&lookup, "NN_TICKS")?,
            seed: parse_opt(&lookup, "NN_SEED")?,
        };

        if !(config.target_fps.is_finite()
            && config.target_fps > 0.0
            && Duration::try_from_secs_f32(config.step_seconds()).is_ok())
        {
            return Err(eyre!("NN_TARGET_FPS must be positive (got {})", config.target_fps));
        }
        if !(config.movement_speed.is_finite() && config.movement_speed >= 0.0) {
            return Err(eyre!(
                "NN_MOVEMENT_SPEED must be finite and non-negative (got {})",
                config.movement_speed
            ));
        }
        let area = config.movement_area;
        if [area.x, area.y, area.z]
            .iter()
            .any(|extent| extent.is_nan() || extent.abs() > MAX_EXTENT)
        {
            return Err(eyre!("NN_MOVEMENT_AREA must be finite (got {area:?})"));
        }
        if config.start_pool_size > config.max_pool_size {
            return Err(eyre!(
                "NN_START_POOL_SIZE ({}) exceeds NN_MAX_POOL_SIZE ({})",
                config.start_pool_size,
                config.max_pool_size
            ));
        }

        Ok(config)
    }

    /// Seconds per fixed step.
    #[must_use]
    pub fn step_seconds(&self) -> f32 {
        1.0 / self.target_fps
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> eyre::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| eyre!("invalid {name}={raw:?}: {e}")),
        None => Ok(None),
    }
}

/// `"8"` for a cube or `"8,2,8"` per axis.
fn parse_extent(raw: &str) -> eyre::Result<Vec3> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| eyre!("invalid NN_MOVEMENT_AREA={raw:?}: {e}"))?;

    match parts.as_slice() {
        &[s] => Ok(Vec3::new(s, s, s)),
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(eyre!("NN_MOVEMENT_AREA expects 1 or 3 values, got {raw:?}")),
    }
}
