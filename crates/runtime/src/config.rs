//! Runtime configuration and environment loading.
use std::env;

use combo_core::EngineConfig;

/// Configuration for one [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Out of combat, only every Nth tick refreshes the snapshot.
    pub non_combat_interval: u32,
}

impl RuntimeConfig {
    pub const DEFAULT_NON_COMBAT_INTERVAL: u32 = 30;

    pub const fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            non_combat_interval: Self::DEFAULT_NON_COMBAT_INTERVAL,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// - `COMBO_SECONDARY_THROTTLE_MS`
    /// - `COMBO_OPENER_TIMEOUT_MS`
    /// - `COMBO_NON_COMBAT_INTERVAL`
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u32>("COMBO_SECONDARY_THROTTLE_MS") {
            config.engine = config.engine.with_secondary_throttle_ms(ms);
        }

        if let Some(ms) = read_env::<u32>("COMBO_OPENER_TIMEOUT_MS") {
            config.engine = config.engine.with_opener_timeout_ms(ms);
        }

        if let Some(interval) = read_env::<u32>("COMBO_NON_COMBAT_INTERVAL") {
            config.non_combat_interval = interval.max(1);
        }

        config
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
