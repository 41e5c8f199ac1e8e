/*!
 * Emulator Configuration
 *
 * Runtime configuration for the signal context, with environment overrides
 */

use super::limits::{DEFAULT_SIGNAL_EXIT_CODE, MAXIMUM_WAIT_OBJECTS};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Environment variable overriding [`EmulatorConfig::max_wait_objects`]
pub const ENV_MAX_WAIT_OBJECTS: &str = "SIGEMU_MAX_WAIT_OBJECTS";

/// Environment variable overriding [`EmulatorConfig::default_exit_code`]
pub const ENV_EXIT_CODE: &str = "SIGEMU_EXIT_CODE";

/// Signal context configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Ceiling on live children plus caller handles per wait
    pub max_wait_objects: usize,
    /// Exit code when a default action terminates the main thread
    pub default_exit_code: i32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            max_wait_objects: MAXIMUM_WAIT_OBJECTS,
            default_exit_code: DEFAULT_SIGNAL_EXIT_CODE,
        }
    }
}

impl EmulatorConfig {
    /// Defaults overlaid with `SIGEMU_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = env_value::<usize>(ENV_MAX_WAIT_OBJECTS) {
            config = config.with_max_wait_objects(max);
        }
        if let Some(code) = env_value::<i32>(ENV_EXIT_CODE) {
            config.default_exit_code = code;
        }
        config
    }

    /// Lower the wait ceiling; the host ceiling can never be raised
    pub fn with_max_wait_objects(mut self, max: usize) -> Self {
        if max > MAXIMUM_WAIT_OBJECTS {
            warn!(
                requested = max,
                limit = MAXIMUM_WAIT_OBJECTS,
                "Wait object limit clamped to host ceiling"
            );
        }
        self.max_wait_objects = max.min(MAXIMUM_WAIT_OBJECTS);
        self
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}
