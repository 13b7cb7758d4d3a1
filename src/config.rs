use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisualizerError};
use crate::levenshtein::EngineOptions;

const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Host-supplied settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    /// Delay between two animation steps.
    pub tick_interval_ms: u64,
    pub engine: EngineOptions,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            engine: EngineOptions::default(),
        }
    }
}

impl VisualizerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: VisualizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(VisualizerError::InvalidConfig(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.engine.max_input_units == Some(0) {
            return Err(VisualizerError::InvalidConfig(
                "max_input_units must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
