use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for retry and backoff behavior.
///
/// Every field may be omitted when deserializing; missing fields take their
/// default value.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Maximum number of attempts including the first one
    pub max_retries: usize,
    /// Delay unit in milliseconds; attempt `n` is followed by `base * 2^n`
    pub base_delay_ms: u64,
    /// Optional ceiling for a single backoff delay
    pub max_delay_ms: Option<u64>,
    /// Whether to subtract random jitter (up to half) from each delay
    pub jitter: bool,
}

const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const MAX_SHIFT: usize = 63;

impl ResilienceConfig {
    /// Default schedule: 3 attempts, 2s then 4s between them, no jitter.
    pub fn defaults() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: None,
            jitter: false,
        }
    }

    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::defaults()
        }
    }

    /// Parses and validates a TOML document holding the config fields.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if let Some(max) = self.max_delay_ms {
            if max < self.base_delay_ms {
                return Err(ConfigError::DelayCapBelowBase {
                    base: self.base_delay_ms,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Deterministic delay after the 1-based `attempt`, before jitter.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u64 << attempt.min(MAX_SHIFT);
        let mut delay = self.base_delay_ms.saturating_mul(factor);
        if let Some(max) = self.max_delay_ms {
            delay = delay.min(max);
        }
        Duration::from_millis(delay)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
