use crate::{
    error::ConfigError,
    resilient_invoker::{QuotaExceeded, ResilienceConfig, ResilientInvoker},
};

/// Builder for [`ResilientInvoker`]s, starting from defaults or from a
/// loaded [`ResilienceConfig`] and overriding individual knobs.
#[derive(Debug, Default)]
pub struct InvokerBuilder {
    base: Option<ResilienceConfig>,
    max_retries: Option<usize>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    jitter: Option<bool>,
    label: Option<String>,
}

impl InvokerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing config, e.g. one read from TOML.
    pub fn config(mut self, cfg: ResilienceConfig) -> Self {
        self.base = Some(cfg);
        self
    }

    /// Sets the total number of attempts, the first one included.
    pub fn max_retries(mut self, attempts: usize) -> Self {
        self.max_retries = Some(attempts);
        self
    }

    /// Sets base and max backoff delays in milliseconds.
    pub fn backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = Some(base_delay_ms);
        self.max_delay_ms = Some(max_delay_ms);
        self
    }

    pub fn base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = Some(base_delay_ms);
        self
    }

    /// Sets jitter toggle for backoff.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Resolves overrides on top of the base config and validates the result.
    pub fn build_config(&self) -> Result<ResilienceConfig, ConfigError> {
        let mut cfg = self.base.clone().unwrap_or_default();
        if let Some(attempts) = self.max_retries {
            cfg.max_retries = attempts;
        }
        if let Some(base) = self.base_delay_ms {
            cfg.base_delay_ms = base;
        }
        if let Some(maxd) = self.max_delay_ms {
            cfg.max_delay_ms = Some(maxd);
        }
        if let Some(jitter) = self.jitter {
            cfg.jitter = jitter;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Builds an invoker with the message-based quota classifier.
    pub fn build(self) -> Result<ResilientInvoker<QuotaExceeded>, ConfigError> {
        self.build_with(QuotaExceeded)
    }

    /// Builds an invoker with a custom classifier.
    pub fn build_with<C>(self, classifier: C) -> Result<ResilientInvoker<C>, ConfigError> {
        let cfg = self.build_config()?;
        log::debug!(
            "Building invoker. label={:?} max_retries={} base_delay_ms={} max_delay_ms={:?} jitter={}",
            self.label,
            cfg.max_retries,
            cfg.base_delay_ms,
            cfg.max_delay_ms,
            cfg.jitter,
        );
        let mut invoker = ResilientInvoker::new(cfg).with_classifier(classifier);
        if let Some(label) = self.label {
            invoker = invoker.with_label(label);
        }
        Ok(invoker)
    }
}
