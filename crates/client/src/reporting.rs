//! Error reporting configuration.
//!
//! Reporting is only active in the deployed environments. When active,
//! uncaught panics are logged through `tracing` before the default hook runs.

use std::sync::{Mutex, PoisonError};

const REPORTING_MODES: [&str; 2] = ["homologation", "production"];

#[derive(Debug, Clone)]
pub struct ReportingConfig {
    pub access_token: Option<String>,
    pub environment: String,
    pub enabled: bool,
    pub capture_uncaught: bool,
    pub ignore_duplicate_errors: bool,
}

impl ReportingConfig {
    pub fn for_mode(access_token: Option<String>, mode: &str) -> Self {
        Self {
            access_token,
            environment: mode.to_string(),
            enabled: REPORTING_MODES.contains(&mode),
            capture_uncaught: true,
            ignore_duplicate_errors: true,
        }
    }
}

/// Deduplicating sink for reported errors.
#[derive(Debug)]
pub struct Reporter {
    config: ReportingConfig,
    last: Mutex<Option<String>>,
}

impl Reporter {
    pub fn new(config: ReportingConfig) -> Self {
        Self {
            config,
            last: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ReportingConfig {
        &self.config
    }

    /// Reports `message`. Returns `false` when it was dropped.
    pub fn report(&self, message: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if self.config.ignore_duplicate_errors && last.as_deref() == Some(message) {
            return false;
        }
        *last = Some(message.to_string());
        tracing::error!(environment = %self.config.environment, "{message}");
        true
    }
}

/// Installs a panic hook reporting uncaught panics.
pub fn install_panic_hook(config: ReportingConfig) {
    if !config.enabled || !config.capture_uncaught {
        return;
    }
    tracing::info!(
        environment = %config.environment,
        token_configured = config.access_token.is_some(),
        "error reporting enabled"
    );

    let reporter = Reporter::new(config);
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let location = info
            .location()
            .map(|l| format!(" at {}:{}", l.file(), l.line()))
            .unwrap_or_default();
        reporter.report(&format!("uncaught panic: {payload}{location}"));
        previous(info);
    }));
}
