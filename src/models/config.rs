//! Configuration data model and validation

use crate::types::{AppError, ParsePolicy, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Authoritative domain → addresses catalog
    #[serde(default = "default_source_path")]
    pub source_path: String,

    /// Where probe results are saved and reloaded from
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Probe program to invoke
    #[serde(default = "default_ping_program")]
    pub ping_program: String,

    /// Packets sent per probe
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Seconds the probe waits for each reply
    #[serde(default = "default_ping_wait_secs")]
    pub ping_wait_secs: u64,

    /// Extra flags passed to the probe program before the address
    #[serde(default)]
    pub ping_options: Vec<String>,

    /// Concurrent probes per domain; 0 picks a default from the core count
    #[serde(default)]
    pub concurrency: usize,

    /// Handling of probe output that cannot be parsed
    #[serde(default)]
    pub parse_policy: ParsePolicy,

    /// 0 = silent, 1 = show invocations, 2 = invocations with results
    #[serde(default = "default_progress_level")]
    pub progress_level: u8,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            snapshot_path: default_snapshot_path(),
            ping_program: default_ping_program(),
            ping_count: default_ping_count(),
            ping_wait_secs: default_ping_wait_secs(),
            ping_options: Vec::new(),
            concurrency: 0,
            parse_policy: ParsePolicy::default(),
            progress_level: default_progress_level(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Upper bound for one probe invocation, past which it counts as silent
    pub fn probe_deadline(&self) -> Duration {
        Duration::from_secs(self.ping_count as u64 * self.ping_wait_secs) + crate::defaults::PROBE_DEADLINE_SLACK
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.source_path.trim().is_empty() {
            return Err(AppError::config("Source catalog path cannot be empty"));
        }

        if self.snapshot_path.trim().is_empty() {
            return Err(AppError::config("Snapshot path cannot be empty"));
        }

        if self.ping_program.trim().is_empty() {
            return Err(AppError::config("Ping program cannot be empty"));
        }

        if self.ping_count == 0 {
            return Err(AppError::config("Ping count must be greater than 0"));
        }

        if self.ping_count > crate::defaults::MAX_PING_COUNT {
            return Err(AppError::config(format!(
                "Ping count cannot exceed {}",
                crate::defaults::MAX_PING_COUNT
            )));
        }

        if self.ping_wait_secs == 0 {
            return Err(AppError::config("Ping wait must be greater than 0"));
        }

        if self.ping_wait_secs > crate::defaults::MAX_PING_WAIT_SECS {
            return Err(AppError::config(format!(
                "Ping wait cannot exceed {} seconds",
                crate::defaults::MAX_PING_WAIT_SECS
            )));
        }

        if self.concurrency > crate::defaults::MAX_CONCURRENCY {
            return Err(AppError::config(format!(
                "Concurrency cannot exceed {}",
                crate::defaults::MAX_CONCURRENCY
            )));
        }

        if self.progress_level > 2 {
            return Err(AppError::config("Progress level must be 0, 1 or 2"));
        }

        Ok(())
    }

    /// Merge settings from any key/value source shaped like the environment
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup("DPING_SOURCE") {
            self.source_path = source.trim().to_string();
        }

        if let Some(snapshot) = lookup("DPING_SNAPSHOT") {
            self.snapshot_path = snapshot.trim().to_string();
        }

        if let Some(program) = lookup("DPING_PING_PROGRAM") {
            self.ping_program = program.trim().to_string();
        }

        if let Some(count) = lookup("DPING_PING_COUNT") {
            self.ping_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DPING_PING_COUNT value '{}': {}", count, e)))?;
        }

        if let Some(wait) = lookup("DPING_PING_WAIT") {
            self.ping_wait_secs = wait.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DPING_PING_WAIT value '{}': {}", wait, e)))?;
        }

        if let Some(options) = lookup("DPING_PING_OPTS") {
            self.ping_options = split_options(&options)
                .map_err(|e| AppError::config(format!("Invalid DPING_PING_OPTS value '{}': {}", options, e)))?;
        }

        if let Some(concurrency) = lookup("DPING_CONCURRENCY") {
            self.concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DPING_CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Some(policy) = lookup("DPING_PARSE_POLICY") {
            self.parse_policy = policy.parse()?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a probe option string into arguments with shell quoting rules
pub fn split_options(options: &str) -> std::result::Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(options)
}

// Default value functions for serde
fn default_source_path() -> String {
    crate::defaults::DEFAULT_SOURCE_PATH.to_string()
}

fn default_snapshot_path() -> String {
    crate::defaults::DEFAULT_SNAPSHOT_PATH.to_string()
}

fn default_ping_program() -> String {
    crate::defaults::DEFAULT_PING_PROGRAM.to_string()
}

fn default_ping_count() -> u32 {
    crate::defaults::DEFAULT_PING_COUNT
}

fn default_ping_wait_secs() -> u64 {
    crate::defaults::DEFAULT_PING_WAIT.as_secs()
}

fn default_progress_level() -> u8 {
    crate::defaults::DEFAULT_PROGRESS_LEVEL
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
