//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

use crate::models::AddressRecord;

/// Operation selected for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Load the source catalog and rank it without probing
    List,
    /// Load a saved snapshot, rank and report it
    Show,
    /// Probe every address, rank, save a snapshot and report
    Ping,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Show => "show",
            Operation::Ping => "ping",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address selection for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReachFilter {
    /// Every address
    All,
    /// Addresses with a nonzero latency
    Reachable,
    /// Addresses with no recorded latency
    Unreachable,
}

impl ReachFilter {
    pub fn matches(&self, record: &AddressRecord) -> bool {
        match self {
            ReachFilter::All => true,
            ReachFilter::Reachable => record.is_reachable(),
            ReachFilter::Unreachable => !record.is_reachable(),
        }
    }

    /// Short tag shown next to the match ratio
    pub fn signature(&self) -> &'static str {
        match self {
            ReachFilter::All => "ox",
            ReachFilter::Reachable => "oo",
            ReachFilter::Unreachable => "xx",
        }
    }
}

/// What to do when a single probe's output cannot be understood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Record the address as unreachable and keep going
    #[default]
    Isolate,
    /// Abort the whole run on the first failure
    Strict,
}

impl FromStr for ParsePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "isolate" => Ok(ParsePolicy::Isolate),
            "strict" => Ok(ParsePolicy::Strict),
            other => Err(AppError::config(format!(
                "Invalid parse policy '{}', expected 'isolate' or 'strict'",
                other
            ))),
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePolicy::Isolate => f.write_str("isolate"),
            ParsePolicy::Strict => f.write_str("strict"),
        }
    }
}
