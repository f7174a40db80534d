//! Command-line interface

use crate::types::Operation;
use clap::Parser;

/// dping - rank candidate addresses of domains by latency and packet loss
#[derive(Parser, Debug, Clone)]
#[command(name = "dping")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Operation to run
    #[arg(value_enum)]
    pub operation: Operation,

    /// Source catalog: {group: {domain: [address, ...]}}
    #[arg(long = "dns", value_name = "FILE")]
    pub source: Option<String>,

    /// Snapshot file written by `ping` and read by `show`
    #[arg(long = "out", value_name = "FILE")]
    pub snapshot: Option<String>,

    /// Extra options for the ping program, e.g. --opt "-I tun0"
    #[arg(long = "opt", value_name = "FLAGS", allow_hyphen_values = true)]
    pub ping_options: Option<String>,

    /// Concurrent probes per domain (1 = sequential, 0 = 8 per CPU core)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Packets sent per probe
    #[arg(short = 'c', long)]
    pub count: Option<u32>,

    /// Seconds to wait for each reply
    #[arg(short = 'W', long, value_parser = parse_wait)]
    pub wait: Option<u64>,

    /// Abort the run on probe output that cannot be parsed
    #[arg(long)]
    pub strict: bool,

    /// Suppress per-probe progress lines
    #[arg(short, long, conflicts_with = "progress")]
    pub quiet: bool,

    /// Progress detail: 0 = none, 1 = invocations, 2 = with results
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub progress: Option<u8>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(ref source) = self.source {
            if source.trim().is_empty() {
                return Err("--dns needs a file path".to_string());
            }
        }

        if let Some(ref snapshot) = self.snapshot {
            if snapshot.trim().is_empty() {
                return Err("--out needs a file path".to_string());
            }
        }

        Ok(())
    }

    /// Progress level requested on the command line, if any
    pub fn progress_level(&self) -> Option<u8> {
        if self.quiet {
            Some(0)
        } else {
            self.progress
        }
    }

    /// Color preference from the command line; `None` leaves it to the environment
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

/// Parse the per-reply wait in whole seconds
fn parse_wait(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid wait: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid wait: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Wait must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_PING_WAIT_SECS {
                Err(format!("Wait cannot exceed {} seconds", crate::defaults::MAX_PING_WAIT_SECS))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
