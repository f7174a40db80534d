//! One-line progress messages printed while probing

use crate::models::AddressRecord;
use std::io::{self, Write};

/// Prints `dn: <name> ..` per domain and one line per finished probe
///
/// Level 0 prints nothing, 1 prints the invocation, 2 adds latency, loss
/// and score.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    level: u8,
}

impl ProgressReporter {
    pub fn new(level: u8) -> Self {
        Self { level }
    }

    pub fn silent() -> Self {
        Self::new(0)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn domain_started(&self, name: &str) {
        if self.level > 0 {
            emit(&format_domain_line(name));
        }
    }

    pub fn probe_finished(&self, invocation: &str, record: &AddressRecord) {
        if let Some(line) = format_probe_line(self.level, invocation, record) {
            emit(&line);
        }
    }
}

fn emit(line: &str) {
    // A single write per line keeps concurrent probes from interleaving
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", line);
    let _ = stdout.flush();
}

pub fn format_domain_line(name: &str) -> String {
    format!("dn: {} ..", name)
}

pub fn format_probe_line(level: u8, invocation: &str, record: &AddressRecord) -> Option<String> {
    if level == 0 {
        return None;
    }

    let mut line = format!(" -> {:<40}", format!("{} ..", invocation));
    if level > 1 {
        line.push_str(&format!(
            "{:>8.2}, {:>6.1}, {:>8.2}",
            record.latency_ms,
            record.loss_pct,
            record.score()
        ));
    }
    Some(line)
}
