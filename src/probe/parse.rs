//! Parsing of `ping -q` summary output
//!
//! ```text
//! --- 8.8.8.8 ping statistics ---
//! 8 packets transmitted, 8 received, 0% packet loss, time 16ms
//! rtt min/avg/max/mdev = 29.539/52.534/109.118/23.357 ms
//! ```

use crate::{
    error::{AppError, Result},
    models::Measurement,
};
use regex::Regex;
use std::sync::OnceLock;

fn loss_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\S*)% packet loss").expect("loss pattern is valid"))
}

fn rtt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"= (\S*) ms").expect("rtt pattern is valid"))
}

/// Turn probe output into a measurement.
///
/// Empty output means the probe never ran or never answered and yields
/// `(0, 100)`. Anything else must carry a loss token, and a round-trip line
/// unless every packet was lost.
pub fn parse_ping_output(output: &str) -> Result<Measurement> {
    if output.trim().is_empty() {
        return Ok(Measurement::unreachable());
    }

    let loss_text = loss_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::probe_parse(format!("no packet loss figure in output: {}", first_line(output))))?;

    let loss_pct: f64 = loss_text
        .parse()
        .map_err(|e| AppError::probe_parse(format!("invalid packet loss '{}': {}", loss_text, e)))?;

    if !(0.0..=100.0).contains(&loss_pct) {
        return Err(AppError::probe_parse(format!("packet loss out of range: {}%", loss_pct)));
    }

    if loss_pct == 100.0 {
        return Ok(Measurement::unreachable());
    }

    let rtt_text = rtt_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::probe_parse(format!("no round-trip statistics with {}% loss", loss_pct)))?;

    // min/avg/max/mdev, or min/avg/max from BusyBox
    let fields: Vec<&str> = rtt_text.split('/').collect();
    if !(3..=4).contains(&fields.len()) {
        return Err(AppError::probe_parse(format!("malformed round-trip statistics '{}'", rtt_text)));
    }

    let latency_ms: f64 = fields[1]
        .parse()
        .map_err(|e| AppError::probe_parse(format!("invalid average rtt '{}': {}", fields[1], e)))?;

    if !latency_ms.is_finite() || latency_ms < 0.0 {
        return Err(AppError::probe_parse(format!("average rtt out of range: {}", latency_ms)));
    }

    Ok(Measurement::new(latency_ms, loss_pct))
}

fn first_line(output: &str) -> &str {
    output.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}
