//! Snapshot file: measurement results that can be reported without probing
//!
//! Snapshots are written as JSON and read as YAML, so files saved in the older
//! YAML layout (no `version`, keys in any order) load as well.
//!
//! ```json
//! {
//!   "version": 1,
//!   "dns": [
//!     { "dn": "example.net", "ips": [ { "ip": "1.1.1.1", "rtt": 10.0, "lost": 0.0 } ] }
//!   ]
//! }
//! ```

use crate::{
    error::{AppError, ErrorContext, Result},
    models::{AddressRecord, DomainRecord, Measurement},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use uuid::Uuid;

pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    // Files written before the field existed
    SNAPSHOT_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotFile {
    #[serde(default = "default_version")]
    version: u32,
    dns: Vec<SnapshotDomain>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotDomain {
    dn: String,
    ips: Vec<SnapshotAddress>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotAddress {
    ip: String,
    rtt: f64,
    lost: f64,
}

fn check_measurement(domain: &str, address: &str, measurement: Measurement) -> Result<()> {
    if !measurement.latency_ms.is_finite() || measurement.latency_ms < 0.0 {
        return Err(AppError::format(format!(
            "{} / {}: rtt must be a non-negative number, got {}",
            domain, address, measurement.latency_ms
        )));
    }
    if !(0.0..=100.0).contains(&measurement.loss_pct) {
        return Err(AppError::format(format!(
            "{} / {}: lost must be within 0..=100, got {}",
            domain, address, measurement.loss_pct
        )));
    }
    Ok(())
}

/// Pretty-printed snapshot text for `domains`
pub fn encode_snapshot(domains: &[DomainRecord]) -> Result<String> {
    let mut dns = Vec::with_capacity(domains.len());
    for domain in domains {
        let mut ips = Vec::with_capacity(domain.addresses.len());
        for record in &domain.addresses {
            check_measurement(&domain.name, &record.address, record.measurement())?;
            ips.push(SnapshotAddress {
                ip: record.address.clone(),
                rtt: record.latency_ms,
                lost: record.loss_pct,
            });
        }
        dns.push(SnapshotDomain { dn: domain.name.clone(), ips });
    }

    let file = SnapshotFile { version: SNAPSHOT_VERSION, dns };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Domain records from snapshot text, validated
pub fn decode_snapshot(text: &str) -> Result<Vec<DomainRecord>> {
    let file: SnapshotFile = serde_yaml::from_str(text)?;

    if file.version != SNAPSHOT_VERSION {
        return Err(AppError::format(format!(
            "unsupported snapshot version {} (expected {})",
            file.version, SNAPSHOT_VERSION
        )));
    }

    file.dns
        .into_iter()
        .map(|domain| {
            let mut record = DomainRecord::new(domain.dn);
            for ip in domain.ips {
                let measurement = Measurement::new(ip.rtt, ip.lost);
                check_measurement(&record.name, &ip.ip, measurement)?;
                record.push(AddressRecord::with_measurement(ip.ip, measurement));
            }
            Ok(record)
        })
        .collect()
}

/// Replace `path` with `contents` in one step
///
/// The data goes to a sibling temporary file first and is renamed over the
/// target, so readers see either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::io(format!("'{}' is not a file path", path.display())))?;
    let temp = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));

    let written = fs::write(&temp, contents)
        .and_then(|_| fs::File::open(&temp)?.sync_all())
        .and_then(|_| fs::rename(&temp, path));

    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written.with_context(|| format!("Failed to write snapshot '{}'", path.display()))
}
