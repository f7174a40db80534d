//! The catalog of domains for one run
//!
//! Loaded from the source catalog or a snapshot, mutated by probing, ranked,
//! then saved and/or reported. Nothing is written while probing is still in
//! progress.

pub mod snapshot;
pub mod source;

pub use snapshot::{decode_snapshot, encode_snapshot, write_atomic, SNAPSHOT_VERSION};
pub use source::parse_source;

use crate::{
    error::{ErrorContext, Result},
    executor::ProbeStrategy,
    models::{AddressRecord, DomainRecord},
    output::{render_report, ReportFormatter},
    types::ReachFilter,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Totals over a catalog, shown in verbose output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub domains: usize,
    pub addresses: usize,
    pub reachable: usize,
    pub unreachable: usize,
    /// Domain holding the best reachable address, if any
    pub best_domain: Option<String>,
    pub best_score: Option<f64>,
}

/// Ordered domain records
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    domains: Vec<DomainRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_domains(domains: Vec<DomainRecord>) -> Self {
        Self { domains }
    }

    pub fn domains(&self) -> &[DomainRecord] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Read the authoritative source catalog; every address starts unmeasured
    pub fn load_source<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source catalog '{}'", path.display()))?;
        Self::from_source_str(&text)
            .with_context(|| format!("Invalid source catalog '{}'", path.display()))
    }

    pub fn from_source_str(text: &str) -> Result<Self> {
        Ok(Self::from_domains(parse_source(text)?))
    }

    /// Read a snapshot written by [`Catalog::save_snapshot`]
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
        Self::from_snapshot_str(&text)
            .with_context(|| format!("Invalid snapshot '{}'", path.display()))
    }

    pub fn from_snapshot_str(text: &str) -> Result<Self> {
        Ok(Self::from_domains(decode_snapshot(text)?))
    }

    pub fn to_snapshot_string(&self) -> Result<String> {
        encode_snapshot(&self.domains)
    }

    /// Write every domain and measurement to `path`, all or nothing
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_snapshot_string()?;
        write_atomic(path.as_ref(), &text)
    }

    /// Probe each domain in turn; addresses within a domain follow the strategy
    pub async fn probe_all(&mut self, strategy: &dyn ProbeStrategy) -> Result<()> {
        for domain in &mut self.domains {
            domain.probe_all(strategy).await?;
        }
        Ok(())
    }

    /// Rank addresses inside every domain, then domains by their best address
    pub fn rank_all(&mut self) {
        for domain in &mut self.domains {
            domain.rank();
        }
        self.domains.sort_by(|a, b| a.rank_cmp(b));
    }

    /// Render one filtered view of the catalog in its current order
    pub fn report(&self, filter: ReachFilter, formatter: &dyn ReportFormatter) -> Result<String> {
        render_report(self, filter, formatter)
    }

    pub fn summary(&self) -> CatalogSummary {
        let addresses = self.domains.iter().map(|d| d.addresses.len()).sum();
        let reachable = self
            .domains
            .iter()
            .flat_map(|d| &d.addresses)
            .filter(|r| r.is_reachable())
            .count();

        let best = self
            .domains
            .iter()
            .filter_map(|d| {
                d.addresses
                    .iter()
                    .filter(|r| r.is_reachable())
                    .map(AddressRecord::score)
                    .min_by(f64::total_cmp)
                    .map(|score| (d.name.as_str(), score))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        CatalogSummary {
            domains: self.domains.len(),
            addresses,
            reachable,
            unreachable: addresses - reachable,
            best_domain: best.map(|(name, _)| name.to_string()),
            best_score: best.map(|(_, score)| score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        executor::{ProbeContext, SequentialExecutor},
        models::{Measurement, BAD_SCORE},
        output::OutputFormatterFactory,
        probe::FixedProber,
        types::ParsePolicy,
    };
    use std::sync::Arc;

    fn measured(name: &str, entries: &[(&str, f64, f64)]) -> DomainRecord {
        DomainRecord::with_addresses(
            name,
            entries
                .iter()
                .map(|(a, l, p)| AddressRecord::with_measurement(*a, Measurement::new(*l, *p)))
                .collect(),
        )
    }

    fn order(catalog: &Catalog) -> Vec<&str> {
        catalog.domains().iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_rank_all_orders_domains_by_best_address() {
        let mut catalog = Catalog::from_domains(vec![
            measured("slow", &[("a", 300.0, 0.0)]),
            measured("dead", &[("b", 0.0, 100.0)]),
            measured("empty", &[]),
            measured("fast", &[("c", 0.0, 100.0), ("d", 20.0, 10.0)]),
        ]);
        catalog.rank_all();

        assert_eq!(order(&catalog), ["fast", "slow", "dead", "empty"]);
        assert_eq!(catalog.domains()[0].addresses[0].address, "d");
        assert_eq!(catalog.domains()[0].best_score(), 40.0);
        assert_eq!(catalog.domains()[3].best_score(), BAD_SCORE);
    }

    #[test]
    fn test_heavy_loss_still_ranks_ahead_of_unreachable() {
        // 2000ms at 100% loss scores above BAD_SCORE but is still reachable
        let mut catalog = Catalog::from_domains(vec![
            measured("dead", &[("a", 0.0, 100.0)]),
            measured("lossy", &[("b", 2000.0, 100.0)]),
        ]);
        catalog.rank_all();
        assert_eq!(order(&catalog), ["lossy", "dead"]);
    }

    #[test]
    fn test_list_without_probing_keeps_source_order() {
        let mut catalog = Catalog::from_source_str(r#"{"g": {"b": ["1"], "a": ["2"], "c": []}}"#).unwrap();
        catalog.rank_all();
        assert_eq!(order(&catalog), ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let mut catalog = Catalog::from_source_str(r#"{"g":{"d1":["2.2.2.2","1.1.1.1"]}}"#).unwrap();
        let prober = FixedProber::new()
            .with_measurement("1.1.1.1", 10.0, 0.0)
            .with_measurement("2.2.2.2", 0.0, 100.0);
        let strategy = SequentialExecutor::new(ProbeContext::quiet(Arc::new(prober), ParsePolicy::Isolate));

        catalog.probe_all(&strategy).await.unwrap();
        catalog.rank_all();

        let addresses: Vec<&str> = catalog.domains()[0].addresses.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(addresses, ["1.1.1.1", "2.2.2.2"]);

        let formatter = OutputFormatterFactory::create_plain_formatter();
        let report = catalog.report(ReachFilter::Reachable, formatter.as_ref()).unwrap();
        assert!(report.lines().next().unwrap().ends_with("(oo:     1/2)"));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dns_info.json");

        let catalog = Catalog::from_domains(vec![
            measured("d1", &[("1.1.1.1", 10.25, 0.0), ("2.2.2.2", 0.0, 100.0)]),
            measured("d2", &[]),
            measured("d3", &[("3.3.3.3", 123.456, 33.3)]),
        ]);
        catalog.save_snapshot(&path).unwrap();
        let loaded = Catalog::load_snapshot(&path).unwrap();

        assert_eq!(loaded.len(), catalog.len());
        for (left, right) in catalog.domains().iter().zip(loaded.domains()) {
            assert_eq!(left.name, right.name);
            assert_eq!(left.addresses.len(), right.addresses.len());
            for (a, b) in left.addresses.iter().zip(&right.addresses) {
                assert_eq!(a.address, b.address);
                assert_eq!(a.measurement(), b.measurement());
            }
        }
    }

    #[test]
    fn test_empty_catalog_round_trip() {
        let text = Catalog::new().to_snapshot_string().unwrap();
        assert!(Catalog::from_snapshot_str(&text).unwrap().is_empty());
    }

    #[test]
    fn test_missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(Catalog::load_source(&missing), Err(crate::AppError::Io(_))));
        assert!(matches!(Catalog::load_snapshot(&missing), Err(crate::AppError::Io(_))));
    }

    #[test]
    fn test_summary() {
        let catalog = Catalog::from_domains(vec![
            measured("d1", &[("a", 50.0, 0.0), ("b", 0.0, 100.0)]),
            measured("d2", &[("c", 12.0, 0.0)]),
        ]);
        let summary = catalog.summary();

        assert_eq!(summary.domains, 2);
        assert_eq!(summary.addresses, 3);
        assert_eq!(summary.reachable, 2);
        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.best_domain.as_deref(), Some("d2"));
        assert_eq!(summary.best_score, Some(12.0));

        let none = Catalog::from_domains(vec![measured("d", &[("x", 0.0, 100.0)])]).summary();
        assert_eq!(none.best_domain, None);
    }
}
