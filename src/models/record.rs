//! Address and domain records, and the weighted-delay score that ranks them
//!
//! A score is always derived from the current measurement and never stored.
//! Lower is better. Unmeasured or unreachable addresses (zero latency) score
//! [`BAD_SCORE`] and always rank behind every reachable address, whatever
//! loss the reachable one recorded.

use crate::{
    error::Result,
    executor::ProbeStrategy,
    types::ReachFilter,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sentinel score for addresses with no recorded latency
pub const BAD_SCORE: f64 = 10000.0;

/// Weighted delay: latency penalised by 10% per percentage point of loss.
///
/// `latency_ms == 0` means unknown or unreachable and scores [`BAD_SCORE`].
pub fn weighted_delay(latency_ms: f64, loss_pct: f64) -> f64 {
    if latency_ms == 0.0 {
        BAD_SCORE
    } else {
        (1.0 + loss_pct / 10.0) * latency_ms
    }
}

/// Result of one probe invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Average round-trip time in milliseconds, 0 when unknown
    pub latency_ms: f64,
    /// Packet loss percentage in [0, 100]
    pub loss_pct: f64,
}

impl Measurement {
    pub fn new(latency_ms: f64, loss_pct: f64) -> Self {
        Self { latency_ms, loss_pct }
    }

    /// Outcome of a probe that produced nothing usable
    pub fn unreachable() -> Self {
        Self { latency_ms: 0.0, loss_pct: 100.0 }
    }

    pub fn score(&self) -> f64 {
        weighted_delay(self.latency_ms, self.loss_pct)
    }
}

/// One candidate address with its last-known measurement
///
/// Equality compares the address only, never the measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    pub latency_ms: f64,
    pub loss_pct: f64,
}

impl AddressRecord {
    /// Create a record with no measurement yet (reads as fully lost)
    pub fn new<S: Into<String>>(address: S) -> Self {
        let unmeasured = Measurement::unreachable();
        Self {
            address: address.into(),
            latency_ms: unmeasured.latency_ms,
            loss_pct: unmeasured.loss_pct,
        }
    }

    /// Create a record carrying a previously taken measurement
    pub fn with_measurement<S: Into<String>>(address: S, measurement: Measurement) -> Self {
        let mut record = Self::new(address);
        record.apply(measurement);
        record
    }

    /// Overwrite the measurement in place
    pub fn apply(&mut self, measurement: Measurement) {
        self.latency_ms = measurement.latency_ms;
        self.loss_pct = measurement.loss_pct;
    }

    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.latency_ms, self.loss_pct)
    }

    pub fn score(&self) -> f64 {
        weighted_delay(self.latency_ms, self.loss_pct)
    }

    pub fn is_reachable(&self) -> bool {
        self.latency_ms != 0.0
    }

    /// Total order used for ranking: reachable before unreachable, then by score
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_order(self.is_reachable(), self.score(), other.is_reachable(), other.score())
    }
}

impl PartialEq for AddressRecord {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for AddressRecord {}

fn rank_order(a_reachable: bool, a_score: f64, b_reachable: bool, b_score: f64) -> Ordering {
    b_reachable
        .cmp(&a_reachable)
        .then_with(|| a_score.total_cmp(&b_score))
}

/// Addresses of a domain that pass a [`ReachFilter`]
#[derive(Debug)]
pub struct FilterSummary<'a> {
    pub matching: Vec<&'a AddressRecord>,
    pub total: usize,
}

impl FilterSummary<'_> {
    pub fn count(&self) -> usize {
        self.matching.len()
    }

    /// `matched/total`, as shown in reports
    pub fn ratio(&self) -> String {
        format!("{}/{}", self.matching.len(), self.total)
    }
}

/// A domain name and its candidate addresses
///
/// Addresses keep insertion order until [`DomainRecord::rank`] is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    pub name: String,
    pub addresses: Vec<AddressRecord>,
}

impl DomainRecord {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
        }
    }

    pub fn with_addresses<S: Into<String>>(name: S, addresses: Vec<AddressRecord>) -> Self {
        Self {
            name: name.into(),
            addresses,
        }
    }

    pub fn push(&mut self, record: AddressRecord) {
        self.addresses.push(record);
    }

    /// Probe every address with the given strategy, blocking until all finish
    pub async fn probe_all(&mut self, strategy: &dyn ProbeStrategy) -> Result<()> {
        strategy.probe_domain(self).await
    }

    /// Sort addresses best-first. Stable, so equal scores keep their order.
    pub fn rank(&mut self) {
        self.addresses.sort_by(|a, b| a.rank_cmp(b));
    }

    /// Score of the first address, meaningful after [`DomainRecord::rank`]
    pub fn best_score(&self) -> f64 {
        self.addresses.first().map(AddressRecord::score).unwrap_or(BAD_SCORE)
    }

    fn best_is_reachable(&self) -> bool {
        self.addresses.first().map(AddressRecord::is_reachable).unwrap_or(false)
    }

    /// Ordering between domains by their best address
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_order(
            self.best_is_reachable(),
            self.best_score(),
            other.best_is_reachable(),
            other.best_score(),
        )
    }

    pub fn summarize(&self, filter: ReachFilter) -> FilterSummary<'_> {
        FilterSummary {
            matching: self.addresses.iter().filter(|r| filter.matches(r)).collect(),
            total: self.addresses.len(),
        }
    }
}

impl PartialEq for DomainRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scored(address: &str, latency_ms: f64, loss_pct: f64) -> AddressRecord {
        AddressRecord::with_measurement(address, Measurement::new(latency_ms, loss_pct))
    }

    #[test]
    fn test_zero_latency_scores_bad() {
        assert_eq!(weighted_delay(0.0, 0.0), BAD_SCORE);
        assert_eq!(weighted_delay(0.0, 100.0), BAD_SCORE);
        assert_eq!(Measurement::unreachable().score(), BAD_SCORE);
    }

    #[test]
    fn test_loss_penalty() {
        assert_eq!(weighted_delay(10.0, 0.0), 10.0);
        assert_eq!(weighted_delay(10.0, 10.0), 20.0);
        assert_eq!(weighted_delay(10.0, 100.0), 110.0);
    }

    #[test]
    fn test_equality_ignores_measurement() {
        assert_eq!(scored("1.1.1.1", 5.0, 0.0), scored("1.1.1.1", 90.0, 50.0));
        assert_ne!(scored("1.1.1.1", 5.0, 0.0), scored("8.8.8.8", 5.0, 0.0));
    }

    #[test]
    fn test_rank_orders_by_score() {
        // 5.0, BAD_SCORE, 2.0
        let mut domain = DomainRecord::with_addresses("d", vec![
            scored("a", 5.0, 0.0),
            scored("b", 0.0, 100.0),
            scored("c", 2.0, 0.0),
        ]);
        domain.rank();

        let scores: Vec<f64> = domain.addresses.iter().map(AddressRecord::score).collect();
        assert_eq!(scores, vec![2.0, 5.0, BAD_SCORE]);
        assert_eq!(domain.best_score(), 2.0);
    }

    #[test]
    fn test_unreachable_ranks_behind_slow_lossy_address() {
        // (1 + 100/10) * 2000 = 22000, numerically above BAD_SCORE
        let mut domain = DomainRecord::with_addresses("d", vec![
            scored("dead", 0.0, 100.0),
            scored("slow", 2000.0, 100.0),
        ]);
        domain.rank();
        assert_eq!(domain.addresses[0].address, "slow");
        assert_eq!(domain.addresses[1].address, "dead");
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let mut domain = DomainRecord::with_addresses("d", vec![
            AddressRecord::new("x"),
            AddressRecord::new("y"),
            AddressRecord::new("z"),
        ]);
        domain.rank();
        let order: Vec<&str> = domain.addresses.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_domain() {
        let mut domain = DomainRecord::new("empty");
        domain.rank();
        assert_eq!(domain.best_score(), BAD_SCORE);
        assert_eq!(domain.summarize(ReachFilter::All).ratio(), "0/0");
    }

    #[test]
    fn test_summarize_filters() {
        let domain = DomainRecord::with_addresses("d", vec![
            scored("up", 12.0, 0.0),
            scored("down", 0.0, 100.0),
            scored("flaky", 40.0, 35.0),
        ]);

        let reachable = domain.summarize(ReachFilter::Reachable);
        assert_eq!(reachable.ratio(), "2/3");
        assert_eq!(reachable.matching[0].address, "up");
        assert_eq!(reachable.matching[1].address, "flaky");

        let unreachable = domain.summarize(ReachFilter::Unreachable);
        assert_eq!(unreachable.count(), 1);
        assert_eq!(unreachable.matching[0].address, "down");

        assert_eq!(domain.summarize(ReachFilter::All).count(), 3);
    }

    proptest! {
        #[test]
        fn prop_score_increases_with_loss(latency in 0.001f64..5000.0, p1 in 0.0f64..100.0, p2 in 0.0f64..100.0) {
            prop_assume!(p1 < p2);
            prop_assert!(weighted_delay(latency, p1) < weighted_delay(latency, p2));
        }

        #[test]
        fn prop_score_increases_with_latency(l1 in 0.001f64..5000.0, l2 in 0.001f64..5000.0, loss in 0.0f64..=100.0) {
            prop_assume!(l1 < l2);
            prop_assert!(weighted_delay(l1, loss) < weighted_delay(l2, loss));
        }

        #[test]
        fn prop_score_never_negative(latency in 0.0f64..5000.0, loss in 0.0f64..=100.0) {
            prop_assert!(weighted_delay(latency, loss) >= 0.0);
        }

        #[test]
        fn prop_reachable_always_ranks_first(latency in 0.001f64..100000.0, loss in 0.0f64..=100.0) {
            let up = scored("up", latency, loss);
            let down = scored("down", 0.0, 100.0);
            prop_assert_eq!(up.rank_cmp(&down), Ordering::Less);
        }
    }
}
