//! Probe execution strategies
//!
//! A [`ProbeStrategy`] measures every address of one domain and writes the
//! results back in place:
//! - [`SequentialExecutor`] probes one address at a time, in order
//! - [`PooledExecutor`] keeps up to `concurrency` probes in flight and
//!   slots each result back at its input position
//!
//! Both share a [`ProbeContext`], which owns the prober, the parse policy,
//! progress output and the run counters.

pub mod pooled;

pub use pooled::{PooledExecutor, SystemResources};

use crate::{
    error::{AppError, Result},
    logging::ProbeLogger,
    models::{AddressRecord, DomainRecord, Measurement},
    output::ProgressReporter,
    probe::Prober,
    types::ParsePolicy,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Counters for one run, shared by every probe task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStatistics {
    /// Probes that produced a measurement
    pub probes: u64,
    pub reachable: u64,
    pub unreachable: u64,
    /// Probes whose failure was turned into an unreachable measurement
    pub degraded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    probes: AtomicU64,
    reachable: AtomicU64,
    unreachable: AtomicU64,
    degraded: AtomicU64,
}

impl Counters {
    fn record(&self, measurement: &Measurement) {
        self.probes.fetch_add(1, Ordering::Relaxed);
        if measurement.latency_ms != 0.0 {
            self.reachable.fetch_add(1, Ordering::Relaxed);
        } else {
            self.unreachable.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> ExecutorStatistics {
        ExecutorStatistics {
            probes: self.probes.load(Ordering::Relaxed),
            reachable: self.reachable.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}

/// Everything a single probe needs, cheap to clone into pool tasks
#[derive(Clone)]
pub struct ProbeContext {
    prober: Arc<dyn Prober>,
    policy: ParsePolicy,
    progress: Arc<ProgressReporter>,
    logger: Arc<ProbeLogger>,
    counters: Arc<Counters>,
}

impl ProbeContext {
    pub fn new(
        prober: Arc<dyn Prober>,
        policy: ParsePolicy,
        progress: ProgressReporter,
        logger: ProbeLogger,
    ) -> Self {
        Self {
            prober,
            policy,
            progress: Arc::new(progress),
            logger: Arc::new(logger),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Context with progress output switched off and default logging
    pub fn quiet(prober: Arc<dyn Prober>, policy: ParsePolicy) -> Self {
        Self::new(
            prober,
            policy,
            ProgressReporter::silent(),
            ProbeLogger::new(&crate::models::Config::default()),
        )
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn logger(&self) -> &ProbeLogger {
        &self.logger
    }

    pub fn statistics(&self) -> ExecutorStatistics {
        self.counters.snapshot()
    }

    /// Probe one address, applying the parse policy to any failure
    pub async fn probe_one(&self, address: &str) -> Result<Measurement> {
        let started = Instant::now();
        let measurement = match self.prober.probe(address).await {
            Ok(measurement) => measurement,
            Err(error) => self.settle_failure(address, error).await?,
        };
        self.finish(address, measurement, started.elapsed()).await;
        Ok(measurement)
    }

    /// Degrade `error` to an unreachable measurement, or hand it back when
    /// the policy (or the kind of error) does not allow that
    pub async fn settle_failure(&self, address: &str, error: AppError) -> Result<Measurement> {
        if self.policy == ParsePolicy::Isolate && error.is_probe_local() {
            self.logger.log_degraded(address, &error).await;
            self.counters.degraded.fetch_add(1, Ordering::Relaxed);
            Ok(Measurement::unreachable())
        } else {
            self.logger.log_fatal_probe(address, &error).await;
            Err(error)
        }
    }

    /// Settle an address whose probe task never reported back, counting and
    /// reporting it like any finished probe
    pub async fn settle_lost(&self, address: &str, error: AppError) -> Result<Measurement> {
        let measurement = self.settle_failure(address, error).await?;
        self.finish(address, measurement, Duration::ZERO).await;
        Ok(measurement)
    }

    async fn finish(&self, address: &str, measurement: Measurement, elapsed: Duration) {
        let record = AddressRecord::with_measurement(address, measurement);
        self.progress.probe_finished(&self.prober.invocation(address), &record);
        self.logger.log_probe(&record, elapsed).await;
        self.counters.record(&measurement);
    }
}

/// Measures the addresses of one domain
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Upper bound on probes in flight
    fn concurrency(&self) -> usize;

    fn context(&self) -> &ProbeContext;

    /// Probe every record and store the result in it. Record order and
    /// identity are unchanged on return.
    async fn probe_addresses(&self, addresses: &mut [AddressRecord]) -> Result<()>;

    /// Probe a whole domain, with its progress header and batch log line
    async fn probe_domain(&self, domain: &mut DomainRecord) -> Result<()> {
        let context = self.context();
        context.progress().domain_started(&domain.name);

        let started = Instant::now();
        self.probe_addresses(&mut domain.addresses).await?;

        let reachable = domain.addresses.iter().filter(|r| r.is_reachable()).count();
        context
            .logger()
            .log_domain_batch(&domain.name, reachable, domain.addresses.len(), started.elapsed())
            .await;
        Ok(())
    }

    fn statistics(&self) -> ExecutorStatistics {
        self.context().statistics()
    }
}

/// One probe at a time, in input order
pub struct SequentialExecutor {
    context: ProbeContext,
}

impl SequentialExecutor {
    pub fn new(context: ProbeContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProbeStrategy for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn concurrency(&self) -> usize {
        1
    }

    fn context(&self) -> &ProbeContext {
        &self.context
    }

    async fn probe_addresses(&self, addresses: &mut [AddressRecord]) -> Result<()> {
        for record in addresses.iter_mut() {
            let measurement = self.context.probe_one(&record.address).await?;
            record.apply(measurement);
        }
        Ok(())
    }
}

/// Pick a strategy for the configured concurrency
///
/// 1 probes sequentially, anything larger uses a pool of that size, and 0
/// sizes the pool from the core count.
pub fn create_strategy(concurrency: usize, context: ProbeContext) -> Box<dyn ProbeStrategy> {
    match concurrency {
        1 => Box::new(SequentialExecutor::new(context)),
        0 => Box::new(PooledExecutor::new(
            SystemResources::detect().default_concurrency,
            context,
        )),
        n => Box::new(PooledExecutor::new(n, context)),
    }
}
