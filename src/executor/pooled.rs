//! Bounded worker pool for probing the addresses of one domain
//!
//! Every address gets its own task, but a semaphore sized to the configured
//! concurrency caps how many probe processes exist at once. Tasks finish in
//! any order; each carries its input index and address back so the result
//! lands in the record it was taken for.

use crate::{
    defaults::{CONCURRENCY_PER_CORE, MAX_CONCURRENCY},
    error::{AppError, Result},
    executor::{ProbeContext, ProbeStrategy},
    models::{AddressRecord, Measurement},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};

/// Host facts used to size the pool when no concurrency is configured
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Number of logical CPU cores
    pub cpu_cores: usize,
    /// Pool size used when concurrency is 0
    pub default_concurrency: usize,
}

impl SystemResources {
    pub fn detect() -> Self {
        let cpu_cores = num_cpus::get().max(1);
        let default_concurrency = (cpu_cores * CONCURRENCY_PER_CORE).min(MAX_CONCURRENCY);

        Self {
            cpu_cores,
            default_concurrency,
        }
    }
}

/// Probes with up to `concurrency` tasks in flight
pub struct PooledExecutor {
    concurrency: usize,
    context: ProbeContext,
}

impl PooledExecutor {
    pub fn new(concurrency: usize, context: ProbeContext) -> Self {
        Self {
            concurrency: concurrency.max(1),
            context,
        }
    }
}

#[async_trait]
impl ProbeStrategy for PooledExecutor {
    fn name(&self) -> &'static str {
        "pooled"
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn context(&self) -> &ProbeContext {
        &self.context
    }

    async fn probe_addresses(&self, addresses: &mut [AddressRecord]) -> Result<()> {
        if addresses.is_empty() {
            return Ok(());
        }

        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, record) in addresses.iter().enumerate() {
            let address = record.address.clone();
            let context = self.context.clone();
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::internal(format!("Probe pool closed: {}", e)))?;
                let measurement = context.probe_one(&address).await?;
                Ok::<_, AppError>((index, address, measurement))
            });
        }

        let mut slots: Vec<Option<Measurement>> = vec![None; addresses.len()];

        // Returning early drops the JoinSet, which aborts the remaining tasks
        // and with them their child processes.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, address, measurement))) => {
                    let slot = addresses.get(index).ok_or_else(|| {
                        AppError::internal(format!("Probe result index {} out of range", index))
                    })?;
                    if slot.address != address {
                        return Err(AppError::internal(format!(
                            "Probe result for {} does not match {} at position {}",
                            address, slot.address, index
                        )));
                    }
                    slots[index] = Some(measurement);
                }
                Ok(Err(error)) => return Err(error),
                Err(join_error) => {
                    // The slot stays empty and is settled below
                    crate::log_warn!(
                        self.context.logger().logger(),
                        "Probe task ended abnormally: {}",
                        join_error
                    );
                }
            }
        }

        for (record, slot) in addresses.iter_mut().zip(slots) {
            let measurement = match slot {
                Some(measurement) => measurement,
                None => {
                    let error = AppError::probe(format!("probe task for {} did not complete", record.address));
                    self.context.settle_lost(&record.address, error).await?
                }
            };
            record.apply(measurement);
        }

        Ok(())
    }
}
