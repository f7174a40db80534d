//! Main application orchestration and execution

use crate::{
    catalog::Catalog,
    error::Result,
    executor::{create_strategy, ExecutorStatistics, ProbeContext, ProbeStrategy},
    logging::{Logger, LoggerFactory},
    models::Config,
    output::{OutputCoordinator, OutputFormatterFactory, ProgressReporter},
    probe::{Prober, SystemPinger},
    types::Operation,
};
use std::sync::Arc;

/// Runs one operation against a catalog and renders the result
pub struct App {
    config: Config,
    strategy: Box<dyn ProbeStrategy>,
    output: OutputCoordinator,
    logger: Logger,
}

impl App {
    /// Create an application that probes with the system ping program
    pub async fn new(config: Config) -> Result<Self> {
        let factory = LoggerFactory::new(config.clone());
        let prober = SystemPinger::from_config(&config).with_logger(factory.create_logger("PING").await);
        Self::assemble(config, factory, Arc::new(prober)).await
    }

    /// Create an application around any prober
    pub async fn with_prober(config: Config, prober: Arc<dyn Prober>) -> Result<Self> {
        let factory = LoggerFactory::new(config.clone());
        Self::assemble(config, factory, prober).await
    }

    async fn assemble(config: Config, factory: LoggerFactory, prober: Arc<dyn Prober>) -> Result<Self> {
        config.validate()?;

        let logger = factory.create_logger("APP").await;
        let probe_logger = factory.create_probe_logger().await;

        let context = ProbeContext::new(
            prober,
            config.parse_policy,
            ProgressReporter::new(config.progress_level),
            probe_logger,
        );
        let strategy = create_strategy(config.concurrency, context);
        let output = OutputCoordinator::new(OutputFormatterFactory::create_formatter(config.enable_color));

        logger
            .debug("Application initialized")
            .field("strategy", strategy.name())
            .field("concurrency", strategy.concurrency())
            .field("parse_policy", config.parse_policy.to_string())
            .emit()
            .await;

        Ok(Self {
            config,
            strategy,
            output,
            logger,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn strategy(&self) -> &dyn ProbeStrategy {
        self.strategy.as_ref()
    }

    pub fn statistics(&self) -> ExecutorStatistics {
        self.strategy.statistics()
    }

    /// Run one operation and hand back the ranked catalog
    ///
    /// - `list`: source catalog, ranked without probing
    /// - `ping`: source catalog, probed, ranked and saved as a snapshot
    /// - `show`: saved snapshot, ranked
    pub async fn run(&self, operation: Operation) -> Result<Catalog> {
        let operation_id = self.logger.begin_operation(operation.name()).await;
        let result = self.execute(operation).await;
        self.logger
            .finish_operation(&operation_id, operation.name(), result.is_ok())
            .await;
        result
    }

    async fn execute(&self, operation: Operation) -> Result<Catalog> {
        match operation {
            Operation::List => {
                let mut catalog = Catalog::load_source(&self.config.source_path)?;
                catalog.rank_all();
                Ok(catalog)
            }
            Operation::Ping => {
                let mut catalog = Catalog::load_source(&self.config.source_path)?;
                catalog.probe_all(self.strategy.as_ref()).await?;
                catalog.rank_all();
                catalog.save_snapshot(&self.config.snapshot_path)?;

                crate::log_info!(self.logger, "Snapshot written to {}", self.config.snapshot_path);
                Ok(catalog)
            }
            Operation::Show => {
                let mut catalog = Catalog::load_snapshot(&self.config.snapshot_path)?;
                crate::log_debug!(
                    self.logger,
                    "Loaded {} domains from {}",
                    catalog.len(),
                    self.config.snapshot_path
                );
                catalog.rank_all();
                Ok(catalog)
            }
        }
    }

    /// `PASSED` then `BLOCKED` sections for `catalog`
    pub fn render_report(&self, catalog: &Catalog) -> Result<String> {
        self.output.display_ranking(catalog)
    }

    pub fn render_summary(&self, catalog: &Catalog) -> Result<String> {
        self.output.display_summary(catalog)
    }
}
