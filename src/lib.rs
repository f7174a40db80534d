//! dping
//!
//! Measures round-trip latency and packet loss for every candidate address of
//! a set of domains, ranks addresses and domains by a loss-weighted delay
//! score, and keeps the results in a snapshot that can be reported again
//! without re-probing.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod types;

// Re-export commonly used types
pub use app::App;
pub use catalog::{Catalog, CatalogSummary};
pub use error::{AppError, Result};
pub use executor::{ProbeStrategy, SequentialExecutor, PooledExecutor};
pub use models::{AddressRecord, Config, DomainRecord, Measurement, BAD_SCORE};
pub use probe::{Prober, SystemPinger, FixedProber};
pub use types::{Operation, ParsePolicy, ReachFilter};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_SOURCE_PATH: &str = "dns.json";
    pub const DEFAULT_SNAPSHOT_PATH: &str = "dns_info.json";
    pub const DEFAULT_PING_PROGRAM: &str = "ping";
    pub const DEFAULT_PING_COUNT: u32 = 20;
    pub const DEFAULT_PING_WAIT: Duration = Duration::from_secs(2);
    pub const DEFAULT_PROGRESS_LEVEL: u8 = 2;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Pool size per logical core when concurrency is left at 0
    pub const CONCURRENCY_PER_CORE: usize = 8;

    pub const MAX_PING_COUNT: u32 = 1000;
    pub const MAX_PING_WAIT_SECS: u64 = 60;
    pub const MAX_CONCURRENCY: usize = 4096;

    /// Added to count × wait before a silent probe process is killed
    pub const PROBE_DEADLINE_SLACK: Duration = Duration::from_secs(5);
}
