//! Data models and structures for dping

pub mod config;
pub mod record;

// Re-export main model types
pub use config::Config;
pub use record::{
    weighted_delay, AddressRecord, DomainRecord, FilterSummary, Measurement, BAD_SCORE,
};
