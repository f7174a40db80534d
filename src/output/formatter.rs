//! Core formatting trait and the plain text implementation
//!
//! Report layout:
//!
//! ```text
//! ==> PASSED:
//! dn: example.net                                          (oo:     1/2)
//!     1.1.1.1              (rtt ms, lost, wt:   10.00,   0.0%,    10.00)
//!
//! ```

use crate::{
    catalog::CatalogSummary,
    error::Result,
    models::AddressRecord,
    types::ReachFilter,
};
use std::fmt::Write as _;

/// Renders the pieces of a catalog report
pub trait ReportFormatter: Send + Sync {
    /// Section title such as `==> PASSED:`
    fn format_section_header(&self, title: &str) -> Result<String>;

    /// Domain line with the match ratio for `filter`
    fn format_domain_header(&self, name: &str, filter: ReachFilter, matched: usize, total: usize) -> Result<String>;

    /// Indented line for one address
    fn format_address_line(&self, record: &AddressRecord) -> Result<String>;

    /// Totals shown after the report in verbose mode
    fn format_summary(&self, summary: &CatalogSummary) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Width the domain name is padded to
    pub domain_width: usize,
    /// Width the address is padded to
    pub address_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            domain_width: 52,
            address_width: 20,
        }
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl ReportFormatter for PlainFormatter {
    fn format_section_header(&self, title: &str) -> Result<String> {
        Ok(format!("\n==> {}:", title))
    }

    fn format_domain_header(&self, name: &str, filter: ReachFilter, matched: usize, total: usize) -> Result<String> {
        Ok(format!(
            "dn: {:<width$} ({}: {:>7})",
            name,
            filter.signature(),
            format!("{}/{}", matched, total),
            width = self.options.domain_width
        ))
    }

    fn format_address_line(&self, record: &AddressRecord) -> Result<String> {
        Ok(format!(
            "    {:<width$} (rtt ms, lost, wt: {:>7.2}, {:>5.1}%, {:>8.2})",
            record.address,
            record.latency_ms,
            record.loss_pct,
            record.score(),
            width = self.options.address_width
        ))
    }

    fn format_summary(&self, summary: &CatalogSummary) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Summary:")?;
        writeln!(output, "  Domains: {}", summary.domains)?;
        writeln!(output, "  Addresses: {} ({} reachable, {} unreachable)",
            summary.addresses, summary.reachable, summary.unreachable)?;
        match (&summary.best_domain, summary.best_score) {
            (Some(name), Some(score)) => writeln!(output, "  Best domain: {} (wt {:.2})", name, score)?,
            _ => writeln!(output, "  Best domain: none reachable")?,
        }
        Ok(output.trim_end().to_string())
    }
}
