//! Colored formatter implementation with terminal color support
//!
//! Layout matches [`PlainFormatter`](super::PlainFormatter) column for
//! column; fields are padded first and colored afterwards so escape codes
//! never disturb alignment.

use crate::{
    catalog::CatalogSummary,
    error::Result,
    models::AddressRecord,
    types::ReachFilter,
};
use super::formatter::{FormattingOptions, ReportFormatter};
use std::fmt::Write as _;
use colored::*;

/// Score classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLevel {
    Excellent,   // < 50
    Good,        // 50-150
    Fair,        // 150-400
    Poor,        // >= 400
    Unreachable,
}

impl ScoreLevel {
    /// Classify an address by reachability and weighted delay
    pub fn from_record(record: &AddressRecord) -> Self {
        if !record.is_reachable() {
            return Self::Unreachable;
        }
        Self::from_score(record.score())
    }

    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            Self::Excellent
        } else if score < 150.0 {
            Self::Good
        } else if score < 400.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Get color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::Unreachable => Color::Red,
        }
    }
}

/// Colors for the fixed parts of the report
#[derive(Debug, Clone)]
struct ColorScheme {
    pub header: Color,
    pub domain: Color,
    pub ratio: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            domain: Color::White,
            ratio: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold header color, or plain text when colors are off
    fn heading(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(self.color_scheme.header)
        } else {
            text.normal()
        }
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_section_header(&self, title: &str) -> Result<String> {
        let header = format!("==> {}:", title);
        Ok(format!("\n{}", self.heading(&header)))
    }

    fn format_domain_header(&self, name: &str, filter: ReachFilter, matched: usize, total: usize) -> Result<String> {
        let name = format!("{:<width$}", name, width = self.options.domain_width);
        let ratio = format!("{:>7}", format!("{}/{}", matched, total));
        Ok(format!(
            "dn: {} ({}: {})",
            self.colorize(&name, self.color_scheme.domain),
            filter.signature(),
            self.colorize(&ratio, self.color_scheme.ratio)
        ))
    }

    fn format_address_line(&self, record: &AddressRecord) -> Result<String> {
        let level = ScoreLevel::from_record(record);
        let address = format!("{:<width$}", record.address, width = self.options.address_width);
        let figures = format!(
            "{:>7.2}, {:>5.1}%, {:>8.2}",
            record.latency_ms,
            record.loss_pct,
            record.score()
        );
        Ok(format!(
            "    {} {}{}{}",
            self.colorize(&address, level.color()),
            self.colorize("(rtt ms, lost, wt: ", self.color_scheme.muted),
            self.colorize(&figures, level.color()),
            self.colorize(")", self.color_scheme.muted)
        ))
    }

    fn format_summary(&self, summary: &CatalogSummary) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "{}", self.heading("Summary:"))?;
        writeln!(output, "  Domains: {}", summary.domains)?;
        writeln!(
            output,
            "  Addresses: {} ({} reachable, {} unreachable)",
            summary.addresses,
            self.colorize(&summary.reachable.to_string(), Color::Green),
            self.colorize(&summary.unreachable.to_string(), Color::Red)
        )?;
        match (&summary.best_domain, summary.best_score) {
            (Some(name), Some(score)) => {
                let level = ScoreLevel::from_score(score);
                writeln!(
                    output,
                    "  Best domain: {} (wt {})",
                    self.bold(name),
                    self.colorize(&format!("{:.2}", score), level.color())
                )?
            }
            _ => writeln!(output, "  Best domain: {}", self.colorize("none reachable", Color::Red))?,
        }
        Ok(output.trim_end().to_string())
    }
}
