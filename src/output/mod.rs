//! Output formatting and display system
//!
//! Reports come out as a `PASSED` section (reachable addresses) followed by
//! a `BLOCKED` section (unreachable addresses), in catalog order.

mod formatter;
mod colored;
pub mod progress;

pub use formatter::{FormattingOptions, PlainFormatter, ReportFormatter};
pub use colored::{ColoredFormatter, ScoreLevel};
pub use progress::ProgressReporter;

use crate::{
    catalog::Catalog,
    error::Result,
    models::DomainRecord,
    types::ReachFilter,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn ReportFormatter> {
        let options = FormattingOptions {
            enable_color,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts and tests
    pub fn create_plain_formatter() -> Box<dyn ReportFormatter> {
        Self::create_formatter(false)
    }
}

/// Main output coordinator that renders catalog reports
pub struct OutputCoordinator {
    formatter: Box<dyn ReportFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn ReportFormatter>) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &dyn ReportFormatter {
        self.formatter.as_ref()
    }

    /// `==> PASSED:` with reachable addresses, then `==> BLOCKED:` with the rest
    pub fn display_ranking(&self, catalog: &Catalog) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_section_header("PASSED")?);
        output.push('\n');
        output.push_str(&render_report(catalog, ReachFilter::Reachable, self.formatter.as_ref())?);

        output.push_str(&self.formatter.format_section_header("BLOCKED")?);
        output.push('\n');
        output.push_str(&render_report(catalog, ReachFilter::Unreachable, self.formatter.as_ref())?);

        Ok(output)
    }

    /// Totals block printed after the report in verbose mode
    pub fn display_summary(&self, catalog: &Catalog) -> Result<String> {
        self.formatter.format_summary(&catalog.summary())
    }
}

/// One filtered view of the catalog
///
/// Every domain gets its header line; matching addresses follow, and a
/// blank line closes the domain only when something matched.
pub fn render_report(catalog: &Catalog, filter: ReachFilter, formatter: &dyn ReportFormatter) -> Result<String> {
    let mut output = String::new();
    for domain in catalog.domains() {
        render_domain(&mut output, domain, filter, formatter)?;
    }
    Ok(output)
}

fn render_domain(
    output: &mut String,
    domain: &DomainRecord,
    filter: ReachFilter,
    formatter: &dyn ReportFormatter,
) -> Result<()> {
    let summary = domain.summarize(filter);

    output.push_str(&formatter.format_domain_header(&domain.name, filter, summary.count(), summary.total)?);
    output.push('\n');

    for record in &summary.matching {
        output.push_str(&formatter.format_address_line(record)?);
        output.push('\n');
    }

    if summary.count() > 0 {
        output.push('\n');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressRecord, Measurement};

    fn sample_catalog() -> Catalog {
        let mut d1 = DomainRecord::new("d1");
        d1.push(AddressRecord::with_measurement("1.1.1.1", Measurement::new(10.0, 0.0)));
        d1.push(AddressRecord::with_measurement("2.2.2.2", Measurement::unreachable()));
        let mut d2 = DomainRecord::new("d2");
        d2.push(AddressRecord::with_measurement("3.3.3.3", Measurement::unreachable()));
        Catalog::from_domains(vec![d1, d2])
    }

    #[test]
    fn test_report_blank_line_only_after_matches() {
        let formatter = OutputFormatterFactory::create_plain_formatter();
        let text = render_report(&sample_catalog(), ReachFilter::Reachable, formatter.as_ref()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("dn: d1"));
        assert!(lines[0].ends_with("(oo:     1/2)"));
        assert!(lines[1].starts_with("    1.1.1.1"));
        assert_eq!(lines[2], "");
        assert!(lines[3].ends_with("(oo:     0/1)"));
    }

    #[test]
    fn test_ranking_sections() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter());
        let text = coordinator.display_ranking(&sample_catalog()).unwrap();

        let passed = text.find("==> PASSED:").unwrap();
        let blocked = text.find("==> BLOCKED:").unwrap();
        assert!(passed < blocked);
        assert!(text[blocked..].contains("(xx:     1/2)"));
        assert!(text[blocked..].contains("    3.3.3.3"));
        assert!(!text[..blocked].contains("2.2.2.2"));
    }

    #[test]
    fn test_color_flag_selects_formatter() {
        let plain = OutputFormatterFactory::create_formatter(false);
        let text = render_report(&sample_catalog(), ReachFilter::All, plain.as_ref()).unwrap();
        assert!(!text.contains('\u{1b}'));

        ::colored::control::set_override(true);
        let styled = OutputFormatterFactory::create_formatter(true);
        let text = render_report(&sample_catalog(), ReachFilter::All, styled.as_ref()).unwrap();
        ::colored::control::unset_override();
        assert!(text.contains('\u{1b}'));
    }
}
