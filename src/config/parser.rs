//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::{config::split_options, Config},
    types::ParsePolicy,
};

/// Configuration parser that combines CLI arguments with environment variables
///
/// Layers, lowest to highest: defaults, `.env`, environment, command line.
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an explicit environment, skipping `.env`
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        let cli = &self.cli;

        if let Some(ref source) = cli.source {
            config.source_path = source.clone();
        }

        if let Some(ref snapshot) = cli.snapshot {
            config.snapshot_path = snapshot.clone();
        }

        if let Some(ref options) = cli.ping_options {
            config.ping_options = split_options(options)
                .map_err(|e| AppError::config(format!("Invalid --opt value '{}': {}", options, e)))?;
        }

        if let Some(concurrency) = cli.concurrency {
            config.concurrency = concurrency;
        }

        if let Some(count) = cli.count {
            config.ping_count = count;
        }

        if let Some(wait) = cli.wait {
            config.ping_wait_secs = wait;
        }

        if cli.strict {
            config.parse_policy = ParsePolicy::Strict;
        }

        if let Some(level) = cli.progress_level() {
            config.progress_level = level;
        }

        if let Some(enable_color) = cli.color_override() {
            config.enable_color = enable_color;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: source={}, snapshot={}, concurrency={}, parse_policy={}",
                config.source_path, config.snapshot_path, config.concurrency, config.parse_policy
            );
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Source catalog: {}", config.source_path));
    summary.push(format!("Snapshot: {}", config.snapshot_path));
    summary.push(format!(
        "Probe: {} -q -c {} -W {}{}",
        config.ping_program,
        config.ping_count,
        config.ping_wait_secs,
        if config.ping_options.is_empty() {
            String::new()
        } else {
            format!(" {}", config.ping_options.join(" "))
        }
    ));
    summary.push(format!(
        "Concurrency: {}",
        if config.concurrency == 0 {
            "auto".to_string()
        } else {
            config.concurrency.to_string()
        }
    ));
    summary.push(format!("Parse policy: {}", config.parse_policy));
    summary.push(format!("Progress level: {}", config.progress_level));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let cli = Cli::parse_from(args);
        ConfigParser::new(cli).parse_with_lookup(move |key: &str| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["dping", "list"], &[]).unwrap();

        assert_eq!(config.source_path, crate::defaults::DEFAULT_SOURCE_PATH);
        assert_eq!(config.snapshot_path, crate::defaults::DEFAULT_SNAPSHOT_PATH);
        assert_eq!(config.ping_count, crate::defaults::DEFAULT_PING_COUNT);
        assert_eq!(config.concurrency, 0);
        assert_eq!(config.parse_policy, ParsePolicy::Isolate);
        assert!(config.ping_options.is_empty());
    }

    #[test]
    fn test_cli_overrides() {
        let config = parse(
            &[
                "dping", "ping",
                "--dns", "a.json",
                "--out", "b.json",
                "--opt", "-I tun0",
                "-j", "4",
                "-c", "3",
                "-W", "1",
                "--strict",
                "-q",
                "--no-color",
                "--verbose",
            ],
            &[],
        )
        .unwrap();

        assert_eq!(config.source_path, "a.json");
        assert_eq!(config.snapshot_path, "b.json");
        assert_eq!(config.ping_options, vec!["-I", "tun0"]);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.ping_count, 3);
        assert_eq!(config.ping_wait_secs, 1);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.progress_level, 0);
        assert!(!config.enable_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_then_cli_priority() {
        let env = [
            ("DPING_PING_COUNT", "8"),
            ("DPING_CONCURRENCY", "2"),
            ("DPING_PING_OPTS", "-n"),
            ("DPING_PARSE_POLICY", "strict"),
        ];

        let config = parse(&["dping", "ping"], &env).unwrap();
        assert_eq!(config.ping_count, 8);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.ping_options, vec!["-n"]);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);

        let config = parse(&["dping", "ping", "-c", "12", "--opt", ""], &env).unwrap();
        assert_eq!(config.ping_count, 12);
        assert!(config.ping_options.is_empty());
    }

    #[test]
    fn test_quoted_cli_options() {
        let config = parse(&["dping", "ping", "--opt", "-I tun0 -p 'ab cd'"], &[]).unwrap();
        assert_eq!(config.ping_options, vec!["-I", "tun0", "-p", "ab cd"]);

        assert!(matches!(
            parse(&["dping", "ping", "--opt", "-p 'ab"], &[]),
            Err(crate::AppError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            parse(&["dping", "ping"], &[("DPING_PING_COUNT", "lots")]),
            Err(crate::AppError::Config(_))
        ));
        assert!(matches!(
            parse(&["dping", "ping", "-c", "0"], &[]),
            Err(crate::AppError::Config(_))
        ));
        assert!(matches!(
            parse(&["dping", "ping", "-j", "100000"], &[]),
            Err(crate::AppError::Config(_))
        ));
    }

    #[test]
    fn test_config_summary() {
        let config = Config {
            ping_options: vec!["-I".to_string(), "tun0".to_string()],
            ..Config::default()
        };
        let summary = display_config_summary(&config);

        assert!(summary.contains("Source catalog: dns.json"));
        assert!(summary.contains("Probe: ping -q -c 20 -W 2 -I tun0"));
        assert!(summary.contains("Concurrency: auto"));
        assert!(summary.contains("Parse policy: isolate"));
    }
}
