//! Address probing through an external ping program
//!
//! [`Prober`] is the seam between orchestration and the probe mechanism.
//! [`SystemPinger`] drives the real program; [`FixedProber`] answers from a
//! table and is used for dry runs, benches and tests.

pub mod parse;

pub use parse::parse_ping_output;

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::{Config, Measurement},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    process::Stdio,
    time::Duration,
};
use tokio::{process::Command, time::timeout};

/// Measures one address per call
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `address` once and return its latency/loss pair
    async fn probe(&self, address: &str) -> Result<Measurement>;

    /// Human-readable form of the invocation, for progress lines
    fn invocation(&self, address: &str) -> String;
}

/// Command line for one probe: `<program> -q -c <count> -W <wait> <extra...> <address>`
#[derive(Debug, Clone, PartialEq)]
pub struct PingCommand {
    pub program: String,
    pub count: u32,
    pub wait_secs: u64,
    pub extra_options: Vec<String>,
}

impl PingCommand {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.ping_program.clone(),
            count: config.ping_count,
            wait_secs: config.ping_wait_secs,
            extra_options: config.ping_options.clone(),
        }
    }

    /// Arguments in invocation order, address last
    pub fn args(&self, address: &str) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-c".to_string(),
            self.count.to_string(),
            "-W".to_string(),
            self.wait_secs.to_string(),
        ];
        args.extend(self.extra_options.iter().cloned());
        args.push(address.to_string());
        args
    }

    pub fn display(&self, address: &str) -> String {
        format!("{} {}", self.program, self.args(address).join(" "))
    }
}

/// Runs the system ping program as a child process
pub struct SystemPinger {
    command: PingCommand,
    deadline: Duration,
    logger: Logger,
}

impl SystemPinger {
    pub fn new(command: PingCommand, deadline: Duration) -> Self {
        Self {
            command,
            deadline,
            logger: Logger::new("PING", &Config::default()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            command: PingCommand::from_config(config),
            deadline: config.probe_deadline(),
            logger: Logger::new("PING", config),
        }
    }

    /// Report launch failures and timeouts through `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn command(&self) -> &PingCommand {
        &self.command
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Run the program and capture stdout; any failure to run yields no output
    async fn run(&self, address: &str) -> String {
        let child = Command::new(&self.command.program)
            .args(self.command.args(address))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                self.logger
                    .debug(format!("Failed to start '{}'", self.command.program))
                    .field("address", address)
                    .field("error", e.to_string())
                    .emit()
                    .await;
                return String::new();
            }
        };

        match timeout(self.deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => String::from_utf8_lossy(&output.stdout).into_owned(),
            Ok(Err(e)) => {
                self.logger
                    .debug(format!("Probe of {} failed", address))
                    .field("address", address)
                    .field("error", e.to_string())
                    .emit()
                    .await;
                String::new()
            }
            Err(_) => {
                self.logger
                    .debug(format!("Probe of {} exceeded its deadline, killed", address))
                    .field("address", address)
                    .field("deadline_ms", self.deadline.as_millis() as u64)
                    .emit()
                    .await;
                String::new()
            }
        }
    }
}

#[async_trait]
impl Prober for SystemPinger {
    async fn probe(&self, address: &str) -> Result<Measurement> {
        let output = self.run(address).await;
        parse_ping_output(&output)
    }

    fn invocation(&self, address: &str) -> String {
        self.command.display(address)
    }
}

/// Canned answer for one address
#[derive(Debug, Clone)]
pub enum FixedResponse {
    /// Return this measurement directly
    Measurement(Measurement),
    /// Feed this text through the ping output parser
    Output(String),
    /// Fail the probe with a probe error
    Failure(String),
}

/// Prober answering from a table, with optional per-address delays
///
/// Unknown addresses behave like a probe with no output.
#[derive(Debug, Clone, Default)]
pub struct FixedProber {
    responses: HashMap<String, FixedResponse>,
    delays: HashMap<String, Duration>,
}

impl FixedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_measurement<S: Into<String>>(mut self, address: S, latency_ms: f64, loss_pct: f64) -> Self {
        self.responses.insert(
            address.into(),
            FixedResponse::Measurement(Measurement::new(latency_ms, loss_pct)),
        );
        self
    }

    pub fn with_output<S: Into<String>, T: Into<String>>(mut self, address: S, output: T) -> Self {
        self.responses.insert(address.into(), FixedResponse::Output(output.into()));
        self
    }

    pub fn with_failure<S: Into<String>, T: Into<String>>(mut self, address: S, message: T) -> Self {
        self.responses.insert(address.into(), FixedResponse::Failure(message.into()));
        self
    }

    /// Hold the answer for `address` back by `delay`
    pub fn with_delay<S: Into<String>>(mut self, address: S, delay: Duration) -> Self {
        self.delays.insert(address.into(), delay);
        self
    }
}

#[async_trait]
impl Prober for FixedProber {
    async fn probe(&self, address: &str) -> Result<Measurement> {
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(address) {
            Some(FixedResponse::Measurement(m)) => Ok(*m),
            Some(FixedResponse::Output(text)) => parse_ping_output(text),
            Some(FixedResponse::Failure(message)) => Err(AppError::probe(message.clone())),
            None => Ok(Measurement::unreachable()),
        }
    }

    fn invocation(&self, address: &str) -> String {
        format!("fixed {}", address)
    }
}
