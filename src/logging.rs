//! Structured logging
//!
//! Every record carries a level, the component that wrote it, the session
//! and operation it belongs to, and typed fields. Debug runs write records as
//! JSON lines with their source location; other runs write one console line
//! per record. Warnings and errors go to stderr so the report on stdout stays
//! clean.

use crate::error::AppError;
use crate::models::{AddressRecord, Config};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowest level written for a run with `config`
    pub fn threshold(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One human-readable line per record
    Console,
    /// One JSON object per line
    Json,
}

/// A single log record as written
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Id of the list/ping/show operation in progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
    /// `file:line` of the call site, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Default)]
struct Scope {
    session: Option<String>,
    operation: Option<String>,
}

/// Named logger; clones share their session and operation scope
#[derive(Debug, Clone)]
pub struct Logger {
    component: String,
    threshold: LogLevel,
    format: LogFormat,
    use_color: bool,
    scope: Arc<RwLock<Scope>>,
}

impl Logger {
    pub fn new(component: &str, config: &Config) -> Self {
        Self {
            component: component.to_string(),
            threshold: LogLevel::threshold(config),
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            use_color: config.enable_color,
            scope: Arc::new(RwLock::new(Scope::default())),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    pub async fn set_session(&self, session: &str) {
        self.scope.write().await.session = Some(session.to_string());
    }

    /// Open an operation scope; records written until it is finished carry its id
    pub async fn begin_operation(&self, name: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.scope.write().await.operation = Some(id.clone());

        self.info(format!("Started {}", name))
            .field("operation", name)
            .emit()
            .await;
        id
    }

    pub async fn finish_operation(&self, id: &str, name: &str, success: bool) {
        self.info(format!("Finished {}", name))
            .field("operation", name)
            .field("success", success)
            .emit()
            .await;

        let mut scope = self.scope.write().await;
        if scope.operation.as_deref() == Some(id) {
            scope.operation = None;
        }
    }

    pub fn debug<S: Into<String>>(&self, message: S) -> RecordBuilder<'_> {
        self.record(LogLevel::Debug, message.into())
    }

    pub fn info<S: Into<String>>(&self, message: S) -> RecordBuilder<'_> {
        self.record(LogLevel::Info, message.into())
    }

    pub fn warn<S: Into<String>>(&self, message: S) -> RecordBuilder<'_> {
        self.record(LogLevel::Warn, message.into())
    }

    pub fn error<S: Into<String>>(&self, message: S) -> RecordBuilder<'_> {
        self.record(LogLevel::Error, message.into())
    }

    fn record(&self, level: LogLevel, message: String) -> RecordBuilder<'_> {
        RecordBuilder {
            logger: self,
            record: LogRecord {
                timestamp: Utc::now(),
                level,
                component: self.component.clone(),
                message,
                session: None,
                operation: None,
                fields: BTreeMap::new(),
                source: None,
            },
        }
    }

    async fn write(&self, mut record: LogRecord) {
        if !self.enabled(record.level) {
            return;
        }

        {
            let scope = self.scope.read().await;
            record.session = scope.session.clone();
            record.operation = scope.operation.clone();
        }

        let line = self.render(&record);
        if record.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    fn render(&self, record: &LogRecord) -> String {
        match self.format {
            LogFormat::Console => self.render_console(record),
            LogFormat::Json => serde_json::to_string(record)
                .unwrap_or_else(|e| format!("{{\"message\":{:?},\"render_error\":{:?}}}", record.message, e.to_string())),
        }
    }

    fn render_console(&self, record: &LogRecord) -> String {
        let label = format!("{:>5}", record.level.label());
        let label = if self.use_color {
            label.as_str().color(record.level.color()).to_string()
        } else {
            label
        };

        let mut line = format!(
            "{} {} [{}] {}",
            record.timestamp.format("%H:%M:%S%.3f"),
            label,
            record.component,
            record.message
        );
        if let Some(operation) = &record.operation {
            line.push_str(&format!(" op={}", &operation[..operation.len().min(8)]));
        }
        for (key, value) in &record.fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        if let Some(source) = &record.source {
            line.push_str(&format!(" @ {}", source));
        }
        line
    }
}

/// A record under construction; nothing is written until [`RecordBuilder::emit`]
#[must_use = "records are only written by `emit`"]
pub struct RecordBuilder<'a> {
    logger: &'a Logger,
    record: LogRecord,
}

impl RecordBuilder<'_> {
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.record.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Attach an address record's measurement and score
    pub fn measurement(self, record: &AddressRecord) -> Self {
        self.field("address", &record.address)
            .field("latency_ms", record.latency_ms)
            .field("loss_pct", record.loss_pct)
            .field("score", record.score())
            .field("reachable", record.is_reachable())
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("exit_code", error.exit_code())
            .field("error", error.to_string())
    }

    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.record.source = Some(format!("{}:{}", file, line));
        self
    }

    pub async fn emit(self) {
        self.logger.write(self.record).await;
    }
}

/// Logger for probe outcomes
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::new("PROBE", config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Record the measurement taken for one address
    pub async fn log_probe(&self, record: &AddressRecord, elapsed: Duration) {
        self.logger
            .debug(format!("Probed {}", record.address))
            .measurement(record)
            .field("elapsed_ms", elapsed.as_secs_f64() * 1000.0)
            .emit()
            .await;
    }

    /// Record a probe failure that was turned into an unreachable result
    pub async fn log_degraded(&self, address: &str, error: &AppError) {
        self.logger
            .warn(format!("Probe of {} degraded to unreachable", address))
            .field("address", address)
            .error_info(error)
            .emit()
            .await;
    }

    /// Record a probe failure that aborts the run
    pub async fn log_fatal_probe(&self, address: &str, error: &AppError) {
        self.logger
            .error(format!("Probe of {} failed", address))
            .field("address", address)
            .error_info(error)
            .emit()
            .await;
    }

    /// Summarise one domain after all its probes finished
    pub async fn log_domain_batch(&self, domain: &str, reachable: usize, total: usize, elapsed: Duration) {
        self.logger
            .info(format!("Domain {}: {}/{} reachable", domain, reachable, total))
            .field("domain", domain)
            .field("reachable", reachable)
            .field("total", total)
            .field("elapsed_ms", elapsed.as_secs_f64() * 1000.0)
            .emit()
            .await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: Uuid::new_v4().to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session
    }

    pub async fn create_logger(&self, component: &str) -> Logger {
        let logger = Logger::new(component, &self.config);
        logger.set_session(&self.session).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }
}

/// Write a formatted record tagged with its call site
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format!($($arg)*)).at(file!(), line!()).emit().await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format!($($arg)*)).at(file!(), line!()).emit().await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format!($($arg)*)).at(file!(), line!()).emit().await
    };
}
