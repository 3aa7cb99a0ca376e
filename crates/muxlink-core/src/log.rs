// ── Operation log ──
//
// One entry per completed operation, fanned out to subscribers and
// mirrored to `tracing` at the same level.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

pub(crate) const LOG_CHANNEL_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Sending half of the session log.
#[derive(Debug, Clone)]
pub(crate) struct OperationLog {
    tx: broadcast::Sender<LogEntry>,
}

impl OperationLog {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(LOG_CHANNEL_SIZE);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!(target: "muxlink::session", "{message}"),
            LogLevel::Warn => warn!(target: "muxlink::session", "{message}"),
            LogLevel::Error => error!(target: "muxlink::session", "{message}"),
        }
        // No subscribers is fine; tracing already has the line.
        let _ = self.tx.send(LogEntry {
            level,
            message,
            at: Utc::now(),
        });
    }

    pub(crate) fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message);
    }

    pub(crate) fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message);
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message);
    }
}
