//! Long-running poll mode: prints every operation log entry and status
//! change until interrupted.

use std::time::Duration;

use chrono::Local;
use owo_colors::OwoColorize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::time::MissedTickBehavior;

use muxlink_core::{CoreError, LogEntry, LogLevel, Session, SessionStatus};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

fn format_entry(entry: &LogEntry, color: bool) -> String {
    let at = entry.at.with_timezone(&Local).format("%H:%M:%S");
    let level = match entry.level {
        LogLevel::Info => "INFO ",
        LogLevel::Warn => "WARN ",
        LogLevel::Error => "ERROR",
    };
    if !color {
        return format!("{at} {level} {}", entry.message);
    }
    let level = match entry.level {
        LogLevel::Info => level.green().to_string(),
        LogLevel::Warn => level.yellow().to_string(),
        LogLevel::Error => level.red().bold().to_string(),
    };
    format!("{} {level} {}", at.dimmed(), entry.message)
}

/// Entries already buffered on the log stream, formatted for printing.
fn pending_lines(logs: &mut broadcast::Receiver<LogEntry>, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match logs.try_recv() {
            Ok(entry) => lines.push(format_entry(&entry, color)),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    lines
}

fn format_status(status: SessionStatus, color: bool) -> String {
    let text = format!("status: {status}");
    match (color, status) {
        (false, _) | (true, SessionStatus::Unknown) => text,
        (true, SessionStatus::Ok) => text.green().to_string(),
        (true, SessionStatus::Error) => text.red().to_string(),
    }
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut session_config = config::session_config(global)?;
    session_config.polling = true;
    if let Some(secs) = args.interval {
        session_config.poll_interval = Duration::from_secs(secs);
    }
    if session_config.poll_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "poll interval must be at least one second".into(),
        });
    }
    let host = session_config.host.clone();
    let interval = session_config.poll_interval;

    let session = Session::with_http(session_config).map_err(|e| CliError::from_core(e, &host))?;
    let color = output::should_color(&global.color);

    // Subscribe first so the initial refresh is reported too.
    let mut logs = session.subscribe_logs();
    let mut status = session.subscribe_status();

    match session.start().await {
        Ok(summary) => {
            output::print_output(
                &format!(
                    "{} endpoints on {host}, polling every {}s (Ctrl-C to stop)",
                    summary.total(),
                    interval.as_secs()
                ),
                global.quiet,
            );
        }
        Err(e) if e.is_transport() || matches!(e, CoreError::NotConfigured { .. }) => {
            return Err(CliError::from_core(e, &host));
        }
        Err(e) => tracing::warn!(error = %e, "initial refresh did not succeed, still polling"),
    }

    // A transport failure cancels the poll task; notice it and exit.
    let mut health = tokio::time::interval(Duration::from_secs(1));
    health.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            entry = logs.recv() => match entry {
                Ok(entry) => output::print_output(&format_entry(&entry, color), global.quiet),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "log stream lagged");
                }
                Err(RecvError::Closed) => break Ok(()),
            },
            _ = health.tick() => {
                if !session.is_polling().await {
                    // The failure is logged before polling halts.
                    for line in pending_lines(&mut logs, color) {
                        output::print_output(&line, global.quiet);
                    }
                    break Err(CliError::ConnectionFailed {
                        host: host.clone(),
                        reason: "polling stopped after a transport failure".into(),
                    });
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = *status.borrow_and_update();
                output::print_output(&format_status(current, color), global.quiet);
            }
        }
    };

    session.shutdown().await;
    result
}
