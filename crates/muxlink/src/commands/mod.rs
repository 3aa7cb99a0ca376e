//! Command dispatch: bridges CLI args -> core commands -> output formatting.

pub mod config_cmd;
pub mod device;
pub mod devices;
pub mod preset;
pub mod routing;
pub mod util;
pub mod watch;

use serde::Serialize;

use muxlink_core::{Command as CoreCommand, CoreError, Session};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// An appliance session opened for one invocation.
pub struct Connection {
    pub session: Session,
    pub host: String,
}

/// Open a one-shot session and run the initial device refresh.
///
/// With `strict` unset, a `FAILED` or unrecognized refresh only warns:
/// commands can still be sent with raw MACs.
pub async fn connect(global: &GlobalOpts, strict: bool) -> Result<Connection, CliError> {
    let mut session_config = config::session_config(global)?;
    session_config.polling = false;
    let host = session_config.host.clone();

    let session =
        Session::with_http(session_config).map_err(|e| CliError::from_core(e, &host))?;

    match session.start().await {
        Ok(summary) => {
            tracing::debug!(devices = summary.total(), "initial refresh complete");
        }
        Err(e @ (CoreError::Rejected { .. } | CoreError::UnrecognizedReply { .. })) if !strict => {
            tracing::warn!(error = %e, "device refresh did not succeed, names cannot be resolved");
        }
        Err(e) => return Err(CliError::from_core(e, &host)),
    }

    Ok(Connection { session, host })
}

/// Dispatch an appliance-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Connect(args) => routing::connect(args, global).await,
        Command::Disconnect(args) => routing::disconnect(args, global).await,
        Command::Reboot(args) => device::reboot(args, global).await,
        Command::Device(args) => device::handle(args, global).await,
        Command::Preset(args) => preset::handle(args, global).await,
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

// ── Shared command execution ─────────────────────────────────────────

#[derive(Serialize)]
struct CommandReport {
    command: String,
    target: String,
    outcome: String,
}

/// Send one command, turn its outcome into a result and report it.
pub async fn execute(
    conn: &Connection,
    command: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let command_name = command.description();
    let target = command.target();

    let outcome = conn.session.execute(command).await;
    let summary = outcome.to_string();
    CliError::check_outcome(outcome, &conn.host)?;

    let report = CommandReport {
        command: command_name,
        target,
        outcome: summary,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| format!("{} successful: {}", r.command, r.target),
        |r| r.target.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
