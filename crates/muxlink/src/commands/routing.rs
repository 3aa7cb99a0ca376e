//! Connect and disconnect handlers.

use muxlink_core::Command as CoreCommand;

use crate::cli::{ConnectArgs, DisconnectArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn connect(args: ConnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::connect(global, false).await?;
    let tx = util::resolve_device(&conn.session, &args.tx)?;
    let rx = util::resolve_device(&conn.session, &args.rx)?;

    super::execute(&conn, CoreCommand::Connect { tx, rx }, global).await
}

pub async fn disconnect(args: DisconnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::connect(global, false).await?;
    let rx = util::resolve_device(&conn.session, &args.rx)?;

    super::execute(&conn, CoreCommand::Disconnect { rx }, global).await
}
