//! Single-endpoint handlers: reboot and attribute updates.

use muxlink_core::{Command as CoreCommand, DeviceAttribute};

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts, RebootArgs, Toggle};
use crate::error::CliError;

use super::util;

pub async fn reboot(args: RebootArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::connect(global, false).await?;
    let mac = util::resolve_device(&conn.session, &args.device)?;

    super::execute(&conn, CoreCommand::Reboot { mac }, global).await
}

pub async fn handle(args: DeviceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (device, attribute) = match args.command {
        DeviceCommand::SetName { device, name } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "custom name cannot be empty".into(),
                });
            }
            (device, DeviceAttribute::CustomName(name))
        }
        DeviceCommand::AutoCompression { device, state } => {
            (device, DeviceAttribute::AutoCompression(matches!(state, Toggle::On)))
        }
        DeviceCommand::SixtyFps { device, state } => {
            (device, DeviceAttribute::SixtyFps(matches!(state, Toggle::On)))
        }
    };

    let conn = super::connect(global, false).await?;
    let mac = util::resolve_device(&conn.session, &device)?;

    super::execute(&conn, CoreCommand::SetAttribute { mac, attribute }, global).await
}
