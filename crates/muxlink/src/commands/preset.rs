//! Preset handlers.

use muxlink_core::Command as CoreCommand;

use crate::cli::{GlobalOpts, PresetArgs, PresetCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(args: PresetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Validate before touching the network.
    let command = match args.command {
        PresetCommand::Apply { preset } => CoreCommand::ApplyPreset {
            preset_id: util::parse_preset(&preset)?,
        },
        PresetCommand::Save { preset } => CoreCommand::SavePreset {
            preset_id: util::parse_preset(&preset)?,
        },
        PresetCommand::New { name } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "preset name cannot be empty".into(),
                });
            }
            CoreCommand::CreatePreset { name }
        }
    };

    let conn = super::connect(global, false).await?;
    super::execute(&conn, command, global).await
}
