//! Shared helpers for command handlers.

use muxlink_core::{MacAddress, PresetId, Session};

use crate::error::CliError;

/// Resolve an endpoint identifier (MAC or custom name) to a MAC.
///
/// Names must match a known endpoint. Anything shaped like a MAC is sent
/// as given, so routing still works when the refresh came back empty.
pub fn resolve_device(session: &Session, identifier: &str) -> Result<MacAddress, CliError> {
    if let Some(mac) = session.registry().resolve(identifier) {
        return Ok(mac);
    }

    let mac = MacAddress::new(identifier);
    if mac.is_well_formed() {
        tracing::debug!(%mac, "endpoint not in registry, sending MAC as given");
        Ok(mac)
    } else {
        Err(CliError::NotFound {
            identifier: identifier.into(),
        })
    }
}

pub fn parse_preset(raw: &str) -> Result<PresetId, CliError> {
    raw.parse().map_err(|e: muxlink_core::CoreError| CliError::Validation {
        field: "preset".into(),
        reason: e.to_string(),
    })
}
