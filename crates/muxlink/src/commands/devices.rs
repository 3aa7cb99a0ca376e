//! Endpoint listing.

use std::sync::Arc;

use tabled::Tabled;

use muxlink_core::{Choice, DeviceRecord, DeviceRole};

use crate::cli::{DevicesArgs, GlobalOpts, RoleFilter};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Watching")]
    watching: String,
}

impl From<&Arc<DeviceRecord>> for DeviceRow {
    fn from(d: &Arc<DeviceRecord>) -> Self {
        Self {
            mac: d.mac.to_string(),
            name: d.custom_name().unwrap_or_default().to_owned(),
            model: d.model_name().to_owned(),
            role: d.role().to_string(),
            ip: d.ip().unwrap_or_default().to_owned(),
            watching: d.connected_mac().map(|m| m.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ChoiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl From<&Choice> for ChoiceRow {
    fn from(c: &Choice) -> Self {
        Self {
            id: c.id.clone(),
            label: c.label.clone(),
        }
    }
}

fn role_of(filter: RoleFilter) -> Option<DeviceRole> {
    match filter {
        RoleFilter::All => None,
        RoleFilter::Tx => Some(DeviceRole::Transmitter),
        RoleFilter::Rx => Some(DeviceRole::Receiver),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::connect(global, true).await?;
    let role = role_of(args.role);

    let out = if args.choices {
        let lists = conn.session.registry().selection_lists();
        let list = lists.for_role(role);
        output::render_list(
            &global.output,
            list.choices(),
            |c| ChoiceRow::from(c),
            |c| c.id.clone(),
        )
    } else {
        let devices: Vec<Arc<DeviceRecord>> = conn
            .session
            .registry()
            .devices_snapshot()
            .into_iter()
            .filter(|d| role.is_none_or(|r| d.role() == r))
            .collect();
        output::render_list(
            &global.output,
            &devices,
            |d| DeviceRow::from(d),
            |d| d.mac.to_string(),
        )
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
