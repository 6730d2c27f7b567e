//! Device command handlers.

use chrono::NaiveDateTime;
use tabled::Tabled;

use lanwarden_core::{Device, DeviceKey, MacAddress};

use crate::cli::{
    DeviceAddArgs, DeviceUpdateArgs, DevicesArgs, DevicesCommand, DevicesListArgs, GlobalOpts,
};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            mac: d.key.mac.to_string(),
            ip: d.key.ip.clone(),
            hostname: d.hostname.clone().unwrap_or_default(),
            description: d.description.clone().unwrap_or_default(),
            vendor: d.vendor.clone().unwrap_or_default(),
            last_seen: fmt_time(d.last_seen),
        }
    }
}

fn fmt_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(list) => handle_list(ctx, &list, global).await,

        DevicesCommand::Approve { mac, ip } => {
            let key = device_key(&mac, ip)?;
            ctx.lists.refresh().await?;
            ctx.lists.approve(&key).await?;
            output::print_output(&format!("Approved {key}"), global.quiet);
            Ok(())
        }

        DevicesCommand::Revoke { mac, ip } => {
            let key = device_key(&mac, ip)?;
            ctx.lists.refresh().await?;
            ctx.lists.revoke(&key).await?;
            output::print_output(&format!("Revoked {key}"), global.quiet);
            Ok(())
        }

        DevicesCommand::Add(add) => {
            let device = Device {
                key: device_key(&add.mac, add.ip)?,
                hostname: add.hostname,
                description: add.description,
                vendor: None,
                first_seen: None,
                last_seen: None,
            };
            ctx.lists.add_device(&device, !add.unapproved).await?;
            output::print_output(&format!("Added {}", device.key), global.quiet);
            Ok(())
        }

        DevicesCommand::Update(update) => handle_update(ctx, update, global).await,
    }
}

async fn handle_list(
    ctx: &Context,
    list: &DevicesListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.lists.refresh().await?;

    let data: Vec<Device> = if list.all {
        let mut all: Vec<Device> = ctx.lists.approved().iter().cloned().collect();
        all.extend(ctx.lists.unapproved().iter().cloned());
        all
    } else if list.unapproved {
        ctx.lists.unapproved().iter().cloned().collect()
    } else {
        ctx.lists.approved().iter().cloned().collect()
    };

    let out = output::render_list(
        &global.output,
        &data,
        |d| DeviceRow::from(d),
        |d| d.key.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn handle_update(
    ctx: &Context,
    update: DeviceUpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let key = device_key(&update.mac, update.ip)?;
    ctx.lists.refresh().await?;

    let list = if update.unapproved {
        ctx.lists.unapproved()
    } else {
        ctx.lists.approved()
    };
    let mut device = list
        .iter()
        .find(|d| d.key == key)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "device".into(),
            identifier: key.to_string(),
            list_command: "devices list --all".into(),
        })?;

    if let Some(hostname) = update.hostname {
        device.hostname = Some(hostname);
    }
    if let Some(description) = update.description {
        device.description = Some(description);
    }

    ctx.lists.update_device(&device, !update.unapproved).await?;
    output::print_output(&format!("Updated {key}"), global.quiet);
    Ok(())
}

fn device_key(mac: &str, ip: String) -> Result<DeviceKey, CliError> {
    Ok(DeviceKey {
        mac: MacAddress::parse(mac).map_err(CliError::from)?,
        ip,
    })
}
