//! `status` command: one validating fetch, decoded state, optional raw
//! field dump.

use serde::Serialize;
use tabled::Tabled;

use tesyctl_core::{Coordinator, decode};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Decoded status view ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusView {
    host: String,
    model: Option<String>,
    mac: Option<String>,
    device_name: Option<String>,
    mode: Option<String>,
    power: Option<bool>,
    heating: Option<bool>,
    boost: Option<bool>,
    current_temp: Option<i32>,
    target_temp: Option<i32>,
    requested_temp: Option<i32>,
    max_showers: Option<i32>,
    countdown_minutes: Option<u32>,
    error: Option<String>,
    energy_kwh: Option<f64>,
    rssi_dbm: Option<i32>,
    wifi_quality_pct: Option<u8>,
    uptime: Option<String>,
    position: Option<String>,
    child_lock: Option<bool>,
    vacation: Option<bool>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    coordinator.start().await.map_err(CliError::from)?;
    let snapshot = coordinator
        .current_snapshot()
        .ok_or(CliError::Device(tesyctl_core::CoreError::NotStarted))?;
    let identity = coordinator.identity().await;
    coordinator.shutdown().await;

    let watts = coordinator.config().heater_power_watts;
    let view = StatusView {
        host: coordinator.config().host.clone(),
        model: identity.as_ref().map(|i| i.model_name().to_owned()),
        mac: identity.map(|i| i.mac),
        device_name: decode::device_name(&snapshot),
        mode: decode::mode_text(&snapshot),
        power: decode::is_powered_on(&snapshot),
        heating: decode::is_heating(&snapshot),
        boost: decode::is_boost_active(&snapshot),
        current_temp: decode::current_temperature(&snapshot),
        target_temp: decode::target_temperature(&snapshot),
        requested_temp: decode::requested_temperature(&snapshot),
        max_showers: decode::max_showers(&snapshot),
        countdown_minutes: decode::countdown_minutes(&snapshot),
        error: decode::error_text(&snapshot),
        energy_kwh: decode::energy_kwh(&snapshot, watts),
        rssi_dbm: decode::rssi_dbm(&snapshot),
        wifi_quality_pct: decode::wifi_quality_pct(&snapshot),
        uptime: decode::uptime_seconds(&snapshot)
            .map(|s| humantime::format_duration(std::time::Duration::from_secs(s)).to_string()),
        position: decode::position(&snapshot).map(|p| p.to_string()),
        child_lock: decode::is_child_locked(&snapshot),
        vacation: decode::is_vacation(&snapshot),
    };

    let out = output::render_single(&global.output, &view, detail, |v| v.host.clone());
    output::print_output(&out, global.quiet);

    if args.raw {
        let fields: Vec<(String, String)> = snapshot
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        let out = output::render_list(
            &global.output,
            &fields,
            |(k, v)| FieldRow {
                key: k.clone(),
                value: v.clone(),
            },
            |(k, v)| format!("{k}={v}"),
        );
        output::print_output(&out, global.quiet);
    }

    Ok(())
}

/// Multi-line detail view for table mode. Absent fields are omitted
/// rather than printed as empty.
fn detail(view: &StatusView) -> String {
    let mut lines = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{label:<16} {value}"));
        }
    };

    push("Host", Some(view.host.clone()));
    push("Model", view.model.clone());
    push("MAC", view.mac.clone());
    push("Name", view.device_name.clone());
    push("Mode", view.mode.clone());
    push("Power", view.power.map(on_off));
    push("Heating", view.heating.map(on_off));
    push("Boost", view.boost.map(on_off));
    push("Current", view.current_temp.map(|t| t.to_string()));
    push("Target", view.target_temp.map(|t| t.to_string()));
    push("Requested", view.requested_temp.map(|t| t.to_string()));
    push("Max showers", view.max_showers.map(|t| t.to_string()));
    push(
        "Time to target",
        view.countdown_minutes.map(|m| format!("{m} min")),
    );
    push("Error", view.error.clone());
    push("Energy", view.energy_kwh.map(|e| format!("{e:.2} kWh")));
    push(
        "WiFi",
        match (view.rssi_dbm, view.wifi_quality_pct) {
            (Some(rssi), Some(pct)) => Some(format!("{rssi} dBm ({pct}%)")),
            (Some(rssi), None) => Some(format!("{rssi} dBm")),
            _ => None,
        },
    );
    push("Uptime", view.uptime.clone());
    push("Position", view.position.clone());
    push("Child lock", view.child_lock.map(on_off));
    push("Vacation", view.vacation.map(on_off));

    lines.join("\n")
}

fn on_off(on: bool) -> String {
    if on { "on".into() } else { "off".into() }
}
