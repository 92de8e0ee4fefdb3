// ── Pure snapshot decoders ──
//
// Every function here is a stateless transform over a `RawSnapshot` and
// fails soft: a missing field or an unparseable value yields `None`,
// never an error into the caller. The poll loop and the write path stay
// entirely unaffected by decode problems.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use tesyctl_api::{RawSnapshot, fields};

use crate::model::{Mode, Position};

/// Pulse-seconds to kWh divisor: one pulse-second at one watt.
const PULSE_SECONDS_PER_KWH: f64 = 3600.0 * 1000.0;

/// Byte offset of the first tank's wattage inside the `parNF` hex blob.
const TANK_WATTS_OFFSET: usize = 38;

/// Each `parNF` wattage byte counts in units of 20 W.
const TANK_WATTS_SCALE: u32 = 20;

/// Fallback when the `extr` metadata blob cannot be decoded.
const UNKNOWN_NAME: &str = "Unknown";

// ── Mode and error ───────────────────────────────────────────────────

/// Operating mode, if the snapshot carries one.
pub fn mode(snapshot: &RawSnapshot) -> Option<Mode> {
    snapshot.get(fields::MODE).map(Mode::from_code)
}

/// Human-readable mode name.
pub fn mode_text(snapshot: &RawSnapshot) -> Option<String> {
    mode(snapshot).map(|m| m.text())
}

/// Human-readable error status. `"00"` is the documented no-error code;
/// the firmware's other codes are undocumented, so anything else is
/// reported generically with the raw code kept visible.
pub fn error_text(snapshot: &RawSnapshot) -> Option<String> {
    let code = snapshot.get(fields::ERROR)?;
    if code == "00" {
        Some("no error".into())
    } else {
        Some(format!("unknown error ({code})"))
    }
}

/// Whether the device reports an active error.
pub fn has_error(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::ERROR).map(|code| code != "00")
}

// ── Energy ───────────────────────────────────────────────────────────

/// Lifetime energy estimate in kWh.
///
/// The long counter accumulates seconds of element-on time. Single-tank
/// devices report one value and the nominal wattage comes from config.
/// Dual-tank devices report `a;b` and each tank's wattage is read from a
/// fixed offset in the `parNF` hex blob (one byte per tank, x20 W).
pub fn energy_kwh(snapshot: &RawSnapshot, configured_watts: u32) -> Option<f64> {
    let counter = snapshot.get(fields::ENERGY_COUNTER)?;

    match counter.split_once(';') {
        None => {
            let pulses: u64 = counter.trim().parse().ok()?;
            Some(pulses as f64 * f64::from(configured_watts) / PULSE_SECONDS_PER_KWH)
        }
        Some((first, second)) => {
            let blob = snapshot.get(fields::PARAMETERS)?;
            let mut total = 0.0;
            for (i, raw) in [first, second].into_iter().enumerate() {
                let watts = tank_watts(blob, i)?;
                let pulses: u64 = raw.trim().parse().ok()?;
                total += pulses as f64 * f64::from(watts) / PULSE_SECONDS_PER_KWH;
            }
            Some(total)
        }
    }
}

/// Wattage of tank `index` from the `parNF` hex blob.
fn tank_watts(blob: &str, index: usize) -> Option<u32> {
    let start = TANK_WATTS_OFFSET + index * 2;
    let byte = blob.get(start..start + 2)?;
    let value = u32::from_str_radix(byte, 16).ok()?;
    Some(value * TANK_WATTS_SCALE)
}

// ── Device metadata ──────────────────────────────────────────────────

/// Cloud-assigned device name from the `extr` blob.
///
/// The blob is URL-encoded base64-encoded JSON; any failure along the
/// chain falls back to a fixed placeholder rather than propagating.
pub fn device_name(snapshot: &RawSnapshot) -> Option<String> {
    let raw = snapshot.get(fields::EXTRA)?;
    Some(decode_extra_name(raw).unwrap_or_else(|| UNKNOWN_NAME.into()))
}

fn decode_extra_name(raw: &str) -> Option<String> {
    let unquoted = urlencoding::decode(raw).ok()?;
    let bytes = BASE64.decode(unquoted.trim()).ok()?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    json.get("tzname")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

/// Mounting position. `"0"` is vertical; the firmware reports anything
/// else for horizontal mounts.
pub fn position(snapshot: &RawSnapshot) -> Option<Position> {
    snapshot.get(fields::POSITION).map(|v| {
        if v == "0" {
            Position::Vertical
        } else {
            Position::Horizontal
        }
    })
}

// ── Numeric fields ───────────────────────────────────────────────────

fn parse_int<T: std::str::FromStr>(snapshot: &RawSnapshot, key: &str) -> Option<T> {
    snapshot.get(key)?.trim().parse().ok()
}

/// Current temperature in °C, or current shower count on shower-scale
/// models.
pub fn current_temperature(snapshot: &RawSnapshot) -> Option<i32> {
    parse_int(snapshot, fields::CURRENT_TEMP)
}

/// Target set by the user (manual mode), in °C or showers.
pub fn target_temperature(snapshot: &RawSnapshot) -> Option<i32> {
    parse_int(snapshot, fields::TARGET_TEMP)
}

/// Target the controller is actually chasing, which differs from the
/// manual target outside manual mode.
pub fn requested_temperature(snapshot: &RawSnapshot) -> Option<i32> {
    parse_int(snapshot, fields::REQUESTED_TEMP)
}

/// Maximum shower count this unit supports (size and position dependent).
pub fn max_showers(snapshot: &RawSnapshot) -> Option<i32> {
    parse_int(snapshot, fields::MAX_SHOWERS)
}

/// Minutes until the target is reached.
pub fn countdown_minutes(snapshot: &RawSnapshot) -> Option<u32> {
    parse_int(snapshot, fields::COUNTDOWN)
}

/// Seconds since the WiFi module last booted.
pub fn uptime_seconds(snapshot: &RawSnapshot) -> Option<u64> {
    parse_int(snapshot, fields::UPTIME)
}

/// WiFi signal strength in dBm.
pub fn rssi_dbm(snapshot: &RawSnapshot) -> Option<i32> {
    parse_int(snapshot, fields::RSSI)
}

/// WiFi quality as a coarse percentage bucket derived from RSSI.
pub fn wifi_quality_pct(snapshot: &RawSnapshot) -> Option<u8> {
    let rssi = rssi_dbm(snapshot)?;
    Some(match rssi {
        r if r >= -50 => 100,
        r if r >= -60 => 80,
        r if r >= -70 => 60,
        r if r >= -80 => 40,
        r if r >= -90 => 20,
        _ => 0,
    })
}

// ── Boolean flags ────────────────────────────────────────────────────

/// Element currently heating.
pub fn is_heating(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::HEATING).map(|v| v == "1")
}

/// Standby flag; off means antifreeze-only.
pub fn is_powered_on(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::POWER).map(|v| v == "1")
}

/// One-shot boost to maximum.
pub fn is_boost_active(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::BOOST).map(|v| v == "1")
}

/// Front-panel child lock.
pub fn is_child_locked(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::CHILD_LOCK).map(|v| v == "1")
}

/// Vacation mode.
pub fn is_vacation(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::VACATION).map(|v| v == "1")
}

/// Pending factory-reset flag.
pub fn reset_flag(snapshot: &RawSnapshot) -> Option<bool> {
    snapshot.get(fields::RESET).map(|v| v == "1")
}
