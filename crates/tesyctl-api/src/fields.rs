//! Field keys of the heater's flat JSON state object.
//!
//! The device reports everything as short string-keyed fields. Boolean-like
//! fields use the literal strings `"1"`/`"0"`; the error field uses `"00"`
//! for "no error" and any other two-digit code for an active device error.

/// API-level status flag. The literal `"OK"` signals a successful call.
pub const API: &str = "api";

/// Current software (WiFi module) version.
pub const SOFTWARE_VERSION: &str = "wsw";

/// Hardware version.
pub const HARDWARE_VERSION: &str = "hsw";

/// MAC address of the device -- the stable unique identifier.
pub const MAC: &str = "MAC";

/// Numeric device-type id (`2000`, `2002`, ... -- see the model table in
/// `tesyctl-core`).
pub const DEVICE_TYPE: &str = "id";

/// Whether the heating element is currently on.
pub const HEATING: &str = "ht";

/// Current temperature in °C; current shower count on shower-scale models.
pub const CURRENT_TEMP: &str = "tmpC";

/// Target temperature in manual mode; target showers on shower-scale
/// models. Integer in both cases.
pub const TARGET_TEMP: &str = "tmpT";

/// Read-only setpoint the controller is actually using for the active
/// mode. Differs from `tmpT` outside manual mode.
pub const REQUESTED_TEMP: &str = "tmpR";

/// Maximum settable showers; depends on tank size and mounting position.
pub const MAX_SHOWERS: &str = "tmpMX";

/// Operating mode code `0`..`6`.
pub const MODE: &str = "mode";

/// Standby flag. `0` keeps antifreeze protection active while off.
pub const POWER: &str = "pwr";

/// Boost flag. The heater heats once to max, holds, then clears it itself.
pub const BOOST: &str = "bst";

/// Long operational counter: seconds the element was powered. Dual-tank
/// devices report two `;`-separated counters, one per element.
pub const ENERGY_COUNTER: &str = "pwc_t";

/// User-resettable counter variant with its last-reset timestamp.
pub const ENERGY_COUNTER_USER: &str = "pwc_u";

/// WiFi RSSI in dBm (negative).
pub const RSSI: &str = "wdBm";

/// Hex-encoded parameter blob: tank volume and per-element wattage on
/// dual-tank devices, among other factory data.
pub const PARAMETERS: &str = "parNF";

/// Timezone string, e.g. `GMT0BST,M3.5.0/1,M10.5.0`.
pub const TIMEZONE: &str = "tz";

/// Cloud profile / user email.
pub const PROFILE: &str = "prfl";

/// URL-encoded, base64-encoded JSON metadata (custom name etc.).
pub const EXTRA: &str = "extr";

/// Current date/time on the device.
pub const DATE: &str = "date";

/// Water timestamp.
pub const WATER_TIMESTAMP: &str = "wtstp";

/// Uptime in seconds since last boot.
pub const UPTIME: &str = "wup";

/// Reset flag.
pub const RESET: &str = "reset";

/// Error code; `"00"` means no error.
pub const ERROR: &str = "err";

/// Child lock: `1` locked, `0` unlocked.
pub const CHILD_LOCK: &str = "lck";

/// Vacation mode flag.
pub const VACATION: &str = "vac";

/// Mounting position: `0` vertical, otherwise horizontal.
pub const POSITION: &str = "psn";

/// Minutes until the target temperature is reached.
pub const COUNTDOWN: &str = "cdt";

/// WiFi IP address.
pub const WIFI_IP: &str = "wIP";

/// WiFi SSID.
pub const WIFI_SSID: &str = "wSSID";

/// Power calculation data.
pub const POWER_CALC: &str = "pwcalc";

/// PIC microcontroller time.
pub const PIC_TIME: &str = "PICTime";
