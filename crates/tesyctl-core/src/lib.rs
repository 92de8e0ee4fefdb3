//! Polling and decoding layer between `tesyctl-api` and UI consumers.
//!
//! This crate owns the business logic for the tesyctl workspace:
//!
//! - **[`Coordinator`]** — Central facade managing one heater's
//!   lifecycle: [`start()`](Coordinator::start) performs a validating
//!   first fetch, then spawns the background poll loop. Consumers
//!   observe the latest snapshot and the coordinator's [`Health`]
//!   through `tokio::sync::watch` channels, and route writes
//!   (`set_target_temperature`, `set_power`, ...) through it.
//!
//! - **Decoders** ([`decode`]) — Pure, fail-soft transforms from the
//!   raw string-field snapshot to typed values: operating mode, error
//!   status, lifetime energy (single- and dual-tank math), the encoded
//!   device-name blob, RSSI quality buckets, and the numeric and
//!   boolean fields.
//!
//! - **Domain model** ([`model`]) — The known heater families with
//!   their setpoint ranges, the [`Mode`] wire codes, and the per-device
//!   [`DeviceIdentity`] captured on first contact.

pub mod config;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{HeaterConfig, WritePolicy};
pub use coordinator::{Coordinator, Health};
pub use error::CoreError;
pub use model::{DeviceIdentity, DeviceModel, Mode, Position};

// Re-export the API-layer types consumers routinely touch.
pub use tesyctl_api::{ApiVariant, RawSnapshot};
