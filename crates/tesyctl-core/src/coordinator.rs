// ── Polling coordinator ──
//
// Full lifecycle management for one heater. Owns the single shared
// snapshot, runs the periodic fetch cycle, enforces at-most-one
// in-flight refresh, and routes write commands to the device. Consumers
// observe the snapshot and the health state through watch channels, so
// they always see a complete snapshot, never a partially-applied one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tesyctl_api::{DeviceClient, RawSnapshot, TransportConfig, fields, probe};

use crate::config::{HeaterConfig, WritePolicy, clamp_poll_interval};
use crate::error::CoreError;
use crate::model::{DeviceIdentity, Mode};

// ── Health ───────────────────────────────────────────────────────

/// Coordinator health observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// No successful fetch yet; the coordinator is unusable until
    /// [`Coordinator::start`] validates the device.
    Unvalidated,
    /// Last fetch succeeded; waiting for the next tick.
    Idle,
    /// A fetch is in flight.
    Refreshing,
    /// Last fetch failed. The previous snapshot is still served; the
    /// poll loop keeps retrying at the configured interval.
    Stale,
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Construction is
/// passive; [`start()`](Self::start) performs the validating first
/// fetch and spawns the poll loop.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: HeaterConfig,
    client: DeviceClient,
    /// Latest good snapshot. `None` only before the first success.
    snapshot_tx: watch::Sender<Option<Arc<RawSnapshot>>>,
    health_tx: watch::Sender<Health>,
    /// Current poll interval; the poll task re-arms when it changes.
    interval_tx: watch::Sender<Duration>,
    /// Held for the whole fetch cycle. A second caller arriving while a
    /// cycle runs queues here instead of issuing a duplicate request.
    refresh_gate: Mutex<()>,
    identity: Mutex<Option<DeviceIdentity>>,
    cancel: CancellationToken,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator from configuration. Does NOT contact the
    /// device -- call [`start()`](Self::start) to validate and begin
    /// polling.
    pub fn new(config: HeaterConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = DeviceClient::new(&config.host, config.api, &transport)?;

        let (snapshot_tx, _) = watch::channel(None);
        let (health_tx, _) = watch::channel(Health::Unvalidated);
        let (interval_tx, _) = watch::channel(config.effective_poll_interval());

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                snapshot_tx,
                health_tx,
                interval_tx,
                refresh_gate: Mutex::new(()),
                identity: Mutex::new(None),
                cancel: CancellationToken::new(),
                poll_handle: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &HeaterConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Validate the device and start the poll loop.
    ///
    /// Performs one fetch synchronously; if it fails, the error is
    /// returned, the health stays [`Health::Unvalidated`], and no
    /// background task is spawned.
    pub async fn start(&self) -> Result<(), CoreError> {
        {
            let handle = self.inner.poll_handle.lock().await;
            if handle.is_some() {
                return Err(CoreError::Internal("coordinator already started".into()));
            }
        }

        self.run_cycle().await.inspect_err(|_| {
            // Failed validation keeps the coordinator unusable.
            self.inner.health_tx.send_replace(Health::Unvalidated);
        })?;

        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_task(coordinator, cancel));
        *self.inner.poll_handle.lock().await = Some(handle);

        info!(host = %self.inner.config.host, "coordinator started");
        Ok(())
    }

    /// Stop scheduling further ticks and wait for the poll task to
    /// finish. An in-flight fetch is allowed to complete.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.poll_handle.lock().await.take() {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    // ── Observation ──────────────────────────────────────────────

    /// Subscribe to snapshot updates. The receiver sees every
    /// successful cycle exactly once.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<RawSnapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Subscribe to health transitions.
    pub fn health(&self) -> watch::Receiver<Health> {
        self.inner.health_tx.subscribe()
    }

    /// The latest good snapshot, if any fetch has succeeded yet.
    pub fn current_snapshot(&self) -> Option<Arc<RawSnapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn current_health(&self) -> Health {
        *self.inner.health_tx.borrow()
    }

    /// Device identity captured from the first successful snapshot.
    pub async fn identity(&self) -> Option<DeviceIdentity> {
        self.inner.identity.lock().await.clone()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch a fresh snapshot now.
    ///
    /// At most one fetch is in flight per coordinator. A caller
    /// arriving while a cycle runs does not issue a second request; it
    /// waits for the in-flight cycle and reports that cycle's outcome.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        match self.inner.refresh_gate.try_lock() {
            Ok(_guard) => self.run_cycle_locked().await,
            Err(_) => {
                // Queue behind the in-flight cycle, then report how it went.
                let _guard = self.inner.refresh_gate.lock().await;
                match self.current_health() {
                    Health::Stale | Health::Unvalidated => Err(CoreError::Api {
                        message: "refresh cycle failed".into(),
                        status: None,
                    }),
                    Health::Idle | Health::Refreshing => Ok(()),
                }
            }
        }
    }

    async fn run_cycle(&self) -> Result<(), CoreError> {
        let _guard = self.inner.refresh_gate.lock().await;
        self.run_cycle_locked().await
    }

    /// One fetch cycle. Caller must hold `refresh_gate`.
    async fn run_cycle_locked(&self) -> Result<(), CoreError> {
        self.inner.health_tx.send_replace(Health::Refreshing);

        let snapshot = match self.inner.client.fetch_all().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "fetch failed");
                self.inner.health_tx.send_replace(Health::Stale);
                return Err(self.lift(e));
            }
        };

        // A control-path response must carry `api` equal to "OK"; a
        // missing field counts as a failed cycle just like a bad status.
        if !snapshot.api_ok() {
            let status = snapshot.get(fields::API).unwrap_or("(absent)").to_owned();
            warn!(status, "device reported API status != OK");
            self.inner.health_tx.send_replace(Health::Stale);
            return Err(CoreError::ValidationFailed { status });
        }

        self.publish(snapshot).await;
        self.inner.health_tx.send_replace(Health::Idle);
        Ok(())
    }

    async fn publish(&self, snapshot: RawSnapshot) {
        let mut identity = self.inner.identity.lock().await;
        if identity.is_none() {
            *identity = DeviceIdentity::from_snapshot(&snapshot);
        }
        drop(identity);

        debug!(fields = snapshot.len(), "snapshot updated");
        self.inner.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
    }

    /// Change the poll interval for subsequent ticks, clamped to the
    /// supported range. Takes effect without a restart. Returns the
    /// interval actually applied.
    pub fn set_poll_interval(&self, requested: Duration) -> Duration {
        let applied = clamp_poll_interval(requested);
        self.inner.interval_tx.send_replace(applied);
        info!(interval_secs = applied.as_secs(), "poll interval changed");
        applied
    }

    pub fn poll_interval(&self) -> Duration {
        *self.inner.interval_tx.borrow()
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Set the manual-mode target, in °C or showers depending on the
    /// model. Validated against the model table when the device family
    /// is known.
    pub async fn set_target_temperature(&self, value: u8) -> Result<(), CoreError> {
        if let Some(identity) = self.identity().await {
            if let Some(model) = identity.model {
                let max = self.effective_max_setpoint(model.max_setpoint, model.uses_showers);
                if value < model.min_setpoint || value > max {
                    return Err(CoreError::InvalidSetpoint {
                        value,
                        min: model.min_setpoint,
                        max,
                    });
                }
            }
        }
        self.write_field(fields::TARGET_TEMP, &value.to_string())
            .await
    }

    /// Standby on/off. Off leaves only antifreeze protection active.
    pub async fn set_power(&self, on: bool) -> Result<(), CoreError> {
        self.write_field(fields::POWER, flag(on)).await
    }

    /// One-shot boost to maximum; the device clears the flag itself.
    pub async fn set_boost(&self, on: bool) -> Result<(), CoreError> {
        self.write_field(fields::BOOST, flag(on)).await
    }

    pub async fn set_operation_mode(&self, mode: Mode) -> Result<(), CoreError> {
        self.write_field(fields::MODE, mode.wire_code()).await
    }

    /// Shower-scale models report their real maximum at runtime.
    fn effective_max_setpoint(&self, table_max: u8, uses_showers: bool) -> u8 {
        if !uses_showers {
            return table_max;
        }
        self.current_snapshot()
            .and_then(|s| crate::decode::max_showers(&s))
            .and_then(|m| u8::try_from(m).ok())
            .unwrap_or(table_max)
    }

    /// Issue one field write and reconcile local state per the
    /// configured [`WritePolicy`].
    async fn write_field(&self, field: &str, value: &str) -> Result<(), CoreError> {
        if self.current_snapshot().is_none() {
            return Err(CoreError::NotStarted);
        }

        let ack = self
            .inner
            .client
            .set_field(field, value)
            .await
            .map_err(|e| self.lift(e))?;
        if ack.contains(fields::API) && !ack.api_ok() {
            return Err(CoreError::WriteRejected {
                field: field.to_owned(),
            });
        }

        match self.inner.config.write_policy {
            WritePolicy::MergeAck => {
                // Merge only the written field into the held snapshot.
                // The rest stays as-is until the next poll, which keeps
                // writes cheap at the cost of briefly stale siblings.
                let acked = ack.get(field).unwrap_or(value);
                if let Some(current) = self.current_snapshot() {
                    let merged = current.merged(field, acked);
                    self.inner.snapshot_tx.send_replace(Some(Arc::new(merged)));
                }
                debug!(field, value = acked, "write acknowledged, field merged");
                Ok(())
            }
            WritePolicy::RefreshAfterWrite => {
                debug!(field, value, "write acknowledged, refreshing");
                self.refresh().await
            }
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────

    fn prober(&self) -> Result<&probe::EndpointProber, CoreError> {
        self.inner
            .client
            .prober()
            .ok_or_else(|| CoreError::Unsupported {
                operation: "diagnostics".into(),
                required: "modern API firmware".into(),
            })
    }

    /// Sweep the diagnostic endpoint catalog. Modern firmwares only.
    pub async fn discover_diagnostics(&self) -> Result<probe::ProbeReport, CoreError> {
        Ok(self.prober()?.discover().await)
    }

    pub async fn system_info(&self) -> Result<serde_json::Map<String, serde_json::Value>, CoreError>
    {
        Ok(self.prober()?.system_info().await)
    }

    pub async fn wifi_info(&self) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
        Ok(self.prober()?.wifi_info().await)
    }

    pub async fn filesystem_info(
        &self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
        Ok(self.prober()?.filesystem_info().await)
    }

    /// Fetch one diagnostic path verbatim.
    pub async fn fetch_endpoint(&self, path: &str) -> Result<probe::EndpointReport, CoreError> {
        // The prober runs on its own shorter timeout.
        self.prober()?
            .fetch_endpoint(path)
            .await
            .map_err(|e| CoreError::from(e).with_timeout(tesyctl_api::transport::PROBE_TIMEOUT))
    }

    /// Translate a transport-layer error, stamping the configured
    /// timeout onto timeout failures.
    fn lift(&self, err: tesyctl_api::Error) -> CoreError {
        CoreError::from(err).with_timeout(self.inner.config.timeout)
    }
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

// ── Background poll loop ─────────────────────────────────────────

/// Sleep for the configured interval, refresh, repeat. Re-arms
/// immediately when the interval changes so a shorter period does not
/// wait out the old one. A failed cycle just logs; the loop never stops
/// retrying on its own.
async fn poll_task(coordinator: Coordinator, cancel: CancellationToken) {
    let mut interval_rx = coordinator.inner.interval_tx.subscribe();

    loop {
        let period = *interval_rx.borrow_and_update();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep(period) => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "scheduled refresh failed");
                }
            }
        }
    }
}
