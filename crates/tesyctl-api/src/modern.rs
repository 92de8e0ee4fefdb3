// Modern (ESP32 firmware) API client.
//
// The current firmware serves the whole state machine through a single
// query-string endpoint: `GET /api?name=<field>[&set=<value>]`. Reading
// `name=_all` returns the full flat state object; a write acknowledges
// with whatever subset of the state the firmware decides to echo.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::probe::EndpointProber;
use crate::snapshot::{RawSnapshot, read_snapshot};
use crate::transport::TransportConfig;

/// Pseudo-field that selects the full state readout.
const ALL_FIELDS: &str = "_all";

/// Client for the current ESP32-based firmware API.
#[derive(Debug, Clone)]
pub struct ModernClient {
    http: reqwest::Client,
    base_url: Url,
    prober: EndpointProber,
}

impl ModernClient {
    /// Create a client for the device at `host` (IP address or hostname).
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}/"))?;
        let http = transport.build_client()?;
        let prober = EndpointProber::new(base_url.clone())?;
        Ok(Self {
            http,
            base_url,
            prober,
        })
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The diagnostic endpoint prober for this device.
    pub fn prober(&self) -> &EndpointProber {
        &self.prober
    }

    /// Read the complete device state: `GET /api?name=_all`.
    pub async fn fetch_all(&self) -> Result<RawSnapshot, Error> {
        self.request(&[("name", ALL_FIELDS)]).await
    }

    /// Write one field: `GET /api?name={name}&set={value}`.
    ///
    /// Returns whatever partial or full snapshot the device includes in
    /// the write acknowledgement -- current firmware echoes the changed
    /// field plus the `api` status.
    pub async fn set_field(&self, name: &str, value: &str) -> Result<RawSnapshot, Error> {
        self.request(&[("name", name), ("set", value)]).await
    }

    async fn request(&self, query: &[(&str, &str)]) -> Result<RawSnapshot, Error> {
        let mut url = self.base_url.join("api")?;
        url.query_pairs_mut().extend_pairs(query);

        debug!("GET {url}");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        read_snapshot(resp).await
    }
}
