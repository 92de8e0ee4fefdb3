// Legacy (pre-ESP32 CGI firmware) API client.
//
// Older WiFi modules serve the same query contract through a CGI binary
// at `/api.cgi`. The response shape is identical, but the firmware has
// none of the ESP32 diagnostic endpoints, so there is no prober here.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::snapshot::{RawSnapshot, read_snapshot};
use crate::transport::TransportConfig;

const ALL_FIELDS: &str = "_all";

/// Client for the old CGI-based firmware API.
#[derive(Debug, Clone)]
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LegacyClient {
    /// Create a client for the device at `host` (IP address or hostname).
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}/"))?;
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Read the complete device state: `GET /api.cgi?name=_all`.
    pub async fn fetch_all(&self) -> Result<RawSnapshot, Error> {
        self.request(&[("name", ALL_FIELDS)]).await
    }

    /// Write one field: `GET /api.cgi?name={name}&set={value}`.
    pub async fn set_field(&self, name: &str, value: &str) -> Result<RawSnapshot, Error> {
        self.request(&[("name", name), ("set", value)]).await
    }

    async fn request(&self, query: &[(&str, &str)]) -> Result<RawSnapshot, Error> {
        let mut url = self.base_url.join("api.cgi")?;
        url.query_pairs_mut().extend_pairs(query);

        debug!("GET {url}");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        read_snapshot(resp).await
    }
}
