// Best-effort diagnostic endpoint prober.
//
// The ESP32 WiFi module behind the modern firmware exposes an assortment
// of conventional diagnostic paths besides the documented `/api` surface.
// Which ones exist varies per firmware build, so discovery sweeps a fixed
// catalog and records whatever answers. Every per-endpoint failure is
// logged and swallowed -- the probe is a discovery aid, never part of the
// control path, and must not be able to abort it.

use std::collections::BTreeMap;

use futures_util::StreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::snapshot::truncate;
use crate::transport::{PROBE_TIMEOUT, TransportConfig};

/// Conventional ESP32 diagnostic paths worth sweeping.
pub const PROBE_ENDPOINTS: &[&str] = &[
    "/",
    "/info",
    "/status",
    "/system",
    "/wifi",
    "/debug",
    "/heap",
    "/firmware",
    "/version",
    "/config",
    "/scan",
    "/restart",
    "/reset",
    "/update",
    "/files",
    "/fs",
    "/spiffs",
    "/littlefs",
    "/api/info",
    "/api/status",
    "/api/system",
    "/api/wifi",
    "/api/debug",
    "/api/heap",
    "/api/version",
    "/api/config",
    "/json",
    "/data.json",
    "/status.json",
    "/info.json",
    "/manifest.json",
];

/// Keep the device's tiny HTTP stack comfortable during a sweep.
const PROBE_CONCURRENCY: usize = 4;

/// Truncation length for response previews in the discovery report.
const PREVIEW_LEN: usize = 200;

/// Truncation length for raw (non-JSON) bodies in focused sweeps.
const RAW_LEN: usize = 500;

// ── Report types ─────────────────────────────────────────────────────

/// One reachable endpoint found during discovery.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointHit {
    pub path: String,
    pub status: u16,
    pub content_type: String,
    pub content_length: usize,
    pub preview: String,
}

/// Result of a full discovery sweep.
///
/// JSON bodies from recognizable paths are additionally merged into the
/// categorized buckets. The categorization is name-heuristic and fuzzy by
/// nature; treat the buckets as hints, the `endpoints` list as the truth.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub endpoints: Vec<EndpointHit>,
    pub system: Map<String, Value>,
    pub wifi: Map<String, Value>,
    pub firmware: Map<String, Value>,
    pub debug: Map<String, Value>,
}

impl ProbeReport {
    /// Number of reachable endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

/// Full capture of a single ad-hoc endpoint fetch.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub path: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub content_length: usize,
    pub body: String,
    /// Parsed body, when the endpoint returned valid JSON.
    pub json: Option<Value>,
}

// ── Prober ───────────────────────────────────────────────────────────

/// Issues the diagnostic GETs. Uses its own client with a shorter timeout
/// than the control path, so a dead endpoint doesn't stall a sweep.
#[derive(Debug, Clone)]
pub struct EndpointProber {
    http: reqwest::Client,
    base_url: Url,
}

impl EndpointProber {
    pub(crate) fn new(base_url: Url) -> Result<Self, Error> {
        let http = TransportConfig::with_timeout(PROBE_TIMEOUT).build_client()?;
        Ok(Self { http, base_url })
    }

    /// Sweep the full catalog and build a discovery report.
    pub async fn discover(&self) -> ProbeReport {
        let mut report = ProbeReport::default();

        let mut hits: Vec<(EndpointHit, Option<Value>)> =
            futures_util::stream::iter(PROBE_ENDPOINTS.iter().copied())
                .map(|path| self.probe_one(path))
                .buffer_unordered(PROBE_CONCURRENCY)
                .filter_map(|hit| async move { hit })
                .collect()
                .await;

        // Concurrency scrambles completion order; keep the catalog order.
        hits.sort_by_key(|(hit, _)| {
            PROBE_ENDPOINTS
                .iter()
                .position(|p| *p == hit.path)
                .unwrap_or(usize::MAX)
        });

        for (hit, json) in hits {
            if let Some(Value::Object(map)) = json {
                if let Some(bucket) = bucket_for(&hit.path, &mut report) {
                    bucket.extend(map);
                }
            }
            report.endpoints.push(hit);
        }

        report
    }

    /// Focused sweep over the system-information endpoints.
    pub async fn system_info(&self) -> Map<String, Value> {
        self.collect_paths(&[
            "/info",
            "/api/info",
            "/system",
            "/api/system",
            "/status",
            "/api/status",
        ])
        .await
    }

    /// Focused sweep over the WiFi endpoints.
    pub async fn wifi_info(&self) -> Map<String, Value> {
        self.collect_paths(&["/wifi", "/api/wifi", "/scan", "/api/scan"])
            .await
    }

    /// Focused sweep over the filesystem endpoints.
    pub async fn filesystem_info(&self) -> Map<String, Value> {
        self.collect_paths(&["/files", "/fs", "/spiffs", "/littlefs", "/api/files"])
            .await
    }

    /// Fetch one ad-hoc path and capture the full response.
    ///
    /// Unlike the sweeps this surfaces transport failures to the caller --
    /// an explicitly requested endpoint that doesn't answer is an error,
    /// not a silent skip.
    pub async fn fetch_endpoint(&self, path: &str) -> Result<EndpointReport, Error> {
        let url = self.url_for(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status().as_u16();

        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = resp.text().await.map_err(Error::Transport)?;
        let json = serde_json::from_str(&body).ok();

        Ok(EndpointReport {
            path: path.to_owned(),
            status,
            headers,
            content_length: body.len(),
            body,
            json,
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    fn url_for(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Probe one path, swallowing every failure.
    async fn probe_one(&self, path: &str) -> Option<(EndpointHit, Option<Value>)> {
        let url = match self.url_for(path) {
            Ok(url) => url,
            Err(e) => {
                debug!(path, error = %e, "probe URL invalid");
                return None;
            }
        };

        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(path, error = %e, "probe failed");
                return None;
            }
        };

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_owned();

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(path, error = %e, "probe body read failed");
                return None;
            }
        };

        let json = if content_type.to_ascii_lowercase().contains("json") {
            serde_json::from_str(&body).ok()
        } else {
            None
        };

        debug!(path, status, "probe hit");
        Some((
            EndpointHit {
                path: path.to_owned(),
                status,
                content_type,
                content_length: body.len(),
                preview: truncate(&body, PREVIEW_LEN),
            },
            json,
        ))
    }

    /// Sequentially try a path subset and collect what answers, keyed as
    /// `from_{path}` (JSON) or `from_{path}_raw` (truncated text).
    async fn collect_paths(&self, paths: &[&str]) -> Map<String, Value> {
        let mut out = Map::new();

        for path in paths {
            let Ok(url) = self.url_for(path) else {
                continue;
            };
            let resp = match self.http.get(url).send().await {
                Ok(resp) if resp.status().is_success() => resp,
                Ok(resp) => {
                    debug!(path, status = resp.status().as_u16(), "endpoint refused");
                    continue;
                }
                Err(e) => {
                    debug!(path, error = %e, "endpoint unreachable");
                    continue;
                }
            };
            let Ok(body) = resp.text().await else {
                continue;
            };

            let key_base = format!("from_{}", path.replace('/', "_"));
            match serde_json::from_str::<Value>(&body) {
                Ok(json) => {
                    out.insert(key_base, json);
                }
                Err(_) => {
                    out.insert(
                        format!("{key_base}_raw"),
                        Value::String(truncate(&body, RAW_LEN)),
                    );
                }
            }
        }

        out
    }
}

/// Which categorized bucket a JSON body from `path` belongs to, if any.
fn bucket_for<'r>(path: &str, report: &'r mut ProbeReport) -> Option<&'r mut Map<String, Value>> {
    match path {
        "/info" | "/api/info" | "/system" | "/api/system" => Some(&mut report.system),
        "/wifi" | "/api/wifi" | "/scan" | "/api/scan" => Some(&mut report.wifi),
        "/version" | "/api/version" | "/firmware" => Some(&mut report.firmware),
        "/debug" | "/api/debug" => Some(&mut report.debug),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_the_conventional_paths() {
        assert!(PROBE_ENDPOINTS.len() >= 30);
        assert!(PROBE_ENDPOINTS.contains(&"/info"));
        assert!(PROBE_ENDPOINTS.contains(&"/heap"));
        assert!(PROBE_ENDPOINTS.contains(&"/manifest.json"));
    }

    #[test]
    fn buckets_follow_path_names() {
        let mut report = ProbeReport::default();
        assert!(bucket_for("/info", &mut report).is_some());
        assert!(bucket_for("/firmware", &mut report).is_some());
        assert!(bucket_for("/heap", &mut report).is_none());
    }
}
