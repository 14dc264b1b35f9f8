//! Vitals HTTP Client
//!
//! This module implements `VitalsApi` on top of the backend's two read-only
//! endpoints:
//! - `GET {base}/` lists the connected devices
//! - `GET {base}/{id}` returns the readings of one device
//!
//! Failures never reach the caller. They are logged and turned into empty results.
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Url};

use crate::{
    api::controller::VitalsApi,
    core::constants::READING_WINDOW_SECS,
    model::vitals::{now_secs, DeviceId, RawReading},
};

/// Keeps the readings taken at or after `now_secs - READING_WINDOW_SECS`, in order.
pub fn readings_within_window(readings: Vec<RawReading>, now_secs: f64) -> Vec<RawReading> {
    let oldest = now_secs - READING_WINDOW_SECS;
    readings
        .into_iter()
        .filter(|reading| reading.timestamp_secs >= oldest)
        .collect()
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "mock", allow(dead_code))]
pub struct HttpVitalsClient {
    base: Url,
    client: Client,
}

#[cfg_attr(feature = "mock", allow(dead_code))]
impl HttpVitalsClient {
    /// Creates a client for the service rooted at `base`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("base url cannot carry a path: {}", base));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    /// Appends `segment` to the base path, `""` addresses the collection root.
    fn endpoint(&self, segment: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url cannot carry a path: {}", self.base))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn fetch_devices(&self) -> Result<Vec<DeviceId>> {
        let url = self.endpoint("")?;
        debug!("Fetching devices from: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn fetch_readings(&self, device: &DeviceId) -> Result<Vec<RawReading>> {
        let url = self.endpoint(device.as_str())?;
        debug!("Fetching readings for device {} from: {}", device, url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VitalsApi for HttpVitalsClient {
    async fn list_devices(&self) -> Vec<DeviceId> {
        match self.fetch_devices().await {
            Ok(devices) => {
                debug!("Received {} devices", devices.len());
                devices
            }
            Err(e) => {
                error!("Error fetching devices: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn get_readings(&self, device: &DeviceId) -> Vec<RawReading> {
        match self.fetch_readings(device).await {
            Ok(readings) => {
                let total = readings.len();
                let recent = readings_within_window(readings, now_secs());
                debug!(
                    "Received {} readings for device {}, {} within window",
                    total,
                    device,
                    recent.len()
                );
                recent
            }
            Err(e) => {
                error!("Error fetching readings for device {}: {:#}", device, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use warp::{http::StatusCode, Filter};

    fn reading(ts: f64) -> RawReading {
        RawReading {
            heart_rate: 72.0,
            spo2: 98.0,
            temperature: 36.6,
            timestamp_secs: ts,
        }
    }

    fn client_for(addr: SocketAddr, path: &str) -> HttpVitalsClient {
        let base = Url::parse(&format!("http://{}{}", addr, path)).unwrap();
        HttpVitalsClient::new(base, Duration::from_secs(2)).unwrap()
    }

    /// Serves a fake backend on an ephemeral port.
    fn serve_backend() -> SocketAddr {
        let devices = warp::path::end().map(|| warp::reply::json(&serde_json::json!(["A1", 2])));
        let readings = warp::path!(String).map(|id: String| {
            let now = now_secs();
            let body = match id.as_str() {
                "A1" => serde_json::json!([
                    { "hr": 70, "spo2": 97, "temp": 36.5, "timestamp": now - 1200.0 },
                    { "hr": 80, "spo2": 98, "temp": 36.6, "timestamp": now - 5.0 },
                    { "hr": 90, "spo2": 99, "temp": 36.7, "timestamp": now - 1.0 },
                ]),
                "space id" | "space%20id" => serde_json::json!([
                    { "hr": 60, "spo2": 95, "temp": 36.0, "timestamp": now },
                ]),
                "garbage" => serde_json::json!({ "unexpected": true }),
                _ => serde_json::json!([]),
            };
            warp::reply::json(&body)
        });
        let (addr, server) =
            warp::serve(devices.or(readings)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    #[test]
    fn test_window_filter_keeps_recent_in_order() {
        let now = 10_000.0;
        let readings = vec![
            reading(now - 10.0),
            reading(now - 601.0),
            reading(now - 600.0),
            reading(now - 30.0),
        ];
        let kept = readings_within_window(readings, now);
        let ts: Vec<f64> = kept.iter().map(|r| r.timestamp_secs).collect();
        assert_eq!(ts, vec![now - 10.0, now - 600.0, now - 30.0]);
    }

    #[test]
    fn test_endpoint_building() {
        let client = HttpVitalsClient::new(
            Url::parse("http://localhost:8080/api/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.endpoint("").unwrap().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            client.endpoint("B2").unwrap().as_str(),
            "http://localhost:8080/api/B2"
        );

        let root = HttpVitalsClient::new(
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(root.endpoint("").unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(
            root.endpoint("a b").unwrap().as_str(),
            "http://localhost:8080/a%20b"
        );
    }

    #[tokio::test]
    async fn test_list_devices() {
        let addr = serve_backend();
        let client = client_for(addr, "/");
        assert_eq!(
            client.list_devices().await,
            vec![DeviceId::new("A1"), DeviceId::new("2")]
        );
    }

    #[tokio::test]
    async fn test_get_readings_filters_window() {
        let addr = serve_backend();
        let client = client_for(addr, "/");
        let readings = client.get_readings(&DeviceId::new("A1")).await;
        let hr: Vec<f64> = readings.iter().map(|r| r.heart_rate).collect();
        assert_eq!(hr, vec![80.0, 90.0]);
    }

    #[tokio::test]
    async fn test_get_readings_encodes_id() {
        let addr = serve_backend();
        let client = client_for(addr, "/");
        let readings = client.get_readings(&DeviceId::new("space id")).await;
        assert_eq!(readings.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_empty() {
        let addr = serve_backend();
        let client = client_for(addr, "/");
        assert!(client.get_readings(&DeviceId::new("garbage")).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_empty() {
        let failing = warp::any().map(|| {
            warp::reply::with_status("backend down", StatusCode::INTERNAL_SERVER_ERROR)
        });
        let (addr, server) = warp::serve(failing).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let client = client_for(addr, "/");
        assert!(client.list_devices().await.is_empty());
        assert!(client.get_readings(&DeviceId::new("A1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_empty() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = client_for(addr, "/");
        assert!(client.list_devices().await.is_empty());
        assert!(client.get_readings(&DeviceId::new("A1")).await.is_empty());
    }
}
