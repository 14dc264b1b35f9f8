//! Runtime settings, parsed from the command line and the environment.

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use reqwest::Url;

use super::constants::{
    DEFAULT_BASE_URL, DEFAULT_PIXELS_PER_POINT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_MS,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "vitals-rs")]
#[command(about = "Live vital signs dashboard for connected patient monitors")]
pub struct Settings {
    /// Base URL of the vitals service
    #[arg(short, long, env = "VITALS_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Poll interval for the device list and readings, in milliseconds
    #[arg(
        short,
        long,
        env = "VITALS_POLL_INTERVAL_MS",
        default_value_t = DEFAULT_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(100..)
    )]
    pub poll_interval_ms: u64,

    /// HTTP request timeout, in milliseconds
    #[arg(long, env = "VITALS_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// UI scale factor
    #[arg(long, env = "VITALS_PIXELS_PER_POINT", default_value_t = DEFAULT_PIXELS_PER_POINT)]
    pub pixels_per_point: f32,
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parses the base url, it must be able to carry path segments.
    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(anyhow!("base url cannot carry a path: {}", self.base_url));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["vitals-rs"]).unwrap();
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.api_url().unwrap().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_flags() {
        let settings = Settings::try_parse_from([
            "vitals-rs",
            "--base-url",
            "http://10.0.0.2:9000/api",
            "--poll-interval-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(settings.poll_interval(), Duration::from_millis(250));
        assert_eq!(settings.api_url().unwrap().path(), "/api");
    }

    #[test]
    fn test_rejects_too_short_interval() {
        assert!(Settings::try_parse_from(["vitals-rs", "--poll-interval-ms", "10"]).is_err());
    }

    #[test]
    fn test_rejects_non_hierarchical_url() {
        let settings =
            Settings::try_parse_from(["vitals-rs", "--base-url", "mailto:nurse@example.org"])
                .unwrap();
        assert!(settings.api_url().is_err());
    }
}
