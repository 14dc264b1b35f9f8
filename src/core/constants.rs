use egui::Color32;

/// Readings older than this (relative to fetch time) are dropped by the API client.
pub const READING_WINDOW_SECS: f64 = 600.0;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_PIXELS_PER_POINT: f32 = 1.5;

/// Alert tone parameters.
pub const ALERT_TONE_FREQUENCY_HZ: f32 = 440.0;
pub const ALERT_TONE_AMPLITUDE: f32 = 0.1;
pub const ALERT_TONE_DURATION_MS: u64 = 200;

pub const ALERT_COLOR: Color32 = Color32::from_rgb(255, 99, 132);
pub const NORMAL_COLOR: Color32 = Color32::from_rgb(75, 192, 192);
// rgba(255, 99, 132, 0.5), premultiplied
pub const BOUNDARY_COLOR: Color32 = Color32::from_rgba_premultiplied(128, 50, 66, 128);
