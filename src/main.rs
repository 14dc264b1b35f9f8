//! Vitals Dashboard
//!
//! Live dashboard for patient monitoring devices. It polls a vitals service for
//! the connected devices and their recent readings, charts heart rate, SpO2 and
//! temperature, and sounds an alert when the latest reading leaves the
//! configured boundaries.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::NativeOptions;
use env_logger::Env;
use log::info;
use tokio::{runtime::Runtime, sync::broadcast};

use crate::{
    api::view::RepaintHook,
    components::{alert::ToneAlert, application::AppController},
    core::config::Settings,
};

/// Traits at the seams between controller, models and views.
mod api {
    pub mod controller;
    pub mod model;
    pub mod view;
}

/// Components implementing the application logic.
mod components {
    /// Audible alert output.
    pub mod alert;
    /// HTTP client of the vitals service.
    pub mod api_client;
    /// Entry point controller orchestrating the components.
    pub mod application;
    /// Polling of the connected devices.
    pub mod device_list;
    /// In-process simulated vitals service.
    #[cfg(feature = "mock")]
    pub mod mock_client;
    /// Polling and alerting of one patient monitor.
    pub mod monitor;
    /// Cancellable periodic tasks and request sequencing.
    pub mod poller;
}

/// Core utilities used throughout the application.
mod core {
    /// Command line and environment settings.
    pub mod config;
    /// Application-wide constants.
    pub mod constants;
    /// Event system for inter-module communication.
    pub mod events;
}

/// Data models representing the application's domain.
mod model {
    /// Alert boundaries and their evaluation.
    pub mod threshold;
    /// Readings and chart series.
    pub mod vitals;
}

/// UI-related components for the application.
mod view {
    pub mod chart;
    pub mod device_list;
    /// View manager for coordinating multiple views.
    pub mod manager;
    pub mod monitor;
}

/// Main entry point of the application.
///
/// Initializes logging, sets up the asynchronous runtime, and starts the
/// application with the eframe framework.
fn main() -> Result<()> {
    env_logger::Builder::from_env(
        Env::default()
            .filter_or("VITALS_LOG", "info")
            .write_style_or("VITALS_LOG_STYLE", "always"),
    )
    .init();

    let settings = Settings::parse();

    // Create a new Tokio runtime for asynchronous operations.
    let rt = Runtime::new()?;
    let _enter = rt.enter();

    #[cfg(feature = "mock")]
    let client = {
        info!("using simulated devices");
        crate::components::mock_client::MockVitalsClient::default()
    };
    #[cfg(not(feature = "mock"))]
    let client = {
        let url = settings.api_url()?;
        info!("using vitals service at {}", url);
        crate::components::api_client::HttpVitalsClient::new(url, settings.request_timeout())?
    };

    let alert = ToneAlert::default();
    let (event_bus, _) = broadcast::channel(64);

    eframe::run_native(
        "Vitals-rs",
        NativeOptions::default(),
        Box::new(move |cc| {
            let egui_ctx = cc.egui_ctx.clone();
            let repaint: RepaintHook = Arc::new(move || egui_ctx.request_repaint());
            let app_controller = AppController::new(
                client,
                alert,
                settings.poll_interval(),
                repaint,
                event_bus,
            );
            let view_manager = app_controller
                .get_viewmanager()
                .with_pixels_per_point(settings.pixels_per_point);
            tokio::spawn(app_controller.event_handler());
            Ok(Box::new(view_manager))
        }),
    )
    .map_err(|e| anyhow!("Failed to start eframe application: {}", e))
}
