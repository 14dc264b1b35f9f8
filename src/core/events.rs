//! Core Events
//!
//! This module defines the events exchanged between views and the application
//! controller. Views publish them on the event bus, the controller forwards them
//! to the component in charge.

use anyhow::Result;

use crate::{
    api::controller::MonitorApi,
    model::{
        threshold::BoundaryEdge,
        vitals::{DeviceId, Metric},
    },
};

/// Navigation between the device list and a patient monitor.
#[derive(Clone, Debug, PartialEq)]
pub enum NavigationEvent {
    /// Show the list of connected devices.
    ShowDeviceList,
    /// Open the monitor of a single device.
    OpenMonitor(DeviceId),
}

/// Events mutating the active patient monitor.
#[derive(Clone, Debug, PartialEq)]
pub enum MonitorEvent {
    /// Replace one edge of a metric's alert boundaries.
    SetBoundary {
        metric: Metric,
        edge: BoundaryEdge,
        value: f64,
    },
}

impl MonitorEvent {
    pub async fn forward_to<M: MonitorApi + ?Sized>(self, target: &mut M) -> Result<()> {
        match self {
            MonitorEvent::SetBoundary {
                metric,
                edge,
                value,
            } => target.set_boundary(metric, edge, value).await,
        }
    }
}

/// Enumeration of all application-level events.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Navigation(NavigationEvent),
    Monitor(MonitorEvent),
}
