//! Controller Module
//!
//! This module defines the traits at the seams between the application
//! controller and its collaborators: the vitals backend, the alert output,
//! and the polling components.
use crate::model::{
    threshold::BoundaryEdge,
    vitals::{DeviceId, Metric, RawReading},
};
use anyhow::Result;
use async_trait::async_trait;

use super::model::MonitorModelApi;

/// VitalsApi trait
///
/// Read-only access to the vitals backend. Implementations never fail: any
/// transport or decoding problem is logged and reported as an empty result.
#[async_trait]
pub trait VitalsApi: Send + Sync {
    /// Identifiers of all connected devices, in server order.
    async fn list_devices(&self) -> Vec<DeviceId>;

    /// Readings of `device` from the last ten minutes, in server order.
    async fn get_readings(&self, device: &DeviceId) -> Vec<RawReading>;
}

/// AlertApi trait
///
/// Fire-and-forget alert output. Every call produces an independent alert.
pub trait AlertApi: Send + Sync {
    fn emit(&self);
}

/// PollingApi trait
///
/// Start and stop the periodic refresh of a component.
pub trait PollingApi {
    /// Fetch immediately, then once per poll interval.
    fn start_polling(&mut self);
    /// Cancel the timer and discard responses still in flight.
    fn stop_polling(&mut self);
    fn is_polling(&self) -> bool;
}

/// MonitorApi trait
///
/// Extends `MonitorModelApi` with the mutations a user can trigger on the
/// patient monitor.
#[async_trait]
pub trait MonitorApi: MonitorModelApi {
    /// Replace one edge of the boundaries of `metric`.
    ///
    /// Non-finite values are rejected and leave the boundaries unchanged.
    async fn set_boundary(&mut self, metric: Metric, edge: BoundaryEdge, value: f64)
        -> Result<()>;
}
