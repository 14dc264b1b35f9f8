//! This module defines the read only API for interacting with the models.
//! Views only ever see these traits.
use std::{fmt::Debug, sync::Arc};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::model::{
    threshold::{Boundaries, BoundaryPair},
    vitals::{DeviceId, Metric, Series, SeriesSet},
};

/// `DeviceListModelApi` trait.
///
/// Read access to the most recently fetched list of devices.
pub trait DeviceListModelApi: Debug + Send + Sync {
    /// Devices in server order.
    fn get_devices(&self) -> &[DeviceId];

    /// Time of the last accepted poll, `None` before the first one.
    fn get_updated_at(&self) -> Option<OffsetDateTime>;
}

/// `MonitorModelApi` trait.
///
/// Read access to the state of one patient monitor.
pub trait MonitorModelApi: Debug + Send + Sync {
    fn get_device_id(&self) -> &DeviceId;

    fn get_boundaries(&self) -> &Boundaries;

    fn get_boundary(&self, metric: Metric) -> BoundaryPair {
        self.get_boundaries().get(metric)
    }

    /// The current series of all metrics.
    ///
    /// The handle is only replaced when a poll delivers data that differs by
    /// value, so pointer identity can be used to skip redundant work.
    fn get_series_set(&self) -> &Arc<SeriesSet>;

    fn get_series(&self, metric: Metric) -> &Arc<Series> {
        self.get_series_set().get(metric)
    }

    /// Number of times the series handle has been replaced.
    fn get_revision(&self) -> u64;
}

pub type ModelHandle<T> = Arc<RwLock<T>>;
