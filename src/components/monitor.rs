//! Patient Monitor Component
//!
//! Polls the readings of one device, keeps the chart series and alert boundaries,
//! and raises an audible alert when the latest reading leaves its boundaries.
use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tokio::sync::RwLock;

use crate::{
    api::{
        controller::{AlertApi, MonitorApi, PollingApi, VitalsApi},
        model::{ModelHandle, MonitorModelApi},
        view::RepaintHook,
    },
    components::poller::{PollTask, RequestSequence, RequestTicket},
    model::{
        threshold::{Boundaries, BoundaryEdge},
        vitals::{DeviceId, Metric, RawReading, SeriesSet},
    },
};

/// State of one patient monitor.
#[derive(Debug)]
pub struct MonitorData {
    device: DeviceId,
    boundaries: Boundaries,
    series: Arc<SeriesSet>,
    revision: u64,
}

impl MonitorData {
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            boundaries: Boundaries::default(),
            series: Arc::new(SeriesSet::default()),
            revision: 0,
        }
    }

    /// Projects `readings` into chart series.
    ///
    /// The series handle is only replaced if the projection differs by value
    /// from the current one. Returns whether it was replaced.
    pub fn apply_readings(&mut self, readings: &[RawReading]) -> bool {
        let series = SeriesSet::from_readings(readings);
        if *self.series == series {
            return false;
        }
        self.series = Arc::new(series);
        self.revision += 1;
        true
    }

    /// Metrics of the most recent reading that violate the current boundaries.
    ///
    /// Readings may arrive in any order. Of several readings sharing the newest
    /// timestamp, the last one received wins.
    pub fn latest_violations(&self, readings: &[RawReading]) -> Vec<Metric> {
        readings
            .iter()
            .max_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs))
            .map(|latest| self.boundaries.violations(latest))
            .unwrap_or_default()
    }
}

impl MonitorModelApi for MonitorData {
    fn get_device_id(&self) -> &DeviceId {
        &self.device
    }

    fn get_boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    fn get_series_set(&self) -> &Arc<SeriesSet> {
        &self.series
    }

    fn get_revision(&self) -> u64 {
        self.revision
    }
}

#[async_trait]
impl MonitorApi for MonitorData {
    async fn set_boundary(
        &mut self,
        metric: Metric,
        edge: BoundaryEdge,
        value: f64,
    ) -> Result<()> {
        let pair = self
            .boundaries
            .get(metric)
            .with_edge(edge, value)
            .ok_or_else(|| anyhow!("rejected non-finite boundary {} for {:?}", value, metric))?;
        self.boundaries = self.boundaries.with_pair(metric, pair);
        info!(
            "device {}: {} {:?} boundary set to {}",
            self.device,
            metric.title(),
            edge,
            value
        );
        Ok(())
    }
}

/// Polls `VitalsApi::get_readings` for one device while its monitor is shown.
pub struct MonitorComponent<C: VitalsApi + 'static, A: AlertApi + 'static> {
    client: Arc<C>,
    alert: Arc<A>,
    data: Arc<RwLock<MonitorData>>,
    period: Duration,
    sequence: RequestSequence,
    poll_task: Option<PollTask>,
    repaint: RepaintHook,
}

impl<C: VitalsApi + 'static, A: AlertApi + 'static> MonitorComponent<C, A> {
    pub fn new(
        device: DeviceId,
        client: Arc<C>,
        alert: Arc<A>,
        period: Duration,
        repaint: RepaintHook,
    ) -> Self {
        trace!("creating monitor for device {}", device);
        Self {
            client,
            alert,
            data: Arc::new(RwLock::new(MonitorData::new(device))),
            period,
            sequence: RequestSequence::default(),
            poll_task: None,
            repaint,
        }
    }

    pub fn get_model(&self) -> ModelHandle<dyn MonitorModelApi> {
        self.data.clone()
    }

    /// Mutable access for forwarding `MonitorEvent`s.
    pub fn get_data(&self) -> Arc<RwLock<MonitorData>> {
        self.data.clone()
    }

    /// Handles one poll cycle: fetch, apply unless stale, evaluate the latest
    /// reading and alert at most once.
    pub async fn refresh(
        client: Arc<C>,
        alert: Arc<A>,
        data: Arc<RwLock<MonitorData>>,
        ticket: RequestTicket,
        repaint: RepaintHook,
    ) {
        let device = data.read().await.get_device_id().clone();
        let readings = client.get_readings(&device).await;

        let mut lck = data.write().await;
        if !ticket.try_apply() {
            debug!(
                "discarding stale readings response #{} for device {}",
                ticket.seq(),
                device
            );
            return;
        }
        let replaced = lck.apply_readings(&readings);
        let violations = lck.latest_violations(&readings);
        drop(lck);

        if !violations.is_empty() {
            warn!("device {}: {:?} out of range", device, violations);
            alert.emit();
        }
        if replaced {
            repaint();
        }
    }
}

impl<C: VitalsApi + 'static, A: AlertApi + 'static> PollingApi for MonitorComponent<C, A> {
    fn start_polling(&mut self) {
        if self.poll_task.is_some() {
            trace!("monitor polling already active");
            return;
        }
        let client = self.client.clone();
        let alert = self.alert.clone();
        let data = self.data.clone();
        let repaint = self.repaint.clone();
        self.poll_task = Some(PollTask::spawn(
            "monitor",
            self.period,
            self.sequence.clone(),
            move |ticket| {
                Self::refresh(
                    client.clone(),
                    alert.clone(),
                    data.clone(),
                    ticket,
                    repaint.clone(),
                )
            },
        ));
    }

    fn stop_polling(&mut self) {
        self.poll_task = None;
    }

    fn is_polling(&self) -> bool {
        self.poll_task.is_some()
    }
}
