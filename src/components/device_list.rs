//! Device List Component
//!
//! Keeps the list of connected devices fresh by polling the vitals backend.
use std::{sync::Arc, time::Duration};

use log::{debug, trace};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    api::{
        controller::{PollingApi, VitalsApi},
        model::{DeviceListModelApi, ModelHandle},
        view::RepaintHook,
    },
    components::poller::{PollTask, RequestSequence, RequestTicket},
    model::vitals::DeviceId,
};

/// The most recently accepted device list.
#[derive(Debug, Default)]
pub struct DeviceListData {
    devices: Vec<DeviceId>,
    updated_at: Option<OffsetDateTime>,
}

impl DeviceListData {
    /// Replaces the device set wholesale.
    pub fn replace_devices(&mut self, devices: Vec<DeviceId>) {
        self.devices = devices;
        self.updated_at = Some(OffsetDateTime::now_utc());
    }
}

impl DeviceListModelApi for DeviceListData {
    fn get_devices(&self) -> &[DeviceId] {
        &self.devices
    }

    fn get_updated_at(&self) -> Option<OffsetDateTime> {
        self.updated_at
    }
}

/// Polls `VitalsApi::list_devices` while the device list is shown.
pub struct DeviceListComponent<C: VitalsApi + 'static> {
    client: Arc<C>,
    data: Arc<RwLock<DeviceListData>>,
    period: Duration,
    sequence: RequestSequence,
    poll_task: Option<PollTask>,
    repaint: RepaintHook,
}

impl<C: VitalsApi + 'static> DeviceListComponent<C> {
    pub fn new(client: Arc<C>, period: Duration, repaint: RepaintHook) -> Self {
        Self {
            client,
            data: Arc::new(RwLock::new(DeviceListData::default())),
            period,
            sequence: RequestSequence::default(),
            poll_task: None,
            repaint,
        }
    }

    pub fn get_model(&self) -> ModelHandle<dyn DeviceListModelApi> {
        self.data.clone()
    }

    /// Handles one poll: fetch, then replace the device set unless a newer
    /// request has been issued meanwhile.
    pub async fn refresh(
        client: Arc<C>,
        data: Arc<RwLock<DeviceListData>>,
        ticket: RequestTicket,
        repaint: RepaintHook,
    ) {
        let devices = client.list_devices().await;
        let mut lck = data.write().await;
        if !ticket.try_apply() {
            debug!("discarding stale device list response #{}", ticket.seq());
            return;
        }
        lck.replace_devices(devices);
        drop(lck);
        repaint();
    }
}

impl<C: VitalsApi + 'static> PollingApi for DeviceListComponent<C> {
    fn start_polling(&mut self) {
        if self.poll_task.is_some() {
            trace!("device list polling already active");
            return;
        }
        let client = self.client.clone();
        let data = self.data.clone();
        let repaint = self.repaint.clone();
        self.poll_task = Some(PollTask::spawn(
            "device list",
            self.period,
            self.sequence.clone(),
            move |ticket| Self::refresh(client.clone(), data.clone(), ticket, repaint.clone()),
        ));
    }

    fn stop_polling(&mut self) {
        // dropping the task aborts the timer and invalidates in-flight requests
        self.poll_task = None;
    }

    fn is_polling(&self) -> bool {
        self.poll_task.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vitals::RawReading;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Vitals {}
        #[async_trait]
        impl VitalsApi for Vitals {
            async fn list_devices(&self) -> Vec<DeviceId>;
            async fn get_readings(&self, device: &DeviceId) -> Vec<RawReading>;
        }
    }

    fn no_repaint() -> RepaintHook {
        Arc::new(|| {})
    }

    fn ids(list: &[&str]) -> Vec<DeviceId> {
        list.iter().map(|id| DeviceId::new(*id)).collect()
    }

    #[tokio::test]
    async fn test_refresh_replaces_devices() {
        let mut client = MockVitals::new();
        client
            .expect_list_devices()
            .times(1)
            .returning(|| ids(&["A1", "B2"]));
        let component = DeviceListComponent::new(
            Arc::new(client),
            Duration::from_secs(1),
            no_repaint(),
        );
        let ticket = component.sequence.issue();
        DeviceListComponent::refresh(
            component.client.clone(),
            component.data.clone(),
            ticket,
            no_repaint(),
        )
        .await;
        let model = component.get_model();
        let lck = model.read().await;
        assert_eq!(lck.get_devices(), ids(&["A1", "B2"]).as_slice());
        assert!(lck.get_updated_at().is_some());
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let mut client = MockVitals::new();
        client
            .expect_list_devices()
            .times(1)
            .returning(|| ids(&["NEW"]));
        client
            .expect_list_devices()
            .times(1)
            .returning(|| ids(&["OLD"]));
        let component = DeviceListComponent::new(
            Arc::new(client),
            Duration::from_secs(1),
            no_repaint(),
        );
        let stale = component.sequence.issue();
        let newer = component.sequence.issue();
        let repaints = Arc::new(AtomicUsize::new(0));
        let r = repaints.clone();
        let counting: RepaintHook = Arc::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        DeviceListComponent::refresh(
            component.client.clone(),
            component.data.clone(),
            newer,
            counting.clone(),
        )
        .await;
        DeviceListComponent::refresh(
            component.client.clone(),
            component.data.clone(),
            stale,
            counting,
        )
        .await;
        assert_eq!(
            component.data.read().await.get_devices(),
            ids(&["NEW"]).as_slice()
        );
        assert_eq!(repaints.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_response_still_applies() {
        let mut client = MockVitals::new();
        client.expect_list_devices().returning(|| ids(&["A1"]));
        let component = DeviceListComponent::new(
            Arc::new(client),
            Duration::from_secs(1),
            no_repaint(),
        );
        // a newer poll is already in flight when the older one lands
        let older = component.sequence.issue();
        let _in_flight = component.sequence.issue();
        DeviceListComponent::refresh(
            component.client.clone(),
            component.data.clone(),
            older,
            no_repaint(),
        )
        .await;
        assert_eq!(
            component.data.read().await.get_devices(),
            ids(&["A1"]).as_slice()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_lifecycle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let mut client = MockVitals::new();
        client.expect_list_devices().returning(move || {
            c.fetch_add(1, Ordering::SeqCst);
            ids(&["A1"])
        });
        let mut component = DeviceListComponent::new(
            Arc::new(client),
            Duration::from_secs(1),
            no_repaint(),
        );
        component.start_polling();
        assert!(component.is_polling());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            component.data.read().await.get_devices(),
            ids(&["A1"]).as_slice()
        );

        component.stop_polling();
        assert!(!component.is_polling());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_backend_gives_empty_list() {
        let mut client = MockVitals::new();
        client.expect_list_devices().returning(Vec::new);
        let component = DeviceListComponent::new(
            Arc::new(client),
            Duration::from_secs(1),
            no_repaint(),
        );
        let ticket = component.sequence.issue();
        DeviceListComponent::refresh(
            component.client.clone(),
            component.data.clone(),
            ticket,
            no_repaint(),
        )
        .await;
        assert!(component.data.read().await.get_devices().is_empty());
    }
}
