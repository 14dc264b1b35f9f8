//! Application Controller
//!
//! This module defines the main controller responsible for orchestrating the application.
//! It owns the device list and patient monitor components, switches between them
//! on navigation events and forwards monitor events to the active monitor.

use crate::{
    api::{
        controller::{AlertApi, PollingApi, VitalsApi},
        view::RepaintHook,
    },
    components::{device_list::DeviceListComponent, monitor::MonitorComponent},
    core::events::{AppEvent, NavigationEvent},
    view::manager::{ViewManager, ViewState},
};

use anyhow::Result;
use log::{error, info, trace, warn};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::{self, error::RecvError, Sender};

/// Main application controller.
///
/// Exactly one component polls at any time: the device list while it is shown,
/// or the monitor of the selected device.
pub struct AppController<C: VitalsApi + 'static, A: AlertApi + 'static> {
    view_tx: Sender<ViewState>,
    event_bus: Sender<AppEvent>,
    client: Arc<C>,
    alert: Arc<A>,
    poll_interval: Duration,
    repaint: RepaintHook,
    device_list: DeviceListComponent<C>,
    monitor: Option<MonitorComponent<C, A>>,
}

impl<C: VitalsApi + 'static, A: AlertApi + 'static> AppController<C, A> {
    /// Creates a new `AppController`.
    ///
    /// # Arguments
    /// - `client`: The vitals backend.
    /// - `alert`: The alert output shared by all monitors.
    /// - `poll_interval`: Period of the device list and readings polls.
    /// - `repaint`: Asks the UI for a new frame.
    /// - `event_bus`: The event bus for broadcasting application events.
    pub fn new(
        client: C,
        alert: A,
        poll_interval: Duration,
        repaint: RepaintHook,
        event_bus: Sender<AppEvent>,
    ) -> Self {
        trace!("Initializing AppController.");
        let (vtx, _) = broadcast::channel(16);
        let client = Arc::new(client);
        Self {
            view_tx: vtx,
            event_bus,
            device_list: DeviceListComponent::new(client.clone(), poll_interval, repaint.clone()),
            client,
            alert: Arc::new(alert),
            poll_interval,
            repaint,
            monitor: None,
        }
    }

    /// Returns a view manager following this controller's view state.
    pub fn get_viewmanager(&self) -> ViewManager {
        ViewManager::new(self.view_tx.subscribe(), self.event_bus.clone())
    }

    async fn handle_navigation(&mut self, event: NavigationEvent) -> Result<()> {
        match event {
            NavigationEvent::ShowDeviceList => {
                // dropping the monitor stops its poll task
                self.monitor = None;
                self.device_list.start_polling();
                self.view_tx
                    .send(ViewState::DeviceList(self.device_list.get_model()))?;
            }
            NavigationEvent::OpenMonitor(device) => {
                info!("opening monitor for device {}", device);
                self.device_list.stop_polling();
                let mut monitor = MonitorComponent::new(
                    device,
                    self.client.clone(),
                    self.alert.clone(),
                    self.poll_interval,
                    self.repaint.clone(),
                );
                monitor.start_polling();
                let model = monitor.get_model();
                self.monitor = Some(monitor);
                self.view_tx.send(ViewState::Monitor(model))?;
            }
        }
        Ok(())
    }

    /// Dispatches application-level events to the appropriate components.
    async fn dispatch_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Navigation(event) => self.handle_navigation(event).await,
            AppEvent::Monitor(event) => {
                if let Some(monitor) = self.monitor.as_ref() {
                    let data = monitor.get_data();
                    let mut lck = data.write().await;
                    event.forward_to(&mut *lck).await
                } else {
                    trace!("no active monitor, dropping {:?}", event);
                    Ok(())
                }
            }
        }
    }

    /// Asynchronous event handler.
    ///
    /// Shows the device list, then processes application-level events until the
    /// event bus is closed.
    pub async fn event_handler(mut self) {
        let mut event_ch_rx = self.event_bus.subscribe();
        while let Err(e) = self
            .handle_navigation(NavigationEvent::ShowDeviceList)
            .await
        {
            error!(
                "could not send initial viewstate, trying again in 5 sec: {}",
                e
            );
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        loop {
            match event_ch_rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch_event(event).await {
                        error!(
                            "error during UiEvent handling: {}\nbacktrace:\n{}",
                            e,
                            e.backtrace()
                        );
                    }
                    (self.repaint)();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event handler lagged behind, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        trace!("event bus closed, AppController stopped");
    }
}
