//! View Manager
//!
//! Follows the `ViewState` broadcast of the application controller and renders
//! the active view every frame.
use std::sync::Arc;

use eframe::App;
use log::error;
use tokio::{
    sync::{
        broadcast::{Receiver, Sender},
        RwLock,
    },
    task::JoinHandle,
};

use crate::{
    api::{
        model::{DeviceListModelApi, ModelHandle, MonitorModelApi},
        view::ViewApi,
    },
    core::{constants::DEFAULT_PIXELS_PER_POINT, events::AppEvent},
};

use super::{device_list::DeviceListView, monitor::MonitorView};

#[derive(Clone, Debug)]
pub enum ViewState {
    DeviceList(ModelHandle<dyn DeviceListModelApi>),
    Monitor(ModelHandle<dyn MonitorModelApi>),
}

enum View {
    NoView,
    DeviceList(DeviceListView),
    Monitor(MonitorView),
}

impl ViewApi for View {
    fn render<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        publish: &F,
        ctx: &egui::Context,
    ) -> Result<(), String> {
        match self {
            Self::DeviceList(v) => v.render(publish, ctx),
            Self::Monitor(v) => v.render(publish, ctx),
            Self::NoView => Ok(()),
        }
    }
}

impl From<ViewState> for View {
    fn from(val: ViewState) -> Self {
        match val {
            ViewState::DeviceList(model) => View::DeviceList(DeviceListView::new(model)),
            ViewState::Monitor(model) => View::Monitor(MonitorView::new(model)),
        }
    }
}

pub struct ViewManager {
    e_tx: Sender<AppEvent>,
    active_view: Arc<RwLock<View>>,
    pixels_per_point: f32,
    _task_handle: JoinHandle<()>,
}

impl ViewManager {
    pub fn new(mut v_rx: Receiver<ViewState>, e_tx: Sender<AppEvent>) -> Self {
        let active_view = Arc::new(RwLock::new(View::NoView));
        let task_view = active_view.clone();
        let _task_handle = tokio::spawn(async move {
            while let Ok(s) = v_rx.recv().await {
                *task_view.write().await = s.into();
            }
        });

        Self {
            e_tx,
            active_view,
            pixels_per_point: DEFAULT_PIXELS_PER_POINT,
            _task_handle,
        }
    }

    pub fn with_pixels_per_point(mut self, pixels_per_point: f32) -> Self {
        self.pixels_per_point = pixels_per_point;
        self
    }

    fn publish(&self, event: AppEvent) {
        if let Err(e) = self.e_tx.send(event) {
            error!("View failed to send event: {}", e)
        }
    }
}

impl App for ViewManager {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.pixels_per_point);
        if let Err(e) = self
            .active_view
            .blocking_write()
            .render(&|e| self.publish(e), ctx)
        {
            error!("view failed to render: {}", e)
        }
    }
}
