//! Device List View
//!
//! One button per connected device. Clicking it opens that device's monitor.
use eframe::egui;

use crate::{
    api::{
        model::{DeviceListModelApi, ModelHandle},
        view::ViewApi,
    },
    core::events::{AppEvent, NavigationEvent},
    model::vitals::time_label,
};

/// Button labels and the event each button publishes, in server order.
pub fn device_entries(model: &dyn DeviceListModelApi) -> Vec<(String, AppEvent)> {
    model
        .get_devices()
        .iter()
        .map(|device| {
            (
                format!("Patient {}", device),
                AppEvent::Navigation(NavigationEvent::OpenMonitor(device.clone())),
            )
        })
        .collect()
}

pub struct DeviceListView {
    model: ModelHandle<dyn DeviceListModelApi>,
}

impl DeviceListView {
    pub fn new(model: ModelHandle<dyn DeviceListModelApi>) -> Self {
        Self { model }
    }
}

impl ViewApi for DeviceListView {
    fn render<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        publish: &F,
        ctx: &egui::Context,
    ) -> Result<(), String> {
        let model = self.model.blocking_read();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Connected Devices");
            if let Some(updated_at) = model.get_updated_at() {
                let millis = updated_at.unix_timestamp_nanos() as f64 / 1e6;
                ui.weak(format!("updated {}", time_label(millis)));
            }
            ui.separator();
            let entries = device_entries(&*model);
            if entries.is_empty() {
                ui.weak("No devices connected");
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for (label, event) in entries {
                    if ui.button(label).clicked() {
                        publish(event);
                    }
                }
            });
        });
        Ok(())
    }
}
