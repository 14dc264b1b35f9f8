//! Patient Monitor View
//!
//! Shows the three vital sign charts of one device. Each chart card has text
//! inputs for its lower and upper alert boundary.
use eframe::egui;

use crate::{
    api::{
        model::{ModelHandle, MonitorModelApi},
        view::ViewApi,
    },
    core::events::{AppEvent, MonitorEvent, NavigationEvent},
    model::{
        threshold::{BoundaryEdge, BoundaryPair},
        vitals::{Metric, Series},
    },
};

use super::chart::SeriesChart;

/// Parses a boundary typed by the user.
///
/// Accepts a finite decimal number, surrounding whitespace is ignored.
pub fn parse_boundary_input(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn edge_label(edge: BoundaryEdge) -> &'static str {
    match edge {
        BoundaryEdge::Lower => "Lower:",
        BoundaryEdge::Upper => "Upper:",
    }
}

/// Text buffer of one boundary input.
#[derive(Debug, Default)]
struct BoundaryInput {
    text: String,
}

impl BoundaryInput {
    /// The `SetBoundary` event for the edited text, if it parses to a new value.
    fn on_edit(&self, metric: Metric, edge: BoundaryEdge, current: f64) -> Option<AppEvent> {
        parse_boundary_input(&self.text)
            .filter(|value| *value != current)
            .map(|value| AppEvent::Monitor(MonitorEvent::SetBoundary { metric, edge, value }))
    }

    fn resync(&mut self, current: f64) {
        self.text = current.to_string();
    }

    fn show<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        ui: &mut egui::Ui,
        publish: &F,
        metric: Metric,
        edge: BoundaryEdge,
        current: f64,
    ) {
        ui.label(edge_label(edge));
        let response = ui.add(egui::TextEdit::singleline(&mut self.text).desired_width(64.0));
        if response.changed() {
            if let Some(event) = self.on_edit(metric, edge, current) {
                publish(event);
            }
        }
        if !response.has_focus() {
            self.resync(current);
        }
    }
}

/// One chart with its boundary inputs.
struct MetricCard {
    metric: Metric,
    chart: SeriesChart,
    lower: BoundaryInput,
    upper: BoundaryInput,
}

impl MetricCard {
    fn new(metric: Metric) -> Self {
        Self {
            metric,
            chart: SeriesChart::new(metric),
            lower: BoundaryInput::default(),
            upper: BoundaryInput::default(),
        }
    }

    fn show<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        ui: &mut egui::Ui,
        publish: &F,
        series: &std::sync::Arc<Series>,
        bounds: BoundaryPair,
    ) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.strong(self.metric.title());
                ui.separator();
                if series.is_empty() {
                    ui.weak("no data");
                } else if let Some(latest) = series.last() {
                    ui.label(format!("Latest: {} {}", latest.value, self.metric.unit()));
                    ui.weak(format!("({} samples)", series.len()));
                }
            });
            ui.horizontal(|ui| {
                let metric = self.metric;
                for (input, edge) in [
                    (&mut self.lower, BoundaryEdge::Lower),
                    (&mut self.upper, BoundaryEdge::Upper),
                ] {
                    input.show(ui, publish, metric, edge, bounds.get(edge));
                }
            });
            self.chart.show(ui, series, bounds);
        });
    }
}

pub struct MonitorView {
    model: ModelHandle<dyn MonitorModelApi>,
    cards: Vec<MetricCard>,
}

impl MonitorView {
    pub fn new(model: ModelHandle<dyn MonitorModelApi>) -> Self {
        Self {
            model,
            cards: Metric::ALL.into_iter().map(MetricCard::new).collect(),
        }
    }
}

impl ViewApi for MonitorView {
    fn render<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        publish: &F,
        ctx: &egui::Context,
    ) -> Result<(), String> {
        let model = self.model.blocking_read();
        egui::TopBottomPanel::top("monitor header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("< Devices").clicked() {
                    publish(AppEvent::Navigation(NavigationEvent::ShowDeviceList));
                }
                ui.heading(format!("Patient Monitoring - {}", model.get_device_id()));
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                for card in self.cards.iter_mut() {
                    card.show(
                        ui,
                        publish,
                        model.get_series(card.metric),
                        model.get_boundary(card.metric),
                    );
                    ui.add_space(8.0);
                }
            });
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary_input() {
        assert_eq!(parse_boundary_input("130"), Some(130.0));
        assert_eq!(parse_boundary_input(" 36.5 "), Some(36.5));
        assert_eq!(parse_boundary_input("-1e1"), Some(-10.0));
        assert_eq!(parse_boundary_input(""), None);
        assert_eq!(parse_boundary_input("12abc"), None);
        assert_eq!(parse_boundary_input("NaN"), None);
        assert_eq!(parse_boundary_input("inf"), None);
    }

    #[test]
    fn test_edit_publishes_new_value() {
        let input = BoundaryInput {
            text: "130".to_owned(),
        };
        assert_eq!(
            input.on_edit(Metric::HeartRate, BoundaryEdge::Upper, 120.0),
            Some(AppEvent::Monitor(MonitorEvent::SetBoundary {
                metric: Metric::HeartRate,
                edge: BoundaryEdge::Upper,
                value: 130.0,
            }))
        );
    }

    #[test]
    fn test_edit_ignores_rejected_or_unchanged_text() {
        let garbage = BoundaryInput {
            text: "abc".to_owned(),
        };
        assert_eq!(garbage.on_edit(Metric::Spo2, BoundaryEdge::Lower, 90.0), None);
        let same = BoundaryInput {
            text: "90".to_owned(),
        };
        assert_eq!(same.on_edit(Metric::Spo2, BoundaryEdge::Lower, 90.0), None);
    }

    #[test]
    fn test_resync_shows_model_value() {
        let mut input = BoundaryInput {
            text: "12a".to_owned(),
        };
        input.resync(37.5);
        assert_eq!(input.text, "37.5");
        input.resync(120.0);
        assert_eq!(input.text, "120");
    }
}
