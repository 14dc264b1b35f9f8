//! Series Chart
//!
//! Draws one metric series as a line chart with its alert boundaries. The data
//! derived from a series is memoised, so frames caused by unrelated state do not
//! rebuild it.
use std::{ops::RangeInclusive, sync::Arc};

use eframe::egui;
use egui::Color32;
use egui_plot::{GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoint};

use crate::{
    core::constants::{ALERT_COLOR, BOUNDARY_COLOR, NORMAL_COLOR},
    model::{
        threshold::BoundaryPair,
        vitals::{time_label, Metric, Series},
    },
};

/// Render-ready form of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    /// `[unix seconds, value]`
    pub points: Vec<[f64; 2]>,
    pub labels: Vec<String>,
    pub violated: bool,
    pub color: Color32,
}

impl PreparedChart {
    fn new(series: &Series, bounds: BoundaryPair) -> Self {
        let points: Vec<[f64; 2]> = series
            .points()
            .iter()
            .map(|p| [p.timestamp_millis / 1000.0, p.value])
            .collect();
        let labels = series
            .points()
            .iter()
            .map(|p| time_label(p.timestamp_millis))
            .collect();
        let violated = series
            .points()
            .iter()
            .any(|p| bounds.is_violated_by(p.value));
        Self {
            points,
            labels,
            violated,
            color: if violated { ALERT_COLOR } else { NORMAL_COLOR },
        }
    }

    /// Time label of the point at `x_secs`, if there is one.
    pub fn label_at(&self, x_secs: f64) -> Option<&str> {
        self.points
            .binary_search_by(|p| p[0].total_cmp(&x_secs))
            .ok()
            .map(|idx| self.labels[idx].as_str())
    }
}

struct Cached {
    series: Arc<Series>,
    bounds: BoundaryPair,
    prepared: Arc<PreparedChart>,
}

/// Chart of a single metric.
pub struct SeriesChart {
    metric: Metric,
    cache: Option<Cached>,
}

impl SeriesChart {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            cache: None,
        }
    }

    /// Returns the prepared chart, rebuilding it only if the series handle or
    /// the boundaries changed since the last call.
    pub fn prepare(&mut self, series: &Arc<Series>, bounds: BoundaryPair) -> Arc<PreparedChart> {
        match &self.cache {
            Some(cached) if Arc::ptr_eq(&cached.series, series) && cached.bounds == bounds => {
                cached.prepared.clone()
            }
            _ => {
                let prepared = Arc::new(PreparedChart::new(series, bounds));
                self.cache = Some(Cached {
                    series: series.clone(),
                    bounds,
                    prepared: prepared.clone(),
                });
                prepared
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, series: &Arc<Series>, bounds: BoundaryPair) {
        let prepared = self.prepare(series, bounds);
        let title = self.metric.title();
        let unit = self.metric.unit();

        let plot = Plot::new(("series chart", title))
            .legend(Legend::default())
            .height(180.0)
            .allow_scroll(false)
            .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
                time_label(mark.value * 1000.0)
            })
            .label_formatter({
                let prepared = prepared.clone();
                move |_name: &str, point: &PlotPoint| {
                    let time = prepared
                        .label_at(point.x)
                        .map(str::to_owned)
                        .unwrap_or_else(|| time_label(point.x * 1000.0));
                    format!("{}\n{}: {} {}", time, title, point.y, unit)
                }
            });

        if prepared.violated {
            ui.colored_label(ALERT_COLOR, "out of range");
        }

        plot.show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(prepared.points.clone())
                    .name(title)
                    .color(prepared.color),
            );
            plot_ui.hline(
                HLine::new(bounds.max())
                    .name(format!("Upper: {}", bounds.max()))
                    .color(BOUNDARY_COLOR)
                    .style(LineStyle::dashed_dense()),
            );
            plot_ui.hline(
                HLine::new(bounds.min())
                    .name(format!("Lower: {}", bounds.min()))
                    .color(BOUNDARY_COLOR)
                    .style(LineStyle::dashed_dense()),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vitals::RawReading;

    fn series(hr: &[f64]) -> Arc<Series> {
        let readings: Vec<RawReading> = hr
            .iter()
            .enumerate()
            .map(|(i, hr)| RawReading {
                heart_rate: *hr,
                spo2: 98.0,
                temperature: 37.0,
                timestamp_secs: 1_700_000_000.0 + i as f64,
            })
            .collect();
        Arc::new(Series::project(Metric::HeartRate, &readings))
    }

    #[test]
    fn test_prepare_is_memoised() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let s = series(&[70.0, 72.0]);
        let bounds = Metric::HeartRate.default_boundaries();
        let first = chart.prepare(&s, bounds);
        let second = chart.prepare(&s, bounds);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_prepare_recomputes_on_change() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let s = series(&[70.0, 72.0]);
        let bounds = Metric::HeartRate.default_boundaries();
        let first = chart.prepare(&s, bounds);

        // equal by value, but a new handle
        let copy = Arc::new((*s).clone());
        let second = chart.prepare(&copy, bounds);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        let lowered = bounds.with_edge(crate::model::threshold::BoundaryEdge::Upper, 71.0).unwrap();
        let third = chart.prepare(&copy, lowered);
        assert!(!Arc::ptr_eq(&second, &third));
        assert!(third.violated);
    }

    #[test]
    fn test_violation_colour() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let bounds = Metric::HeartRate.default_boundaries();

        let normal = chart.prepare(&series(&[70.0, 119.9]), bounds);
        assert!(!normal.violated);
        assert_eq!(normal.color, NORMAL_COLOR);

        let alert = chart.prepare(&series(&[70.0, 130.0, 80.0]), bounds);
        assert!(alert.violated);
        assert_eq!(alert.color, ALERT_COLOR);

        let at_edge = chart.prepare(&series(&[50.0]), bounds);
        assert!(at_edge.violated);
    }

    #[test]
    fn test_points_and_labels() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let prepared = chart.prepare(
            &series(&[70.0, 72.0]),
            Metric::HeartRate.default_boundaries(),
        );
        assert_eq!(
            prepared.points,
            vec![[1_700_000_000.0, 70.0], [1_700_000_001.0, 72.0]]
        );
        assert_eq!(prepared.labels.len(), 2);
        assert!(prepared.labels.iter().all(|l| l.len() == 8));
    }

    #[test]
    fn test_hover_label_comes_from_prepared_points() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let prepared = chart.prepare(
            &series(&[70.0, 72.0, 74.0]),
            Metric::HeartRate.default_boundaries(),
        );
        assert_eq!(
            prepared.label_at(1_700_000_001.0),
            Some(prepared.labels[1].as_str())
        );
        assert_eq!(prepared.label_at(1_700_000_000.5), None);
    }

    #[test]
    fn test_empty_series() {
        let mut chart = SeriesChart::new(Metric::HeartRate);
        let prepared = chart.prepare(
            &Arc::new(Series::default()),
            Metric::HeartRate.default_boundaries(),
        );
        assert!(prepared.points.is_empty());
        assert!(prepared.labels.is_empty());
        assert_eq!(prepared.label_at(1_700_000_000.0), None);
        assert!(!prepared.violated);
        assert_eq!(prepared.color, NORMAL_COLOR);
    }
}
