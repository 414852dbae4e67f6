use eframe::egui::Ui;
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};

use crate::pipeline::ValidationPoint;
use crate::ui::config::{UI_CONFIG, UI_TEXT};

/// Actual and predicted close series, built once per report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveCache {
    pub actual: Vec<[f64; 2]>,
    pub predicted: Vec<[f64; 2]>,
    pub y_min: f64,
    pub y_max: f64,
}

impl CurveCache {
    pub fn from_curve(curve: &[ValidationPoint]) -> Self {
        let actual: Vec<[f64; 2]> = curve
            .iter()
            .map(|p| [p.index as f64, p.actual_close])
            .collect();
        let predicted: Vec<[f64; 2]> = curve
            .iter()
            .map(|p| [p.index as f64, p.predicted_close])
            .collect();
        let (y_min, y_max) = actual
            .iter()
            .chain(predicted.iter())
            .map(|p| p[1])
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            actual,
            predicted,
            y_min,
            y_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Validation-curve chart for the central panel.
#[derive(Default)]
pub struct PlotView {
    cache: Option<CurveCache>,
}

impl PlotView {
    pub fn new() -> Self {
        Self { cache: None }
    }

    pub fn set_curve(&mut self, curve: &[ValidationPoint]) {
        self.cache = Some(CurveCache::from_curve(curve));
    }

    pub fn clear(&mut self) {
        self.cache = None;
    }

    pub fn has_curve(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn show(&self, ui: &mut Ui) {
        let Some(cache) = self.cache.as_ref().filter(|c| !c.is_empty()) else {
            return;
        };

        let mut plot = Plot::new("validation_curve")
            .legend(Legend::default().position(Corner::LeftTop))
            .height(UI_CONFIG.plot_height)
            .allow_scroll(false)
            .x_axis_label("validation sequence")
            .y_axis_label("close");
        if cache.y_min.is_finite() && cache.y_max > cache.y_min {
            let pad = (cache.y_max - cache.y_min) * 0.05;
            plot = plot
                .include_y(cache.y_min - pad)
                .include_y(cache.y_max + pad);
        }

        plot.show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(UI_TEXT.curve_actual, PlotPoints::new(cache.actual.clone()))
                    .color(UI_CONFIG.colors.actual_line)
                    .width(1.5),
            );
            plot_ui.line(
                Line::new(
                    UI_TEXT.curve_predicted,
                    PlotPoints::new(cache.predicted.clone()),
                )
                .color(UI_CONFIG.colors.predicted_line)
                .width(1.5),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(index: usize, actual_close: f64, predicted_close: f64) -> ValidationPoint {
        ValidationPoint {
            index,
            actual_close,
            predicted_close,
        }
    }

    #[test]
    fn cache_tracks_range_over_both_series() {
        let cache = CurveCache::from_curve(&[point(0, 10.0, 12.0), point(1, 11.0, 9.0)]);
        assert_eq!(cache.actual, vec![[0.0, 10.0], [1.0, 11.0]]);
        assert_eq!(cache.predicted, vec![[0.0, 12.0], [1.0, 9.0]]);
        assert_eq!(cache.y_min, 9.0);
        assert_eq!(cache.y_max, 12.0);
    }

    #[test]
    fn empty_curve_is_not_drawn() {
        let mut view = PlotView::new();
        view.set_curve(&[]);
        assert!(!view.has_curve());
        view.set_curve(&[point(0, 1.0, 1.0)]);
        assert!(view.has_curve());
        view.clear();
        assert!(!view.has_curve());
    }
}
