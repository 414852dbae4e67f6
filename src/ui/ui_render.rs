use eframe::egui::{CentralPanel, Context, Frame, Grid, Margin, ScrollArea, SidePanel, TopBottomPanel, Ui};
use std::time::Duration;

use crate::config::INPUT_DEFAULTS;
use crate::pipeline::{ForecastReport, report_lines};
use crate::ui::config::{UI_CONFIG, UI_TEXT};
use crate::ui::reveal::{reveal_duration, visible_prefix};
use crate::ui::styles::UiStyleExt;
use crate::ui::ui_panels::{InputEvent, InputPanel, Panel};
use crate::ui::utils::{colored_heading, format_duration, section_heading, spaced_separator};

use super::app::ForecastApp;

/// Revealed prefix of each line after `elapsed`. Lines reveal one after another,
/// so a line starts once every character before it is shown.
pub(super) fn revealed_lines<'a>(lines: &'a [String], elapsed: Duration, delay: Duration) -> Vec<&'a str> {
    let mut offset = Duration::ZERO;
    lines
        .iter()
        .map(|line| {
            let shown = visible_prefix(line, elapsed.saturating_sub(offset), delay);
            offset += reveal_duration(line, delay);
            shown
        })
        .collect()
}

fn typing_delay() -> Duration {
    Duration::from_secs_f64(INPUT_DEFAULTS.typing_speed_secs)
}

impl ForecastApp {
    pub(super) fn render_side_panel(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let side_panel_frame = Frame::new()
            .fill(UI_CONFIG.colors.side_panel)
            .inner_margin(Margin::same(8));
        SidePanel::left("left_panel")
            .min_width(180.0)
            .frame(side_panel_frame)
            .show(ctx, |ui| {
                let mut panel = InputPanel::new(
                    &mut self.inputs.ticker,
                    &mut self.inputs.start_text,
                    &mut self.inputs.end_text,
                    self.inputs.seq_length,
                    self.device,
                );
                panel.render(ui)
            })
            .inner
    }

    pub(super) fn render_central_panel(&mut self, ctx: &Context) {
        let central_panel_frame = Frame::new()
            .fill(UI_CONFIG.colors.central_panel)
            .inner_margin(Margin::same(12));
        CentralPanel::default()
            .frame(central_panel_frame)
            .show(ctx, |ui| {
                ui.heading(colored_heading(UI_TEXT.app_title));
                ScrollArea::vertical().id_salt("central_scroll").show(ui, |ui| {
                    match self.report.as_ref() {
                        Some(report) => {
                            self.render_report(ui, report);
                            spaced_separator(ui);
                            render_trial_table(ui, report);
                            if self.plot_view.has_curve() {
                                section_heading(ui, UI_TEXT.curve_heading);
                                self.plot_view.show(ui);
                            }
                        }
                        None if self.is_running() => {
                            ui.add_space(10.0);
                            ui.spinner();
                        }
                        None => {
                            ui.add_space(10.0);
                            ui.label_subdued(UI_TEXT.waiting_for_first_run);
                        }
                    }
                });
            });
    }

    fn render_report(&self, ui: &mut Ui, report: &ForecastReport) {
        let lines = report_lines(report);
        let delay = typing_delay();
        let elapsed = self
            .reveal_started
            .map(|started| started.elapsed())
            .unwrap_or(Duration::MAX);

        ui.add_space(8.0);
        for line in revealed_lines(&lines, elapsed, delay) {
            if line.ends_with(':') {
                ui.add_space(4.0);
                ui.label_subheader(line);
            } else {
                ui.label_report_line(line);
            }
        }

        let total: Duration = lines.iter().map(|l| reveal_duration(l, delay)).sum();
        if elapsed < total {
            ui.ctx().request_repaint_after(delay);
        }
    }

    pub(super) fn render_status_panel(&mut self, ctx: &Context) {
        let status_frame = Frame::new()
            .fill(UI_CONFIG.colors.side_panel)
            .inner_margin(Margin::symmetric(8, 4));
        TopBottomPanel::bottom("status_panel")
            .frame(status_frame)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.is_running() {
                        let progress = self.progress_snapshot();
                        ui.spinner();
                        if let Some(stage) = progress.stage {
                            ui.label(stage.to_string());
                        }
                        if progress.total_trials > 0 {
                            ui.metric(
                                "Trials",
                                &format!("{}/{}", progress.trials.len(), progress.total_trials),
                                UI_CONFIG.colors.heading,
                            );
                        }
                        if let Some(best) = progress
                            .trials
                            .iter()
                            .max_by(|a, b| a.score.total_cmp(&b.score))
                        {
                            ui.metric("Best loss", &format!("{:.4}", -best.score), UI_CONFIG.colors.label);
                        }
                        if let Some(request) = &self.running_request {
                            ui.label_subdued(request.key.to_string());
                        }
                    } else if let Some(report) = &self.report {
                        ui.label_subdued(format!(
                            "{} from {} ({} bars, {} rows) in {} on {}",
                            report.request.key,
                            report.source,
                            report.n_bars,
                            report.n_rows,
                            format_duration(report.elapsed),
                            report.request.device
                        ));
                    } else {
                        ui.label_subdued(UI_TEXT.status_idle);
                    }

                    if self.pending_request.is_some() {
                        ui.separator();
                        ui.label_warning(UI_TEXT.status_queued);
                    }
                });
                if let Some(error) = &self.last_error {
                    ui.label_error(error.to_string());
                }
            });
    }
}

fn render_trial_table(ui: &mut Ui, report: &ForecastReport) {
    section_heading(ui, UI_TEXT.trials_heading);
    ScrollArea::vertical()
        .id_salt("trial_table")
        .max_height(UI_CONFIG.trial_table_height)
        .show(ui, |ui| {
            Grid::new("trial_grid")
                .striped(true)
                .num_columns(7)
                .show(ui, |ui| {
                    for header in ["#", "Phase", "Hidden", "Layers", "LR", "Loss", "Time"] {
                        ui.label_subheader(header);
                    }
                    ui.end_row();

                    let best_index = report
                        .trials
                        .iter()
                        .max_by(|a, b| a.score.total_cmp(&b.score))
                        .map(|t| t.index);
                    for trial in &report.trials {
                        let marker = if Some(trial.index) == best_index { "*" } else { "" };
                        ui.label(format!("{}{}", trial.index, marker));
                        ui.label(trial.phase.to_string());
                        ui.label(trial.params.hidden_dim.to_string());
                        ui.label(trial.params.num_layers.to_string());
                        ui.label(format!("{:.5}", trial.params.learning_rate));
                        ui.label(format!("{:.5}", -trial.score));
                        ui.label(format_duration(trial.elapsed));
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_reveal_in_sequence() {
        let lines = vec!["ab".to_string(), "cd".to_string()];
        let delay = Duration::from_millis(10);

        assert_eq!(revealed_lines(&lines, Duration::ZERO, delay), vec!["", ""]);
        assert_eq!(revealed_lines(&lines, Duration::from_millis(15), delay), vec!["a", ""]);
        assert_eq!(revealed_lines(&lines, Duration::from_millis(25), delay), vec!["ab", ""]);
        assert_eq!(revealed_lines(&lines, Duration::from_millis(35), delay), vec!["ab", "c"]);
        assert_eq!(revealed_lines(&lines, Duration::from_secs(1), delay), vec!["ab", "cd"]);
    }

    #[test]
    fn finished_reveal_shows_everything() {
        let lines = vec!["Validation Loss:".to_string(), "0.0123".to_string()];
        let shown = revealed_lines(&lines, Duration::MAX, Duration::from_millis(30));
        assert_eq!(shown, vec!["Validation Loss:", "0.0123"]);
    }
}
