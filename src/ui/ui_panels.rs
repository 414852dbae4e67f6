use eframe::egui::{ComboBox, Slider, TextEdit, Ui};
use strum::IntoEnumIterator;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::INPUT_DEFAULTS;
use crate::nn::ComputeDevice;
use crate::ui::config::{UI_CONFIG, UI_TEXT};
use crate::ui::styles::UiStyleExt;
use crate::ui::utils::{colored_subsection_heading, section_heading};
use crate::utils::TimeUtils;

/// Trait for UI panels that can be rendered
pub trait Panel {
    type Event;
    fn render(&mut self, ui: &mut Ui) -> Vec<Self::Event>;
}

/// Something the user committed in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Ticker(String),
    StartDate(String),
    EndDate(String),
    SeqLength(usize),
    Device(ComputeDevice),
}

/// Sidebar with the run inputs. Edits the buffers it is given and reports
/// committed changes as events.
pub struct InputPanel<'a> {
    ticker: &'a mut String,
    start_text: &'a mut String,
    end_text: &'a mut String,
    seq_length: usize,
    device: ComputeDevice,
}

impl<'a> InputPanel<'a> {
    pub fn new(
        ticker: &'a mut String,
        start_text: &'a mut String,
        end_text: &'a mut String,
        seq_length: usize,
        device: ComputeDevice,
    ) -> Self {
        Self {
            ticker,
            start_text,
            end_text,
            seq_length,
            device,
        }
    }

    fn render_ticker(&mut self, ui: &mut Ui) -> Option<String> {
        ui.label(colored_subsection_heading(UI_TEXT.ticker_label));
        let response = ui.add(TextEdit::singleline(&mut *self.ticker).desired_width(120.0));
        // Commit on focus loss (Enter also drops focus) so typing doesn't rerun per keystroke
        response
            .lost_focus()
            .then(|| self.ticker.trim().to_uppercase())
    }

    fn render_date(ui: &mut Ui, label: &str, text: &mut String) -> Option<String> {
        ui.label(colored_subsection_heading(label));
        let valid = TimeUtils::parse_date(text).is_some();
        let mut edit = TextEdit::singleline(text)
            .hint_text(UI_TEXT.date_hint)
            .desired_width(120.0);
        if !valid {
            edit = edit.text_color(UI_CONFIG.colors.invalid_input);
        }
        let response = ui.add(edit);
        if !valid {
            ui.label_error(UI_TEXT.invalid_date);
        }
        response.lost_focus().then(|| text.trim().to_string())
    }

    fn render_seq_length(&mut self, ui: &mut Ui) -> Option<usize> {
        ui.label(colored_subsection_heading(UI_TEXT.seq_length_label));
        let mut value = self.seq_length;
        let response = ui.add(
            Slider::new(
                &mut value,
                INPUT_DEFAULTS.seq_length_min..=INPUT_DEFAULTS.seq_length_max,
            )
            .integer(),
        );
        // Sliders emit `changed` every frame while dragging; commit on release
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            self.seq_length = value;
            return Some(value);
        }
        self.seq_length = value;
        None
    }

    fn render_device(&mut self, ui: &mut Ui) -> Option<ComputeDevice> {
        let mut selected = self.device;
        ComboBox::from_label(UI_TEXT.device_label)
            .selected_text(selected.to_string())
            .show_ui(ui, |ui| {
                for device in ComputeDevice::iter() {
                    ui.selectable_value(&mut selected, device, device.to_string());
                }
            });
        (selected != self.device).then(|| {
            self.device = selected;
            selected
        })
    }
}

impl Panel for InputPanel<'_> {
    type Event = InputEvent;

    fn render(&mut self, ui: &mut Ui) -> Vec<Self::Event> {
        let mut events = Vec::new();
        section_heading(ui, UI_TEXT.inputs_heading);

        if let Some(ticker) = self.render_ticker(ui) {
            events.push(InputEvent::Ticker(ticker));
        }
        ui.add_space(5.0);
        if let Some(start) = Self::render_date(ui, UI_TEXT.start_label, self.start_text) {
            events.push(InputEvent::StartDate(start));
        }
        ui.add_space(5.0);
        if let Some(end) = Self::render_date(ui, UI_TEXT.end_label, self.end_text) {
            events.push(InputEvent::EndDate(end));
        }
        ui.add_space(5.0);
        if let Some(len) = self.render_seq_length(ui) {
            events.push(InputEvent::SeqLength(len));
        }
        ui.add_space(10.0);
        if let Some(device) = self.render_device(ui) {
            events.push(InputEvent::Device(device));
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_ui_interactions {
            for event in &events {
                log::info!("UI input: {:?}", event);
            }
        }
        events
    }
}
