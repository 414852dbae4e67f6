/// User-facing strings, kept in one place.
pub struct UiText {
    pub app_title: &'static str,
    pub inputs_heading: &'static str,
    pub ticker_label: &'static str,
    pub start_label: &'static str,
    pub end_label: &'static str,
    pub seq_length_label: &'static str,
    pub date_hint: &'static str,
    pub invalid_date: &'static str,
    pub device_label: &'static str,
    pub status_idle: &'static str,
    pub status_queued: &'static str,
    pub trials_heading: &'static str,
    pub curve_heading: &'static str,
    pub curve_actual: &'static str,
    pub curve_predicted: &'static str,
    pub waiting_for_first_run: &'static str,
}

pub const UI_TEXT: UiText = UiText {
    app_title: "LSTM Tuner",
    inputs_heading: "Inputs",
    ticker_label: "Ticker",
    start_label: "Start Date",
    end_label: "End Date",
    seq_length_label: "Sequence Length",
    date_hint: "YYYY-MM-DD",
    invalid_date: "Invalid date (use YYYY-MM-DD)",
    device_label: "Device",
    status_idle: "Idle",
    status_queued: "New inputs queued; they run when the current run finishes",
    trials_heading: "Trials",
    curve_heading: "Validation Close: Actual vs Predicted",
    curve_actual: "Actual close",
    curve_predicted: "Predicted close",
    waiting_for_first_run: "Results appear here when the first run completes.",
};
