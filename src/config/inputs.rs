//! Defaults and limits for the sidebar inputs

pub struct InputDefaults {
    pub ticker: &'static str,
    /// Default start date is this many days before today
    pub start_days_ago: i64,
    /// Default end date is this many days before today
    pub end_days_ago: i64,
    pub seq_length: usize,
    pub seq_length_min: usize,
    pub seq_length_max: usize,
    /// Per-character delay of the report reveal (seconds)
    pub typing_speed_secs: f64,
}

pub const INPUT_DEFAULTS: InputDefaults = InputDefaults {
    ticker: "SPY",
    start_days_ago: 365 * 5,
    end_days_ago: 1,
    seq_length: 60,
    seq_length_min: 1,
    seq_length_max: 200,
    typing_speed_secs: 0.03,
};
