//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

pub struct DebugFlags {
    /// Emit one line per tuner trial (params, score, elapsed).
    pub print_trials: bool,
    /// Emit per-epoch training loss every `epoch_log_interval` epochs.
    pub print_epochs: bool,
    pub epoch_log_interval: usize,
    /// Emit feature cache hit/miss diagnostics.
    pub print_cache_events: bool,
    /// Emit detailed serialization/deserialization logs.
    pub print_serde: bool,
    /// Emit UI interaction logs (input changes, queued runs).
    pub print_ui_interactions: bool,
    /// Emit surrogate fit details (chosen length scales, log likelihood).
    pub print_surrogate: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_trials: true,
    print_epochs: false,
    epoch_log_interval: 25,
    print_cache_events: true,
    print_serde: false,
    print_ui_interactions: true,
    print_surrogate: false,
};
