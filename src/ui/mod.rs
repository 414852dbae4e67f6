// User interface components
pub mod app;
pub mod app_async;
pub mod config;
pub mod plot_view;
pub mod reveal;
pub mod styles;
pub mod ui_panels;
pub mod ui_render;
pub mod ui_text;
pub mod utils;

// Re-export main app
pub use app::{AppInputs, ForecastApp};
pub use config::UI_CONFIG;
pub use reveal::{reveal, reveal_lines};
