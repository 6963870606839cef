//! TUI Widgets
//!
//! Custom widgets for the robot insight dashboard.

mod history;
mod progress;
mod settings;

pub use history::render_history;
pub use progress::{render_progress, truncate_string};
pub use settings::render_settings;
