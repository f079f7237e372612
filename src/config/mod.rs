//! Scheduler settings.
//!
//! Provides types for loading and validating the scheduler's runtime
//! settings from TOML files.

mod loader;
mod settings;

pub use loader::{load_settings, parse_settings};
pub use settings::SchedulerSettings;
