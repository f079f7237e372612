//! # light-schedule
//!
//! Cyclic light-intensity profile scheduler with crash-recoverable state.
//!
//! ## Features
//!
//! - **Sparse profiles**: Two-column (time, intensity) sources expand into
//!   explicit piecewise-constant step functions
//! - **Cycle arithmetic**: Any wall-clock instant maps onto a position in a
//!   repeating cycle, looping forever or running exactly once
//! - **Crash recovery**: A persisted JSON state record lets a restarted
//!   driver resume mid-cycle without replaying elapsed time
//! - **Torn-read safety**: Saves are atomic replace-on-write, so a
//!   concurrent visualization process never sees a partial record
//! - **Injected seams**: Device transport and wall clock are traits, so the
//!   driver loop runs against hardware or test doubles alike
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use light_schedule::{Driver, SystemClock};
//!
//! // Load runtime settings from TOML
//! let settings = light_schedule::load_settings("scheduler.toml")?;
//!
//! // Recover or create the schedule and drive it
//! let mut driver = Driver::initialize(&settings, serial_transport, SystemClock)?;
//! driver.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod config;
pub mod cycle;
pub mod driver;
pub mod error;
pub mod profile;
pub mod render;
pub mod state;

// Re-exports for ergonomic API
pub use config::{load_settings, parse_settings, SchedulerSettings};
pub use cycle::{CycleClock, CycleMode, CyclePosition};
pub use driver::{Driver, DriverOptions, DriverPhase, LightTransport, SystemClock, WallClock};
pub use error::{Error, Result};
pub use profile::{Intensity, ProfilePoint, ProfileTable, StepFunction};
pub use render::RenderSnapshot;
pub use state::{ScheduleState, StateStore};
