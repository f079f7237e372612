//! Persisted, crash-recoverable schedule state.

mod record;
mod store;

pub use record::ScheduleState;
pub use store::StateStore;
