//! Profile loading and step-function expansion.
//!
//! A profile is the sparse, user-authored schedule of (time-offset,
//! intensity) control points; the step function is its fully expanded,
//! piecewise-constant form used for driving and rendering.

mod step;
mod table;

pub use step::StepFunction;
pub use table::{Intensity, ProfilePoint, ProfileTable};
