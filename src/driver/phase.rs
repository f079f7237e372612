//! Driver lifecycle phases.

/// Current phase of the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    /// Loading state and profile, confirming device readiness.
    Initializing,
    /// Resolving the resume position from persisted start time and now.
    Locating,
    /// Walking the step function and emitting intensity changes.
    Running,
    /// End of the step function reached; deciding whether to loop.
    CycleBoundary,
    /// Terminal. Final state persisted.
    Completed,
}

impl DriverPhase {
    /// Whether this phase ends the driver.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, DriverPhase::Completed)
    }

    /// Get the phase name as a static string.
    pub fn name(self) -> &'static str {
        match self {
            DriverPhase::Initializing => "Initializing",
            DriverPhase::Locating => "Locating",
            DriverPhase::Running => "Running",
            DriverPhase::CycleBoundary => "CycleBoundary",
            DriverPhase::Completed => "Completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(DriverPhase::Completed.is_terminal());
        assert!(!DriverPhase::Initializing.is_terminal());
        assert!(!DriverPhase::Locating.is_terminal());
        assert!(!DriverPhase::Running.is_terminal());
        assert!(!DriverPhase::CycleBoundary.is_terminal());
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(DriverPhase::Running.name(), "Running");
        assert_eq!(DriverPhase::Completed.name(), "Completed");
    }
}
