//! Error types for light-schedule.
//!
//! Provides unified error handling across profile loading, scheduler
//! settings, state persistence, and the device transport.

use std::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all light-schedule operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Profile source malformed or unreadable
    Profile(ProfileError),
    /// Scheduler settings parsing or validation error
    Settings(SettingsError),
    /// State record persistence error
    State(StateError),
    /// Device command error
    Transport(TransportError),
}

/// Profile source errors.
///
/// All of these are fatal at initialization: a partial schedule is never run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A row did not yield exactly two columns
    ColumnCount {
        /// 1-based source line number
        line: usize,
        /// Number of columns found on the row
        found: usize,
    },
    /// First column value is neither a time of day nor a timestamp
    BadTime {
        /// 1-based source line number
        line: usize,
        /// The offending field text
        value: String,
    },
    /// Second column value is not a non-negative integer
    BadIntensity {
        /// 1-based source line number
        line: usize,
        /// The offending field text
        value: String,
    },
    /// Source contained a header but no control points
    Empty,
    /// Failed to read the profile file
    Io(String),
}

/// Scheduler settings errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Failed to parse TOML settings
    ParseError(String),
    /// Invalid poll interval (must be 1-5000 ms)
    InvalidPollInterval(u64),
    /// Invalid command retry count (must be 1-10)
    InvalidCommandRetries(u32),
    /// Failed to read the settings file
    Io(String),
}

/// State record persistence errors.
///
/// Save failures are retried once by the store; the driver survives a
/// persistent failure and keeps running from memory.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    /// Failed to serialize the record
    Serialize(String),
    /// Failed to write or replace the record file
    Write(String),
    /// Failed to read the record file
    Read(String),
    /// Record file is not valid JSON
    Parse(String),
}

/// Device command errors.
///
/// The driver retries these a bounded number of times, then logs and moves
/// on; the scheduling clock is never paused for the device.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The device link is not available
    Disconnected,
    /// The device rejected or failed a command
    CommandFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Profile(e) => write!(f, "Profile error: {}", e),
            Error::Settings(e) => write!(f, "Settings error: {}", e),
            Error::State(e) => write!(f, "State error: {}", e),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::ColumnCount { line, found } => {
                write!(f, "Line {}: expected 2 columns, found {}", line, found)
            }
            ProfileError::BadTime { line, value } => {
                write!(f, "Line {}: '{}' is not a time of day or timestamp", line, value)
            }
            ProfileError::BadIntensity { line, value } => {
                write!(f, "Line {}: '{}' is not a valid intensity", line, value)
            }
            ProfileError::Empty => write!(f, "Profile contains no control points"),
            ProfileError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SettingsError::InvalidPollInterval(v) => {
                write!(f, "Invalid poll interval: {} ms. Must be 1-5000", v)
            }
            SettingsError::InvalidCommandRetries(v) => {
                write!(f, "Invalid command retry count: {}. Must be 1-10", v)
            }
            SettingsError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Serialize(msg) => write!(f, "Serialize error: {}", msg),
            StateError::Write(msg) => write!(f, "Write error: {}", msg),
            StateError::Read(msg) => write!(f, "Read error: {}", msg),
            StateError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Disconnected => write!(f, "Device link disconnected"),
            TransportError::CommandFailed(msg) => write!(f, "Device command failed: {}", msg),
        }
    }
}

// Conversion impls
impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Error::Profile(e)
    }
}

impl From<SettingsError> for Error {
    fn from(e: SettingsError) -> Self {
        Error::Settings(e)
    }
}

impl From<StateError> for Error {
    fn from(e: StateError) -> Self {
        Error::State(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ProfileError {}

impl std::error::Error for SettingsError {}

impl std::error::Error for StateError {}

impl std::error::Error for TransportError {}
