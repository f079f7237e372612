//! Settings loading from files.

use std::fs;
use std::path::Path;

use crate::error::{Result, SettingsError};

use super::SchedulerSettings;

/// Load scheduler settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the values
/// fail validation.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SchedulerSettings> {
    let content =
        fs::read_to_string(path.as_ref()).map_err(|e| SettingsError::Io(e.to_string()))?;
    parse_settings(&content)
}

/// Parse scheduler settings from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_settings(content: &str) -> Result<SchedulerSettings> {
    let settings: SchedulerSettings =
        toml::from_str(content).map_err(|e| SettingsError::ParseError(e.message().to_string()))?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &SchedulerSettings) -> Result<()> {
    if settings.poll_interval_ms == 0 || settings.poll_interval_ms > 5000 {
        return Err(SettingsError::InvalidPollInterval(settings.poll_interval_ms).into());
    }
    if settings.command_retries == 0 || settings.command_retries > 10 {
        return Err(SettingsError::InvalidCommandRetries(settings.command_retries).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_minimal_settings() {
        let toml = r#"
state_path = "live/schedule_state.json"
profile_path = "profiles/base.csv"
"#;

        let settings = parse_settings(toml).unwrap();
        assert_eq!(settings.state_path, Path::new("live/schedule_state.json"));
        assert!(settings.run_continuously);
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.command_retries, 3);
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
state_path = "state.json"
profile_path = "base.csv"
run_continuously = false
poll_interval_ms = 250
command_retries = 5
retry_backoff_ms = 100
"#;

        let settings = parse_settings(toml).unwrap();
        assert!(!settings.run_continuously);
        assert_eq!(settings.poll_interval().as_millis(), 250);
        assert_eq!(settings.retry_backoff().as_millis(), 100);
    }

    #[test]
    fn test_invalid_poll_interval() {
        let toml = r#"
state_path = "state.json"
profile_path = "base.csv"
poll_interval_ms = 0
"#;

        let err = parse_settings(toml).unwrap_err();
        assert_eq!(err, SettingsError::InvalidPollInterval(0).into());
    }

    #[test]
    fn test_invalid_command_retries() {
        let toml = r#"
state_path = "state.json"
profile_path = "base.csv"
command_retries = 50
"#;

        let err = parse_settings(toml).unwrap_err();
        assert_eq!(err, SettingsError::InvalidCommandRetries(50).into());
    }
}
