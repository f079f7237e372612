//! Device command seam.

use crate::error::TransportError;
use crate::profile::Intensity;

/// Commands understood by the physical lighting device.
///
/// Implementations own the wire link (serial line, network socket, test
/// double); the driver only cares about success or failure per command.
pub trait LightTransport {
    /// One-time greeting at driver start so the device can signal
    /// readiness (the hardware flashes in response).
    fn announce_presence(&mut self) -> Result<(), TransportError>;

    /// Set the device output to the given intensity.
    fn set_intensity(&mut self, intensity: Intensity) -> Result<(), TransportError>;
}
