//! Proximity Sensor Abstraction
//!
//! The host exposes the device's proximity sensor (the one that blanks the
//! screen during a phone call) as a binary near/far signal.
//!
//! - iOS: `UIDevice.isProximityMonitoringEnabled` plus
//!   `proximityStateDidChangeNotification`
//! - Android: `Sensor.TYPE_PROXIMITY` compared against its maximum range
//! - Desktop: no sensor, see `bridge-desktop`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Whether the device is being held against the user's ear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityState {
    Near,
    #[default]
    Far,
}

impl ProximityState {
    pub fn from_near(near: bool) -> Self {
        if near {
            ProximityState::Near
        } else {
            ProximityState::Far
        }
    }

    pub fn is_near(&self) -> bool {
        matches!(self, ProximityState::Near)
    }
}

impl fmt::Display for ProximityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProximityState::Near => write!(f, "near"),
            ProximityState::Far => write!(f, "far"),
        }
    }
}

/// Callback invoked by the host with the new raw sensor reading (`true` = near).
///
/// Hosts may call it from any thread, including interrupt-driven sensor
/// callbacks; receivers must only hand the value off.
pub type ProximityHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// Platform proximity sensor.
///
/// # Contract
///
/// - `enable` installs the handler and turns monitoring on. Devices without a
///   sensor report `is_supported() == false`; enabling them never produces a
///   reading.
/// - `disable` turns monitoring off and drops the handler. After it returns the
///   handler is not invoked again.
pub trait ProximitySensor: Send + Sync {
    /// Whether the device has a usable proximity sensor.
    fn is_supported(&self) -> bool;

    /// Turn monitoring on and deliver readings to `handler`.
    fn enable(&self, handler: ProximityHandler) -> Result<()>;

    /// Turn monitoring off and release the handler.
    fn disable(&self);
}
