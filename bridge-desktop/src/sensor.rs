//! Proximity Sensor Implementation
//!
//! Desktop machines have no ear sensor. The adapter reports itself as
//! unsupported so the core never expects readings.

use bridge_traits::{
    error::{BridgeError, Result},
    sensor::{ProximityHandler, ProximitySensor},
};
use tracing::debug;

/// Desktop proximity sensor (always unsupported)
#[derive(Debug, Default)]
pub struct DesktopProximitySensor;

impl DesktopProximitySensor {
    pub fn new() -> Self {
        Self
    }
}

impl ProximitySensor for DesktopProximitySensor {
    fn is_supported(&self) -> bool {
        false
    }

    fn enable(&self, _handler: ProximityHandler) -> Result<()> {
        debug!("Proximity monitoring requested on a device without a sensor");
        Err(BridgeError::NotAvailable(
            "proximity sensor is not available on desktop".to_string(),
        ))
    }

    fn disable(&self) {}
}
