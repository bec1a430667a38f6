//! Proximity signal adapter
//!
//! Wraps the host [`ProximitySensor`] in a latest-value stream. Readings are
//! pushed into a `watch` channel, so a slow consumer only ever sees the most
//! recent state and never a backlog.

use bridge_traits::sensor::{ProximityHandler, ProximitySensor, ProximityState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct ProximitySignal {
    sensor: Arc<dyn ProximitySensor>,
    sender: Arc<watch::Sender<ProximityState>>,
    active: AtomicBool,
}

impl ProximitySignal {
    pub fn new(sensor: Arc<dyn ProximitySensor>) -> Self {
        let (sender, _) = watch::channel(ProximityState::Far);
        Self {
            sensor,
            sender: Arc::new(sender),
            active: AtomicBool::new(false),
        }
    }

    /// Start monitoring. Idempotent.
    ///
    /// Returns whether monitoring is active. On a device without a sensor this
    /// is a no-op that returns `false`, and no reading will ever arrive.
    pub fn start(&self) -> bool {
        if self.active.load(Ordering::SeqCst) {
            return true;
        }

        if !self.sensor.is_supported() {
            info!("Proximity sensor not supported; routing stays on speaker");
            return false;
        }

        let sender = Arc::clone(&self.sender);
        let handler: ProximityHandler = Arc::new(move |near| {
            let reading = ProximityState::from_near(near);
            sender.send_if_modified(|current| {
                if *current == reading {
                    return false;
                }
                *current = reading;
                true
            });
        });

        match self.sensor.enable(handler) {
            Ok(()) => {
                self.active.store(true, Ordering::SeqCst);
                debug!("Proximity monitoring started");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to enable proximity sensor");
                false
            }
        }
    }

    /// Stop monitoring and release the sensor. Idempotent.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.sensor.disable();
            debug!("Proximity monitoring stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Latest reading (`Far` until the sensor reports otherwise).
    pub fn current(&self) -> ProximityState {
        *self.sender.borrow()
    }

    /// Receiver that is notified on every change of state.
    pub fn subscribe(&self) -> watch::Receiver<ProximityState> {
        self.sender.subscribe()
    }
}

impl Drop for ProximitySignal {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::fakes::FakeProximitySensor;

    #[test]
    fn test_start_is_idempotent() {
        let sensor = Arc::new(FakeProximitySensor::new());
        let signal = ProximitySignal::new(sensor.clone());

        assert!(signal.start());
        assert!(signal.start());
        assert_eq!(sensor.enable_count(), 1);
    }

    #[test]
    fn test_unsupported_sensor_is_noop() {
        let sensor = Arc::new(FakeProximitySensor::unsupported());
        let signal = ProximitySignal::new(sensor.clone());

        assert!(!signal.start());
        assert!(!signal.is_active());
        assert_eq!(sensor.enable_count(), 0);
        assert!(!sensor.emit(true));
        assert_eq!(signal.current(), ProximityState::Far);
    }

    #[tokio::test]
    async fn test_readings_replace_previous_value() {
        let sensor = Arc::new(FakeProximitySensor::new());
        let signal = ProximitySignal::new(sensor.clone());
        let mut receiver = signal.subscribe();
        signal.start();

        sensor.emit(true);
        sensor.emit(false);
        sensor.emit(true);

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), ProximityState::Near);
        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_repeated_reading_does_not_notify() {
        let sensor = Arc::new(FakeProximitySensor::new());
        let signal = ProximitySignal::new(sensor.clone());
        let mut receiver = signal.subscribe();
        signal.start();

        sensor.emit(false);
        assert!(!receiver.has_changed().unwrap());

        sensor.emit(true);
        sensor.emit(true);
        assert!(receiver.has_changed().unwrap());
        receiver.borrow_and_update();
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_stop_and_drop_disable_sensor() {
        let sensor = Arc::new(FakeProximitySensor::new());
        {
            let signal = ProximitySignal::new(sensor.clone());
            signal.start();
            signal.stop();
            signal.stop();
            assert_eq!(sensor.disable_count(), 1);
            assert!(!sensor.emit(true));

            signal.start();
        }
        assert_eq!(sensor.disable_count(), 2);
        assert!(!sensor.is_enabled());
    }
}
