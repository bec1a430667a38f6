//! In-process fakes for the host ports.
//!
//! Enabled with the `test-fakes` feature. Each fake implements the same trait
//! as the platform adapter, records what the core asked of it, and lets a test
//! fire the callbacks a real platform would fire (sensor readings, page load,
//! clip completion).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::audio_session::{AudioRoute, AudioSession, SessionProfile};
use crate::error::{BridgeError, Result};
use crate::playback::{CompletionHandler, PreviewAudioPlayer};
use crate::sensor::{ProximityHandler, ProximitySensor};
use crate::storage::SettingsStore;
use crate::web::{LoadHandler, WebContentView};

// ============================================================================
// Proximity sensor
// ============================================================================

/// Proximity sensor driven by the test through [`FakeProximitySensor::emit`].
pub struct FakeProximitySensor {
    supported: bool,
    handler: Mutex<Option<ProximityHandler>>,
    enable_calls: AtomicUsize,
    disable_calls: AtomicUsize,
}

impl FakeProximitySensor {
    pub fn new() -> Self {
        Self::with_support(true)
    }

    /// A device without a proximity sensor.
    pub fn unsupported() -> Self {
        Self::with_support(false)
    }

    fn with_support(supported: bool) -> Self {
        Self {
            supported,
            handler: Mutex::new(None),
            enable_calls: AtomicUsize::new(0),
            disable_calls: AtomicUsize::new(0),
        }
    }

    /// Deliver a reading. Returns `false` when monitoring is off.
    pub fn emit(&self, near: bool) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(near);
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub fn enable_count(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    pub fn disable_count(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeProximitySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProximitySensor for FakeProximitySensor {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn enable(&self, handler: ProximityHandler) -> Result<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        if !self.supported {
            return Err(BridgeError::NotAvailable("proximity sensor".to_string()));
        }
        *self.handler.lock() = Some(handler);
        Ok(())
    }

    fn disable(&self) {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.handler.lock().take();
    }
}

// ============================================================================
// Audio session
// ============================================================================

/// Audio session that records route changes and can be told to fail.
#[derive(Default)]
pub struct FakeAudioSession {
    applied: Mutex<Vec<AudioRoute>>,
    attempts: AtomicUsize,
    failures_remaining: AtomicUsize,
    always_fail: AtomicBool,
    activated: Mutex<Option<SessionProfile>>,
    fail_activation: AtomicBool,
}

impl FakeAudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` route changes.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Fail every route change until switched off again.
    pub fn set_failing(&self, failing: bool) {
        self.always_fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_activation_failing(&self, failing: bool) {
        self.fail_activation.store(failing, Ordering::SeqCst);
    }

    /// Routes that were applied successfully, in order.
    pub fn applied_routes(&self) -> Vec<AudioRoute> {
        self.applied.lock().clone()
    }

    /// Every `apply_route` call, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn activated_profile(&self) -> Option<SessionProfile> {
        *self.activated.lock()
    }
}

#[async_trait]
impl AudioSession for FakeAudioSession {
    async fn activate(&self, profile: SessionProfile) -> Result<()> {
        if self.fail_activation.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "session activation rejected".to_string(),
            ));
        }
        *self.activated.lock() = Some(profile);
        Ok(())
    }

    async fn apply_route(&self, route: AudioRoute) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(format!(
                "cannot route to {}",
                route
            )));
        }

        let consumed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            return Err(BridgeError::OperationFailed(format!(
                "cannot route to {}",
                route
            )));
        }

        self.applied.lock().push(route);
        Ok(())
    }
}

// ============================================================================
// Web content view
// ============================================================================

/// Hidden web view that records loaded pages and evaluated scripts.
#[derive(Default)]
pub struct FakeWebContentView {
    pages: Mutex<Vec<(String, String)>>,
    scripts: Mutex<Vec<String>>,
    handler: Mutex<Option<LoadHandler>>,
    fail_scripts: AtomicBool,
}

impl FakeWebContentView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the page finishing its load.
    pub fn finish_load(&self) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn set_scripts_failing(&self, failing: bool) {
        self.fail_scripts.store(failing, Ordering::SeqCst);
    }

    /// `(html, base_url)` pairs, in load order.
    pub fn loaded_pages(&self) -> Vec<(String, String)> {
        self.pages.lock().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Number of evaluated scripts containing `needle`.
    pub fn script_count(&self, needle: &str) -> usize {
        self.scripts
            .lock()
            .iter()
            .filter(|script| script.contains(needle))
            .count()
    }

    pub fn has_load_handler(&self) -> bool {
        self.handler.lock().is_some()
    }
}

#[async_trait]
impl WebContentView for FakeWebContentView {
    async fn load_html(&self, html: &str, base_url: &str) -> Result<()> {
        self.pages
            .lock()
            .push((html.to_string(), base_url.to_string()));
        Ok(())
    }

    async fn evaluate_script(&self, script: &str) -> Result<()> {
        self.scripts.lock().push(script.to_string());
        if self.fail_scripts.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "script evaluation failed".to_string(),
            ));
        }
        Ok(())
    }

    fn set_load_handler(&self, handler: Option<LoadHandler>) {
        *self.handler.lock() = handler;
    }
}

// ============================================================================
// Preview player
// ============================================================================

/// A call made against [`FakePreviewPlayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCall {
    Load(String),
    Play,
    Pause,
}

/// Preview player that records commands and completes on demand.
#[derive(Default)]
pub struct FakePreviewPlayer {
    calls: Mutex<Vec<PreviewCall>>,
    handler: Mutex<Option<CompletionHandler>>,
    fail_play: AtomicBool,
}

impl FakePreviewPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the most recently loaded clip reaching its end.
    pub fn finish(&self) -> bool {
        let url = self
            .calls
            .lock()
            .iter()
            .rev()
            .find_map(|call| match call {
                PreviewCall::Load(url) => Some(url.clone()),
                _ => None,
            })
            .unwrap_or_default();
        self.finish_clip(&url)
    }

    /// Simulate the clip loaded from `url` reaching its end, even if another
    /// clip has been loaded since.
    pub fn finish_clip(&self, url: &str) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(url);
                true
            }
            None => false,
        }
    }

    pub fn set_play_failing(&self, failing: bool) {
        self.fail_play.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PreviewCall> {
        self.calls.lock().clone()
    }

    pub fn play_count(&self) -> usize {
        self.count(|call| matches!(call, PreviewCall::Play))
    }

    pub fn load_count(&self) -> usize {
        self.count(|call| matches!(call, PreviewCall::Load(_)))
    }

    pub fn has_completion_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    fn count(&self, predicate: impl Fn(&PreviewCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }
}

#[async_trait]
impl PreviewAudioPlayer for FakePreviewPlayer {
    async fn load(&self, url: &str) -> Result<()> {
        self.calls.lock().push(PreviewCall::Load(url.to_string()));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("player refused".to_string()));
        }
        self.calls.lock().push(PreviewCall::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.calls.lock().push(PreviewCall::Pause);
        Ok(())
    }

    fn set_completion_handler(&self, handler: Option<CompletionHandler>) {
        *self.handler.lock() = handler;
    }
}

// ============================================================================
// Settings store
// ============================================================================

/// `SettingsStore` backed by an in-memory map.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_string(key, &value.to_string()).await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.values.lock().get(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| BridgeError::StorageError(format!("Parse error: {}", e))),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.values.lock().keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.values.lock().clear();
        Ok(())
    }
}
