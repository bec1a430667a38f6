//! # Event Bus System
//!
//! Typed events published by the core over `tokio::sync::broadcast`. This is
//! the observable state the UI binds to: every route change, playback
//! transition, playlist mutation and search outcome is announced here.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ Route controller ├──────────>│           │
//! └──────────────────┘           │           │    subscribe    ┌────┐
//!                                │ EventBus  ├────────────────>│ UI │
//! ┌──────────────────┐   emit    │ (broadcast│                 └────┘
//! │  Music service   ├──────────>│  channel) │
//! └──────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, RouteEvent};
//! use bridge_traits::ProximityState;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Route(RouteEvent::ProximityChanged {
//!         proximity: ProximityState::Near,
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert!(matches!(event, CoreEvent::Route(_)));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: all senders were dropped. Treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use bridge_traits::{AudioRoute, NavigationMode, PlaybackState, ProximityState};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Proximity and output-route events
    Route(RouteEvent),
    /// Media backend events
    Playback(PlaybackEvent),
    /// Playlist mutations
    Playlist(PlaylistEvent),
    /// Remote search outcomes
    Search(SearchEvent),
    /// In-app browser requests
    Browser(BrowserEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Route(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Playlist(e) => e.description(),
            CoreEvent::Search(e) => e.description(),
            CoreEvent::Browser(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Route(RouteEvent::RouteChangeFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Search(SearchEvent::FellBack { .. }) => EventSeverity::Warning,
            CoreEvent::Route(RouteEvent::RouteChanged { .. }) => EventSeverity::Info,
            CoreEvent::Search(SearchEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Route Events
// ============================================================================

/// Proximity readings and the audio route that follows them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RouteEvent {
    /// The sensor reported a new proximity state.
    ProximityChanged { proximity: ProximityState },
    /// The audio session switched output.
    RouteChanged { from: AudioRoute, to: AudioRoute },
    /// The audio session rejected a route change; `retained` stays in effect.
    RouteChangeFailed {
        attempted: AudioRoute,
        retained: AudioRoute,
        message: String,
    },
}

impl RouteEvent {
    fn description(&self) -> &str {
        match self {
            RouteEvent::ProximityChanged { .. } => "Proximity changed",
            RouteEvent::RouteChanged { .. } => "Audio route changed",
            RouteEvent::RouteChangeFailed { .. } => "Audio route change failed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events from the active media backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A record was loaded and became the current selection.
    Loaded {
        media_id: String,
        title: String,
        /// Backend kind, e.g. "embedded_web" or "local_preview".
        backend: String,
    },
    /// Playback state changed.
    StateChanged {
        media_id: Option<String>,
        state: PlaybackState,
    },
    /// The current preview clip played to its end.
    Finished { media_id: String },
    /// A backend command failed; playback state is unchanged.
    Error {
        media_id: Option<String>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loaded { .. } => "Media loaded",
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Finished { .. } => "Media finished",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Playlist Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaylistEvent {
    /// A record was appended at `position`.
    Added {
        media_id: String,
        title: String,
        position: usize,
    },
    Removed { media_id: String },
    /// The persisted playlist was restored at startup.
    Loaded { count: usize },
}

impl PlaylistEvent {
    fn description(&self) -> &str {
        match self {
            PlaylistEvent::Added { .. } => "Added to playlist",
            PlaylistEvent::Removed { .. } => "Removed from playlist",
            PlaylistEvent::Loaded { .. } => "Playlist loaded",
        }
    }
}

// ============================================================================
// Search Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SearchEvent {
    /// A search produced results (remote or fallback).
    Completed {
        source: String,
        query: String,
        result_count: usize,
    },
    /// The provider failed and placeholder results were substituted.
    FellBack {
        source: String,
        query: String,
        reason: String,
    },
}

impl SearchEvent {
    fn description(&self) -> &str {
        match self {
            SearchEvent::Completed { .. } => "Search completed",
            SearchEvent::FellBack { .. } => "Search fell back to placeholder results",
        }
    }
}

// ============================================================================
// Browser Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BrowserEvent {
    /// The UI should open `url` in the in-app browser with `mode`.
    Requested { url: String, mode: NavigationMode },
}

impl BrowserEvent {
    fn description(&self) -> &str {
        match self {
            BrowserEvent::Requested { .. } => "Browser requested",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for core events.
///
/// Cloning the bus shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let route_stream = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Route(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn route_changed() -> CoreEvent {
        CoreEvent::Route(RouteEvent::RouteChanged {
            from: AudioRoute::Speaker,
            to: AudioRoute::Earpiece,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(route_changed()).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Playlist(PlaylistEvent::Added {
            media_id: "yt-1".to_string(),
            title: "Song".to_string(),
            position: 0,
        });

        assert_eq!(bus.emit(event.clone()).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Route(_)));

        bus.emit(CoreEvent::Search(SearchEvent::Completed {
            source: "youtube".to_string(),
            query: "lofi".to_string(),
            result_count: 10,
        }))
        .ok();
        bus.emit(route_changed()).ok();

        assert_eq!(stream.recv().await.unwrap(), route_changed());
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(route_changed()).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
        // The subscriber keeps working after lagging.
        assert!(sub.recv().await.is_ok());
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Route(RouteEvent::RouteChangeFailed {
            attempted: AudioRoute::Earpiece,
            retained: AudioRoute::Speaker,
            message: "rejected".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Warning);
        assert_eq!(route_changed().severity(), EventSeverity::Info);

        let error = CoreEvent::Playback(PlaybackEvent::Error {
            media_id: None,
            message: "boom".to_string(),
        });
        assert_eq!(error.severity(), EventSeverity::Error);

        let proximity = CoreEvent::Route(RouteEvent::ProximityChanged {
            proximity: ProximityState::Near,
        });
        assert_eq!(proximity.severity(), EventSeverity::Debug);
        assert_eq!(proximity.description(), "Proximity changed");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::StateChanged {
            media_id: Some("yt-abc".to_string()),
            state: PlaybackState::Playing,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"state\":\"playing\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for _ in 0..10 {
                bus1.emit(route_changed()).ok();
            }
        });
        let handle2 = tokio::spawn(async move {
            for i in 0..10 {
                bus2.emit(CoreEvent::Playlist(PlaylistEvent::Loaded { count: i }))
                    .ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }
}
