//! Typed events
//!
//! Engine lifecycle events plus game-defined signals. Listeners subscribe
//! by [`EventKey`], which is the event without its payload.

use std::borrow::Cow;

/// An event delivered through the engine's event bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Sent once before the first level load
    Init,
    /// Sent when the host shuts the game down
    Shutdown,
    /// Sent before a terrain load is requested
    BeforeLoadLevel,
    /// Sent after a level has been ingested and populated
    AfterLoadLevel,
    /// Sent after the camera has been moved toward its target
    Camera,
    /// Sent after the terrain and all objects were drawn, before flushing
    AfterRenderAll,
    /// Sent when a debug level skip is triggered
    Debug,
    /// Pointer touch in screen coordinates
    Touch { x: i32, y: i32 },
    /// Game-defined named signal
    Signal(Cow<'static, str>),
}

impl Event {
    /// Create a named signal
    pub fn signal(name: impl Into<Cow<'static, str>>) -> Self {
        Event::Signal(name.into())
    }

    /// The subscription key of this event
    pub fn key(&self) -> EventKey {
        match self {
            Event::Init => EventKey::Init,
            Event::Shutdown => EventKey::Shutdown,
            Event::BeforeLoadLevel => EventKey::BeforeLoadLevel,
            Event::AfterLoadLevel => EventKey::AfterLoadLevel,
            Event::Camera => EventKey::Camera,
            Event::AfterRenderAll => EventKey::AfterRenderAll,
            Event::Debug => EventKey::Debug,
            Event::Touch { .. } => EventKey::Touch,
            Event::Signal(name) => EventKey::Signal(name.clone()),
        }
    }
}

/// Subscription key for [`Event`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Init,
    Shutdown,
    BeforeLoadLevel,
    AfterLoadLevel,
    Camera,
    AfterRenderAll,
    Debug,
    Touch,
    Signal(Cow<'static, str>),
}

impl EventKey {
    /// Key of a named signal
    pub fn signal(name: impl Into<Cow<'static, str>>) -> Self {
        EventKey::Signal(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_key_ignores_payload() {
        assert_eq!(Event::Touch { x: 1, y: 2 }.key(), EventKey::Touch);
    }

    #[test]
    fn test_signal_key_matches_name() {
        assert_eq!(Event::signal("plate_pressed").key(), EventKey::signal("plate_pressed"));
        assert_ne!(Event::signal("plate_pressed").key(), EventKey::signal("plate_released"));
    }

    #[test]
    fn test_owned_and_static_signal_names_compare_equal() {
        let owned = EventKey::signal(String::from("door"));
        assert_eq!(owned, EventKey::signal("door"));
    }
}
