//! Event Bus
//!
//! Typed events go to two kinds of subscribers, always in this order:
//!
//! 1. global listeners registered for the event's key, in registration
//!    order;
//! 2. objects subscribed to the key, in registry order.
//!
//! Listeners and objects react through the same [`Context`] as object
//! hooks, so anything they emit is queued and dispatched after the
//! current event has reached every subscriber.

use std::fmt;

use glassforge_core::{Event, EventKey};

use crate::behavior::Context;
use crate::world::World;

/// Global event listener
pub type Listener = Box<dyn FnMut(&Event, &mut Context<'_>)>;

/// Handle for removing a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    key: EventKey,
    listener: Listener,
}

/// Global listener table and dispatcher
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Registration>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global listener for one event key
    pub fn add_listener<F>(&mut self, key: EventKey, listener: F) -> ListenerId
    where
        F: FnMut(&Event, &mut Context<'_>) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            key,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|registration| registration.id != id);
        self.listeners.len() != before
    }

    /// Number of global listeners for a key
    pub fn listener_count(&self, key: &EventKey) -> usize {
        self.listeners.iter().filter(|registration| registration.key == *key).count()
    }

    /// Deliver an event to global listeners, then subscribed objects
    ///
    /// Only `AfterRenderAll` subscribers get surface access.
    pub fn dispatch(&mut self, event: &Event, world: &mut World) {
        let key = event.key();
        let render = matches!(event, Event::AfterRenderAll);
        log::debug!("Dispatching {:?}", event);

        {
            let mut ctx = if render { world.render_context() } else { world.context() };
            for registration in self.listeners.iter_mut().filter(|r| r.key == key) {
                (registration.listener)(event, &mut ctx);
            }
        }

        for id in world.objects.subscribers(&key) {
            let Some(mut object) = world.objects.detach(id) else {
                continue;
            };
            {
                let mut ctx = if render { world.render_context() } else { world.context() };
                object.on_event(event, &mut ctx);
            }
            world.reattach(object);
        }
    }
}
