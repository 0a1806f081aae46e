//! Observer registry for docking and FTL lifecycle events.
//!
//! Handlers are registered per `EventKind`, either globally or for one
//! entity. Publishing runs the local handlers of every target entity, then
//! the global handlers, then appends the event to the log the engine
//! drains each tick.

use std::collections::HashMap;

use hecs::Entity;

use shuttle_core::events::{EventKind, ShuttleEvent};

pub type Handler = Box<dyn FnMut(&ShuttleEvent)>;

#[derive(Default)]
pub struct EventBus {
    global: HashMap<EventKind, Vec<Handler>>,
    local: HashMap<(Entity, EventKind), Vec<Handler>>,
    log: Vec<ShuttleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        self.global.entry(kind).or_default().push(handler);
    }

    pub fn subscribe_local(&mut self, entity: Entity, kind: EventKind, handler: Handler) {
        self.local.entry((entity, kind)).or_default().push(handler);
    }

    /// Drop every local handler of a deleted entity.
    pub fn unsubscribe_entity(&mut self, entity: Entity) {
        self.local.retain(|(e, _), _| *e != entity);
    }

    pub fn publish(&mut self, event: ShuttleEvent) {
        log::debug!("event {event:?}");
        let kind = event.kind();
        for target in event.targets() {
            if let Some(handlers) = self.local.get_mut(&(target, kind)) {
                for handler in handlers.iter_mut() {
                    handler(&event);
                }
            }
        }
        if let Some(handlers) = self.global.get_mut(&kind) {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }
        self.log.push(event);
    }

    /// Events published since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<ShuttleEvent> {
        std::mem::take(&mut self.log)
    }

    pub fn pending(&self) -> &[ShuttleEvent] {
        &self.log
    }
}
