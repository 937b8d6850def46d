//! Event bus for crafting notifications.
//!
//! The crafting core never renders anything; toast and haptic cues are
//! requested through events and the host decides how to present them.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Events emitted by the crafting core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CraftEvent {
    /// A timed craft job was started.
    CraftStarted {
        /// Recipe name
        recipe: String,
        /// Scene key the job is bound to, if any
        scene: Option<String>,
        /// Units queued, including the one in progress
        queued: u32,
        /// Recipe's start cue, if configured
        cue: Option<String>,
    },
    /// One unit of a job completed and its outcome was applied.
    UnitCompleted {
        /// Recipe name
        recipe: String,
        /// Whether the unit succeeded
        success: bool,
        /// Whether the unit came out high quality
        hq: bool,
        /// Units still queued after this one
        remaining: u32,
        /// Recipe's success or fail cue for this unit, if configured
        cue: Option<String>,
    },
    /// A job finished (queue empty or continuation no longer possible).
    JobFinished {
        /// Recipe name
        recipe: String,
        /// Whether every unit of the job succeeded
        all_succeeded: bool,
        /// Whether the profession leveled up while the job ran
        level_up: bool,
        /// Whether the host should show a completion toast
        show_toast: bool,
        /// Recipe's success or fail cue for the whole job, if configured
        cue: Option<String>,
    },
    /// A recipe became known through a cascade or autodiscovery.
    RecipeLearned {
        /// Recipe name
        recipe: String,
        /// Whether the host should show a learn toast
        show_toast: bool,
    },
    /// A recipe was removed by a cascade.
    RecipeUnlearned {
        /// Recipe name
        recipe: String,
    },
}

/// Event bus for broadcasting crafting events to observers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CraftEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CraftEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CraftEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CraftEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CraftEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(CraftEvent::RecipeLearned {
            recipe: "Potion".into(),
            show_toast: true,
        });
        bus.publish(CraftEvent::RecipeUnlearned {
            recipe: "Elixir".into(),
        });

        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);
        for _ in 0..5 {
            bus.publish(CraftEvent::RecipeUnlearned {
                recipe: "X".into(),
            });
        }
        assert_eq!(bus.pending_count(), 1);
    }
}
