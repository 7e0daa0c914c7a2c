use std::cell::Cell;
use std::collections::HashMap;

use centipede_platform::{Dimensions, ResizeSource, SubscriptionId};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

/// A hosting container whose size is set by a script rather than a layout
/// engine.
#[derive(Debug)]
pub struct ScriptedContainer {
    size: Dimensions,
    /// Dimension reads left that still report an empty, unlaid-out container.
    unlaid_polls: Cell<u32>,
    next_id: u64,
    subscribers: HashMap<SubscriptionId, Sender<Dimensions>>,
}

impl ScriptedContainer {
    pub fn new(size: Dimensions) -> Self {
        Self {
            size,
            unlaid_polls: Cell::new(0),
            next_id: 0,
            subscribers: HashMap::new(),
        }
    }

    /// Report 0x0 for the first `polls` reads of [`ResizeSource::dimensions`].
    pub fn laid_out_after(self, polls: u32) -> Self {
        self.unlaid_polls.set(polls);
        self
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Change the size and notify every live subscriber.
    pub fn set_dimensions(&mut self, size: Dimensions) {
        self.size = size;
        self.unlaid_polls.set(0);
        self.subscribers.retain(|id, sender| {
            let delivered = sender.send(size).is_ok();
            if !delivered {
                warn!(?id, "dropping subscriber with a closed channel");
            }
            delivered
        });
        debug!(%size, subscribers = self.subscribers.len(), "container resized");
    }
}

impl ResizeSource for ScriptedContainer {
    fn dimensions(&self) -> Dimensions {
        let left = self.unlaid_polls.get();
        if left > 0 {
            self.unlaid_polls.set(left - 1);
            return Dimensions::new(0, 0);
        }
        self.size
    }

    fn subscribe(&mut self) -> (SubscriptionId, Receiver<Dimensions>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.insert(id, sender);
        (id, receiver)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if self.subscribers.remove(&id).is_none() {
            debug!(?id, "unsubscribe for unknown subscription");
        }
    }
}
