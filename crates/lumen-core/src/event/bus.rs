// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A generic publish/subscribe event bus.
///
/// Each call to [`subscribe`](EventBus::subscribe) creates an independent,
/// unbounded queue. [`publish`](EventBus::publish) clones the event into every
/// queue whose receiver is still alive; queues whose receiver has been dropped
/// are pruned on the way.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + 'static> {
    subscribers: Mutex<Vec<flume::Sender<T>>>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Creates a new EventBus without any subscriber.
    ///
    /// ## Returns
    /// A new instance of the EventBus struct.
    pub fn new() -> Self {
        log::trace!("Generic EventBus initialized.");
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<flume::Sender<T>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers an event to every live subscriber.
    ///
    /// ## Arguments
    /// * `event` - The event to be broadcast.
    ///
    /// ## Returns
    /// The number of subscribers the event was delivered to.
    pub fn publish(&self, event: T) -> usize {
        log::trace!("Publishing an event.");

        let mut subscribers = self.lock();
        subscribers.retain(|sender| match sender.send(event.clone()) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("Dropping a disconnected event subscriber.");
                false
            }
        });
        subscribers.len()
    }

    /// Registers a new subscriber.
    ///
    /// ## Returns
    /// The receiving end of a queue that will get every event published from now on.
    pub fn subscribe(&self) -> flume::Receiver<T> {
        let (sender, receiver) = flume::unbounded();
        self.lock().push(sender);
        receiver
    }

    /// Returns the number of subscribers currently registered.
    ///
    /// Subscribers that dropped their receiver are only pruned on the next publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
