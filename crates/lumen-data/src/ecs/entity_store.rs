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

//! Entity identity allocation.

use lumen_core::ecs::EntityId;

/// Allocator for entity identities.
///
/// The `EntitySystem` maintains a dense list of entity slots and a free list of
/// indices released by [`destroy`](EntitySystem::destroy). Recycled indices get
/// their generation bumped so that stale handles stay invalid.
#[derive(Debug, Clone, Default)]
pub struct EntitySystem {
    /// Every slot that has ever been created, with its current id and liveness.
    slots: Vec<(EntityId, bool)>,
    /// Indices available for reuse, enabling $O(1)$ allocation.
    freed: Vec<u32>,
    alive: usize,
}

impl EntitySystem {
    /// Creates a new, empty `EntitySystem`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new or recycled `EntityId`.
    ///
    /// If there are indices in the free list, one is popped and its generation
    /// is incremented. Otherwise, a new slot is appended.
    pub fn create(&mut self) -> EntityId {
        self.alive += 1;
        if let Some(index) = self.freed.pop() {
            let (id_slot, alive) = &mut self.slots[index as usize];
            id_slot.generation = id_slot.generation.wrapping_add(1);
            *alive = true;
            *id_slot
        } else {
            let new_id = EntityId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push((new_id, true));
            new_id
        }
    }

    /// Releases an entity so its index can be recycled.
    ///
    /// Returns `false` if the id is stale or was never allocated. Components
    /// stored in a `ComponentRegistry` are not dropped here; see
    /// `ComponentRegistry::forget`.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some((slot_id, alive)) if *alive && *slot_id == id => {
                *alive = false;
                self.freed.push(id.index);
                self.alive -= 1;
                log::trace!("Entity {id} destroyed.");
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `id` refers to a live entity of the current generation.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|(slot_id, alive)| *alive && *slot_id == id)
    }

    /// Returns the number of live entities.
    pub fn len(&self) -> usize {
        self.alive
    }

    /// Returns `true` if no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Returns the total number of slots (both alive and dead).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .filter(|(_, alive)| *alive)
            .map(|(id, _)| *id)
    }
}
