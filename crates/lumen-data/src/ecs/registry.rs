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

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use lumen_core::ecs::EntityId;

use crate::ecs::{Component, ComponentError};

/// A per-attachment initializer, called with the entity receiving the component.
pub type Initializer<T> = Box<dyn Fn(EntityId) -> T>;

/// Index of a registered component kind inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed handle to a registered component kind.
///
/// Returned by [`ComponentRegistry::register`] and used to attach, query and
/// detach values of that kind.
pub struct ComponentKind<T> {
    id: ComponentId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentKind<T> {
    fn new(id: ComponentId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped id of this kind.
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<T> Clone for ComponentKind<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentKind<T> {}

impl<T> PartialEq for ComponentKind<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ComponentKind<T> {}

impl<T> fmt::Debug for ComponentKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKind")
            .field("id", &self.id)
            .field("type", &type_name::<T>())
            .finish()
    }
}

struct KindEntry {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    /// Holds an `Initializer<T>` for the kind's `T`.
    initializer: Option<Box<dyn Any>>,
    values: HashMap<EntityId, Box<dyn Any>>,
}

impl KindEntry {
    fn check<T: Component>(&self) -> Result<(), ComponentError> {
        if self.type_id == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(ComponentError::TypeMismatch {
                name: self.name.clone(),
                expected: self.type_name,
                found: type_name::<T>(),
            })
        }
    }
}

/// The registry of named component kinds.
///
/// Besides the kind table, the registry tracks which entities are *observed*:
/// only an observed entity may hold components. Observation is idempotent.
#[derive(Default)]
pub struct ComponentRegistry {
    kinds: Vec<KindEntry>,
    by_name: HashMap<String, ComponentId>,
    observed: HashSet<EntityId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named component kind, optionally with a per-attachment initializer.
    ///
    /// Registering a name again with the same type returns the existing kind; a
    /// supplied initializer then replaces the previous one. Registering it with a
    /// different type fails with [`ComponentError::NameConflict`].
    pub fn register<T: Component>(
        &mut self,
        name: &str,
        initializer: Option<Initializer<T>>,
    ) -> Result<ComponentKind<T>, ComponentError> {
        if let Some(&id) = self.by_name.get(name) {
            let entry = &mut self.kinds[id.0 as usize];
            if entry.type_id != TypeId::of::<T>() {
                return Err(ComponentError::NameConflict {
                    name: name.to_string(),
                    existing: entry.type_name,
                });
            }
            if let Some(initializer) = initializer {
                log::debug!("Replacing initializer of component kind '{name}'.");
                entry.initializer = Some(Box::new(initializer));
            }
            return Ok(ComponentKind::new(id));
        }

        let id = ComponentId(self.kinds.len() as u32);
        self.kinds.push(KindEntry {
            name: name.to_string(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            initializer: initializer.map(|init| Box::new(init) as Box<dyn Any>),
            values: HashMap::new(),
        });
        self.by_name.insert(name.to_string(), id);
        log::debug!("Component kind '{name}' registered as {id}.");
        Ok(ComponentKind::new(id))
    }

    /// Looks up a previously registered kind by name.
    pub fn kind<T: Component>(&self, name: &str) -> Result<ComponentKind<T>, ComponentError> {
        let id = *self
            .by_name
            .get(name)
            .ok_or_else(|| ComponentError::UnknownKind(name.to_string()))?;
        self.kinds[id.0 as usize].check::<T>()?;
        Ok(ComponentKind::new(id))
    }

    /// Returns the name a kind was registered under.
    pub fn name_of(&self, id: ComponentId) -> Option<&str> {
        self.kinds.get(id.0 as usize).map(|entry| entry.name.as_str())
    }

    fn entry<T: Component>(&self, kind: &ComponentKind<T>) -> Result<&KindEntry, ComponentError> {
        let entry = self
            .kinds
            .get(kind.id.0 as usize)
            .ok_or_else(|| ComponentError::UnknownKind(kind.id.to_string()))?;
        entry.check::<T>()?;
        Ok(entry)
    }

    fn entry_mut<T: Component>(
        &mut self,
        kind: &ComponentKind<T>,
    ) -> Result<&mut KindEntry, ComponentError> {
        let entry = self
            .kinds
            .get_mut(kind.id.0 as usize)
            .ok_or_else(|| ComponentError::UnknownKind(kind.id.to_string()))?;
        entry.check::<T>()?;
        Ok(entry)
    }

    /// Grants an entity the ability to hold components.
    ///
    /// Returns `true` if the entity was not observed before.
    pub fn observe(&mut self, entity: EntityId) -> bool {
        self.observed.insert(entity)
    }

    /// Returns `true` if the entity may hold components.
    pub fn is_observed(&self, entity: EntityId) -> bool {
        self.observed.contains(&entity)
    }

    /// Drops every component of an entity and revokes its observation.
    ///
    /// Returns `true` if the entity was observed.
    pub fn forget(&mut self, entity: EntityId) -> bool {
        for entry in &mut self.kinds {
            entry.values.remove(&entity);
        }
        self.observed.remove(&entity)
    }

    /// Attaches a component to an observed entity.
    ///
    /// When `value` is `None`, the kind's initializer builds the value. An
    /// existing value of the same kind is replaced.
    pub fn attach<T: Component>(
        &mut self,
        entity: EntityId,
        kind: &ComponentKind<T>,
        value: Option<T>,
    ) -> Result<(), ComponentError> {
        if !self.observed.contains(&entity) {
            return Err(ComponentError::EntityNotObserved(entity));
        }
        let entry = self.entry_mut(kind)?;
        let value = match value {
            Some(value) => value,
            None => {
                let initializer = entry
                    .initializer
                    .as_ref()
                    .and_then(|init| init.downcast_ref::<Initializer<T>>())
                    .ok_or_else(|| ComponentError::MissingInitializer(entry.name.clone()))?;
                initializer(entity)
            }
        };
        entry.values.insert(entity, Box::new(value));
        Ok(())
    }

    /// Returns a reference to an entity's component of the given kind.
    pub fn get<T: Component>(&self, entity: EntityId, kind: &ComponentKind<T>) -> Option<&T> {
        self.entry(kind)
            .ok()?
            .values
            .get(&entity)?
            .downcast_ref::<T>()
    }

    /// Returns a mutable reference to an entity's component of the given kind.
    pub fn get_mut<T: Component>(
        &mut self,
        entity: EntityId,
        kind: &ComponentKind<T>,
    ) -> Option<&mut T> {
        self.entry_mut(kind)
            .ok()?
            .values
            .get_mut(&entity)?
            .downcast_mut::<T>()
    }

    /// Returns `true` if the entity holds a component of the given kind.
    pub fn has<T: Component>(&self, entity: EntityId, kind: &ComponentKind<T>) -> bool {
        self.get(entity, kind).is_some()
    }

    /// Removes and returns an entity's component of the given kind.
    pub fn detach<T: Component>(&mut self, entity: EntityId, kind: &ComponentKind<T>) -> Option<T> {
        let boxed = self.entry_mut(kind).ok()?.values.remove(&entity)?;
        boxed.downcast::<T>().ok().map(|value| *value)
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterates over the registered kind names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|entry| entry.name.as_str())
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("kinds", &self.names().collect::<Vec<_>>())
            .field("observed", &self.observed.len())
            .finish()
    }
}
