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

//! Entity and component storage.
//!
//! The [`EntitySystem`] hands out generational [`EntityId`]s. The
//! [`ComponentRegistry`] keeps the set of named component kinds, tracks which
//! entities are *observed* (allowed to hold components), and stores the
//! component values themselves.

mod component;
mod entity_store;
mod error;
mod registry;

pub use component::Component;
pub use entity_store::EntitySystem;
pub use error::ComponentError;
pub use lumen_core::ecs::EntityId;
pub use registry::{ComponentId, ComponentKind, ComponentRegistry, Initializer};
