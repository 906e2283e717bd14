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

use lumen_core::ecs::EntityId;
use thiserror::Error;

/// Errors reported by the [`ComponentRegistry`](super::ComponentRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// No component kind is registered under this name.
    #[error("Unknown component kind '{0}'")]
    UnknownKind(String),
    /// The name is already registered for a different Rust type.
    #[error("Component kind '{name}' is already registered as `{existing}`")]
    NameConflict {
        /// The contested component name.
        name: String,
        /// The type the name is already bound to.
        existing: &'static str,
    },
    /// The entity has not been granted component capability.
    #[error("Entity {0} is not observed by the component registry")]
    EntityNotObserved(EntityId),
    /// No value was supplied and the kind has no initializer.
    #[error("Component kind '{0}' has no initializer and no value was supplied")]
    MissingInitializer(String),
    /// The handle's type does not match the registered kind.
    #[error("Component kind '{name}' stores `{expected}`, not `{found}`")]
    TypeMismatch {
        /// The component name.
        name: String,
        /// The registered type.
        expected: &'static str,
        /// The type the caller asked for.
        found: &'static str,
    },
}
