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

//! The public-facing Software Development Kit (SDK) for the Lumen runtime.
//!
//! This crate provides the [`Application`] orchestrator: it hosts a dynamic set
//! of [`Script`]s, drives their lifecycle hooks through the `SHUT`, `INIT`,
//! `RUNNING` and `STOP` states, dispatches per-frame updates, and fronts the
//! entity system and the component registry.

#![warn(missing_docs)]

mod app;
mod config;
mod error;
pub mod logging;
mod script;
mod ticker;

pub use app::{AppHandle, Application};
pub use config::{AppConfig, TickMode, TickerConfig};
pub use error::{AppError, ConfigError};
pub use script::{HookFuture, HookResult, HookStage, Script};
pub use ticker::Ticker;

pub use lumen_core::{AppState, EntityId, EventBus};
pub use lumen_data::ecs::{
    Component, ComponentError, ComponentKind, ComponentRegistry, EntitySystem, Initializer,
};

/// Everything a host program usually needs.
pub mod prelude {
    pub use crate::{
        AppConfig, AppError, AppHandle, AppState, Application, Component, ComponentKind,
        EntityId, HookResult, Script,
    };
}
