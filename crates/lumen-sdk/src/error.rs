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

//! Error types surfaced by the application.

use std::path::PathBuf;

use lumen_data::ecs::ComponentError;
use thiserror::Error;

use crate::script::HookStage;

/// Errors returned by [`Application`](crate::Application) operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// A script was registered while the startup batch was in flight.
    #[error("Cannot register a script while the application is initializing")]
    RegisterDuringInit,
    /// At least one hook of a batch failed. The transition did not complete.
    #[error("{failed} script(s) failed in {stage}")]
    Hook {
        /// The batch that failed.
        stage: HookStage,
        /// How many members of the batch failed.
        failed: usize,
        /// The first failure, in registration order.
        #[source]
        source: anyhow::Error,
    },
    /// The component registry rejected a request.
    #[error(transparent)]
    Component(#[from] ComponentError),
    /// The configuration could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file {path:?}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for the expected schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration parsed but its values are unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
