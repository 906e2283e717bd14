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

//! Defines the lifecycle states of an application.
//!
//! The same closed enumeration is used for the application's `state` field and
//! as the tag of the lifecycle events published on the [`EventBus`](crate::EventBus).
//! The textual tags are spelled out in [`AppState::tag`], so that no code
//! relies on the incidental shape of the variant names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The lifecycle state of an application, also used as the lifecycle event tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppState {
    /// Initial state. Nothing has been started yet.
    #[default]
    #[serde(rename = "SHUT")]
    Shut,
    /// Transient state while the startup batch (`on_load`) is in flight.
    #[serde(rename = "INIT")]
    Init,
    /// Steady state. Per-frame updates are dispatched.
    #[serde(rename = "RUNNING")]
    Running,
    /// Paused. Scripts have been stopped and may be resumed.
    #[serde(rename = "STOP")]
    Stop,
}

impl AppState {
    /// All lifecycle states, in declaration order.
    pub const ALL: [AppState; 4] = [
        AppState::Shut,
        AppState::Init,
        AppState::Running,
        AppState::Stop,
    ];

    /// Returns the event tag associated with this state.
    pub fn tag(self) -> &'static str {
        match self {
            AppState::Shut => "SHUT",
            AppState::Init => "INIT",
            AppState::Running => "RUNNING",
            AppState::Stop => "STOP",
        }
    }

    /// Resolves a state from its event tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.tag() == tag)
    }

    /// Returns `true` if the lifecycle allows moving from `self` to `next`.
    ///
    /// `Init -> Shut` is the rollback taken when the startup batch fails.
    pub fn can_transition_to(self, next: AppState) -> bool {
        matches!(
            (self, next),
            (AppState::Shut, AppState::Init)
                | (AppState::Init, AppState::Running)
                | (AppState::Init, AppState::Shut)
                | (AppState::Running, AppState::Stop)
                | (AppState::Stop, AppState::Running)
        )
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when parsing a string that is not a known lifecycle tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateTag(pub String);

impl fmt::Display for UnknownStateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown lifecycle state tag: '{}'", self.0)
    }
}

impl std::error::Error for UnknownStateTag {}

impl FromStr for AppState {
    type Err = UnknownStateTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppState::from_tag(s).ok_or_else(|| UnknownStateTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for state in AppState::ALL {
            assert_eq!(AppState::from_tag(state.tag()), Some(state));
            assert_eq!(state.to_string().parse::<AppState>(), Ok(state));
        }
    }

    #[test]
    fn every_state_has_its_own_tag() {
        let tags: std::collections::HashSet<_> = AppState::ALL.iter().map(|s| s.tag()).collect();
        assert_eq!(tags.len(), AppState::ALL.len());
        assert_eq!(AppState::Running.tag(), "RUNNING");
        assert_eq!(AppState::Shut.tag(), "SHUT");
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(AppState::from_tag("PAUSED"), None);
        assert_eq!(
            "running".parse::<AppState>(),
            Err(UnknownStateTag("running".to_string()))
        );
    }

    #[test]
    fn default_state_is_shut() {
        assert_eq!(AppState::default(), AppState::Shut);
    }

    #[test]
    fn serde_uses_event_tags() {
        let json = serde_json::to_string(&AppState::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
        let parsed: AppState = serde_json::from_str("\"STOP\"").unwrap();
        assert_eq!(parsed, AppState::Stop);
    }

    #[test]
    fn transition_table() {
        assert!(AppState::Shut.can_transition_to(AppState::Init));
        assert!(AppState::Init.can_transition_to(AppState::Running));
        assert!(AppState::Running.can_transition_to(AppState::Stop));
        assert!(AppState::Stop.can_transition_to(AppState::Running));

        assert!(!AppState::Shut.can_transition_to(AppState::Running));
        assert!(!AppState::Stop.can_transition_to(AppState::Init));
        assert!(!AppState::Running.can_transition_to(AppState::Init));
        for state in AppState::ALL {
            assert!(!state.can_transition_to(state));
        }
    }
}
