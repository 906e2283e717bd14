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

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use lumen_sdk::{AppHandle, HookResult, Script};

/// An ordered record of hook invocations shared between probes.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Builds a script that records every hook as `"<hook>:<name>"`.
///
/// Suspending hooks record a `"<hook>-begin:<name>"` entry, yield once to
/// the scheduler, then record `"<hook>:<name>"`, so batches interleave.
pub fn probe(name: &str, journal: &Journal) -> Script {
    let script = Script::named(name);
    let script = {
        let (journal, name) = (journal.clone(), name.to_string());
        script.on_installed(move |_| journal.push(format!("installed:{name}")))
    };
    let script = with_suspending(script, "load", name, journal);
    let script = with_suspending(script, "loaded", name, journal);
    let script = with_suspending(script, "resume", name, journal);
    let script = with_suspending(script, "stop", name, journal);
    let script = with_suspending(script, "destroy", name, journal);
    let script = {
        let (journal, name) = (journal.clone(), name.to_string());
        script.on_update(move |_, dt| journal.push(format!("update:{name}:{dt}")))
    };
    let (journal, name) = (journal.clone(), name.to_string());
    script.on_late_update(move |_| journal.push(format!("late:{name}")))
}

fn with_suspending(script: Script, hook: &'static str, name: &str, journal: &Journal) -> Script {
    let (journal, name) = (journal.clone(), name.to_string());
    let record = move |_app: AppHandle| {
        let (journal, name) = (journal.clone(), name.clone());
        async move {
            journal.push(format!("{hook}-begin:{name}"));
            tokio::task::yield_now().await;
            journal.push(format!("{hook}:{name}"));
            HookResult::Ok(())
        }
    };
    match hook {
        "load" => script.on_load(record),
        "loaded" => script.on_loaded(record),
        "resume" => script.on_resume(record),
        "stop" => script.on_stop(record),
        "destroy" => script.on_destroy(record),
        other => panic!("unknown hook {other}"),
    }
}
