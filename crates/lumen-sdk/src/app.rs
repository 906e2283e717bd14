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

//! The application orchestrator.
//!
//! [`Application`] owns the script registry, the lifecycle state machine, the
//! per-frame dispatcher, and one instance each of the entity system and the
//! component registry.
//!
//! # Lifecycle
//!
//! | From            | Call        | To            | Batches                         |
//! |-----------------|-------------|---------------|---------------------------------|
//! | `SHUT`          | `start()`   | `INIT`→`RUNNING` | `on_load`, then `on_loaded`  |
//! | `STOP`          | `start()`   | `RUNNING`     | `on_resume`                     |
//! | `RUNNING`       | `stop()`    | `STOP`        | `on_stop`                       |
//! | `RUNNING`/`STOP`| `destroy()` | `STOP`        | `on_stop` if running, `on_destroy` |
//!
//! Every other call is a silent no-op. Each state change is published once on
//! the application's event bus, tagged with the new state.
//!
//! The runtime is single-threaded and cooperative: a batch starts the hook of
//! every script of a snapshot of the registry, then waits for all of them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::join_all;
use lumen_core::{AppState, EntityId, EventBus};
use lumen_data::ecs::{Component, ComponentKind, ComponentRegistry, EntitySystem, Initializer};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::script::{HookStage, Script};
use crate::ticker::Ticker;

struct AppInner {
    state: Cell<AppState>,
    scripts: RefCell<Vec<Script>>,
    entities: RefCell<EntitySystem>,
    components: RefCell<ComponentRegistry>,
    events: EventBus<AppState>,
    ticker: Option<Ticker>,
}

/// The root object of the runtime.
///
/// `Application` is a cheap-clone handle; clones share the same state.
#[derive(Clone)]
pub struct Application {
    inner: Rc<AppInner>,
}

/// A weak back-reference to an [`Application`], held by scripts.
#[derive(Clone)]
pub struct AppHandle {
    inner: Weak<AppInner>,
}

impl AppHandle {
    /// Returns the application, if it is still alive.
    pub fn upgrade(&self) -> Option<Application> {
        self.inner.upgrade().map(|inner| Application { inner })
    }

    /// Returns `true` if this handle points to `app`.
    pub fn ptr_eq(&self, app: &Application) -> bool {
        Weak::ptr_eq(&self.inner, &Rc::downgrade(&app.inner))
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// Creates an application in the `SHUT` state, without a ticker.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates an application from a configuration.
    ///
    /// When `use_ticker` is set, the built-in [`Ticker`] script is registered
    /// right away so it joins the first startup batch.
    pub fn with_config(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let ticker = config.use_ticker.then(|| Ticker::new(config.ticker.clone()));
        let app = Self::build(ticker.clone());
        if let Some(ticker) = ticker {
            let script = ticker.script();
            app.install(&script)?;
            app.inner.scripts.borrow_mut().push(script);
        }
        Ok(app)
    }

    fn build(ticker: Option<Ticker>) -> Self {
        log::debug!("Creating application.");
        Self {
            inner: Rc::new(AppInner {
                state: Cell::new(AppState::Shut),
                scripts: RefCell::new(Vec::new()),
                entities: RefCell::new(EntitySystem::new()),
                components: RefCell::new(ComponentRegistry::new()),
                events: EventBus::new(),
                ticker,
            }),
        }
    }

    /// Returns a weak handle to this application.
    pub fn handle(&self) -> AppHandle {
        AppHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> AppState {
        self.inner.state.get()
    }

    fn set_state(&self, next: AppState) {
        let current = self.inner.state.get();
        if current == next {
            return;
        }
        debug_assert!(
            current.can_transition_to(next),
            "illegal lifecycle transition {current} -> {next}"
        );
        self.inner.state.set(next);
        log::debug!("Application state: {current} -> {next}");
        self.inner.events.publish(next);
    }

    /// Returns the bus on which lifecycle transitions are published.
    pub fn events(&self) -> &EventBus<AppState> {
        &self.inner.events
    }

    /// Subscribes to lifecycle transitions.
    pub fn subscribe(&self) -> flume::Receiver<AppState> {
        self.inner.events.subscribe()
    }

    /// Returns the built-in ticker, if the configuration enabled it.
    pub fn ticker(&self) -> Option<&Ticker> {
        self.inner.ticker.as_ref()
    }

    /// Returns the number of registered scripts, duplicates included.
    pub fn script_count(&self) -> usize {
        self.inner.scripts.borrow().len()
    }

    /// Returns `true` if the given handle is registered.
    pub fn contains(&self, script: &Script) -> bool {
        self.inner
            .scripts
            .borrow()
            .iter()
            .any(|registered| registered.ptr_eq(script))
    }

    /// Returns the registered scripts, in registration order.
    pub fn scripts(&self) -> Vec<Script> {
        self.inner.scripts.borrow().clone()
    }

    // --- Entity / component facade ---

    /// Creates an entity that is already observed by the component registry.
    pub fn entity(&self) -> EntityId {
        let id = self.inner.entities.borrow_mut().create();
        self.inner.components.borrow_mut().observe(id);
        log::trace!("Entity {id} created.");
        id
    }

    /// Destroys an entity and drops its observation and every attached component.
    ///
    /// Returns `false` if the id is stale or was never allocated; the registry
    /// is left untouched in that case.
    pub fn despawn(&self, id: EntityId) -> bool {
        if !self.inner.entities.borrow_mut().destroy(id) {
            return false;
        }
        self.inner.components.borrow_mut().forget(id);
        log::trace!("Entity {id} despawned.");
        true
    }

    /// Registers a named component kind with an optional per-attachment initializer.
    pub fn component<T: Component>(
        &self,
        name: &str,
        initializer: Option<Initializer<T>>,
    ) -> Result<ComponentKind<T>, AppError> {
        Ok(self
            .inner
            .components
            .borrow_mut()
            .register(name, initializer)?)
    }

    /// Runs `f` with exclusive access to the entity system.
    ///
    /// Destroying an entity here does not touch the component registry; use
    /// [`despawn`](Self::despawn) to remove an entity with its components.
    pub fn with_entities<R>(&self, f: impl FnOnce(&mut EntitySystem) -> R) -> R {
        f(&mut self.inner.entities.borrow_mut())
    }

    /// Runs `f` with exclusive access to the component registry.
    pub fn with_components<R>(&self, f: impl FnOnce(&mut ComponentRegistry) -> R) -> R {
        f(&mut self.inner.components.borrow_mut())
    }

    // --- Script registry ---

    /// Registers a script.
    ///
    /// `None` is accepted and ignored. Registration fails while the application
    /// is `INIT`. The script's `on_installed` hook always runs; when the
    /// application is already `RUNNING`, its `on_load` and `on_loaded` hooks run
    /// before the script joins the registry.
    pub async fn script(&self, handle: impl Into<Option<Script>>) -> Result<(), AppError> {
        let Some(script) = handle.into() else {
            return Ok(());
        };
        self.install(&script)?;

        if self.state() == AppState::Running {
            let single = [script.clone()];
            self.run_batch(HookStage::Load, &single).await?;
            self.run_batch(HookStage::Loaded, &single).await?;
        }

        self.inner.scripts.borrow_mut().push(script);
        Ok(())
    }

    fn install(&self, script: &Script) -> Result<(), AppError> {
        if self.state() == AppState::Init {
            return Err(AppError::RegisterDuringInit);
        }
        let handle = self.handle();
        script.bind(handle.clone());
        script.installed(&handle);
        log::debug!(
            "Script '{}' installed while {}.",
            script.label(),
            self.state()
        );
        Ok(())
    }

    fn snapshot(&self) -> Vec<Script> {
        self.inner.scripts.borrow().clone()
    }

    async fn run_batch(&self, stage: HookStage, scripts: &[Script]) -> Result<(), AppError> {
        let handle = self.handle();
        let (indices, pending): (Vec<usize>, Vec<_>) = scripts
            .iter()
            .enumerate()
            .filter_map(|(index, script)| script.begin(stage, &handle).map(|hook| (index, hook)))
            .unzip();
        if pending.is_empty() {
            return Ok(());
        }
        log::trace!(
            "Running {stage} on {} of {} script(s).",
            pending.len(),
            scripts.len()
        );

        let results = join_all(pending).await;

        let mut failed = 0;
        let mut first_error = None;
        for (index, result) in indices.into_iter().zip(results) {
            if let Err(error) = result {
                log::error!(
                    "Script #{index} '{}' failed in {stage}: {error:#}",
                    scripts[index].label()
                );
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        match first_error {
            Some(source) => Err(AppError::Hook {
                stage,
                failed,
                source,
            }),
            None => Ok(()),
        }
    }

    // --- Lifecycle ---

    /// Starts the application, or resumes it from `STOP`.
    ///
    /// From `SHUT`: the state becomes `INIT`, every `on_load` runs, the state
    /// becomes `RUNNING`, then every `on_loaded` runs. If an `on_load` fails the
    /// state goes back to `SHUT`.
    ///
    /// From `STOP`: every `on_resume` runs, then the state becomes `RUNNING`.
    pub async fn start(&self) -> Result<(), AppError> {
        match self.state() {
            AppState::Shut => {
                self.set_state(AppState::Init);
                let scripts = self.snapshot();
                if let Err(error) = self.run_batch(HookStage::Load, &scripts).await {
                    self.set_state(AppState::Shut);
                    return Err(error);
                }
                self.set_state(AppState::Running);
                self.run_batch(HookStage::Loaded, &scripts).await
            }
            AppState::Stop => {
                let scripts = self.snapshot();
                self.run_batch(HookStage::Resume, &scripts).await?;
                self.set_state(AppState::Running);
                Ok(())
            }
            AppState::Init | AppState::Running => {
                log::trace!("start() ignored while {}.", self.state());
                Ok(())
            }
        }
    }

    /// Runs one frame: every active script's `on_update`, then every active
    /// script's `on_late_update`, in registration order.
    ///
    /// Does nothing unless the application is `RUNNING`.
    pub fn update(&self, delta_time: f64) {
        if self.state() != AppState::Running {
            return;
        }
        let handle = self.handle();
        let scripts = self.snapshot();
        for script in &scripts {
            script.update(&handle, delta_time);
        }
        for script in &scripts {
            script.late_update(&handle);
        }
    }

    /// Pauses a running application: every `on_stop` runs, then the state becomes `STOP`.
    pub async fn stop(&self) -> Result<(), AppError> {
        if self.state() != AppState::Running {
            log::trace!("stop() ignored while {}.", self.state());
            return Ok(());
        }
        let scripts = self.snapshot();
        self.run_batch(HookStage::Stop, &scripts).await?;
        self.set_state(AppState::Stop);
        Ok(())
    }

    /// Tears the application down.
    ///
    /// A running application is stopped first. Every `on_destroy` then runs and
    /// the script registry is cleared. The state stays `STOP`. Does nothing in
    /// `SHUT` or `INIT`.
    pub async fn destroy(&self) -> Result<(), AppError> {
        match self.state() {
            AppState::Running => self.stop().await?,
            AppState::Stop => {}
            AppState::Shut | AppState::Init => {
                log::trace!("destroy() ignored while {}.", self.state());
                return Ok(());
            }
        }
        let scripts = self.snapshot();
        self.run_batch(HookStage::Destroy, &scripts).await?;
        self.inner.scripts.borrow_mut().clear();
        log::info!("Application destroyed ({} script(s) released).", scripts.len());
        Ok(())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("state", &self.state())
            .field("scripts", &self.script_count())
            .field("entities", &self.inner.entities.borrow().len())
            .finish()
    }
}
