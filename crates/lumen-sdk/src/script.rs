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

//! Scripts: logic units driven by the application lifecycle.
//!
//! A [`Script`] is a capability record. Every lifecycle hook is an optional
//! slot; the application checks for presence before invoking, so a script may
//! implement any subset of hooks.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::app::AppHandle;

/// Result type returned by every suspending hook.
pub type HookResult = anyhow::Result<()>;

/// A pending suspending hook.
pub type HookFuture = LocalBoxFuture<'static, HookResult>;

type AsyncHook = Box<dyn FnMut(AppHandle) -> HookFuture>;
type InstallHook = Box<dyn FnMut(&AppHandle)>;
type UpdateHook = Box<dyn FnMut(&AppHandle, f64)>;
type LateUpdateHook = Box<dyn FnMut(&AppHandle)>;

/// The suspending hooks, run in batches by the lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// First half of startup, state `INIT`.
    Load,
    /// Second half of startup, state already `RUNNING`.
    Loaded,
    /// Restart from `STOP`.
    Resume,
    /// Pause from `RUNNING`.
    Stop,
    /// Teardown.
    Destroy,
}

impl HookStage {
    /// The hook's name, as it appears in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            HookStage::Load => "on_load",
            HookStage::Loaded => "on_loaded",
            HookStage::Resume => "on_resume",
            HookStage::Stop => "on_stop",
            HookStage::Destroy => "on_destroy",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Default)]
struct ScriptHooks {
    on_installed: Option<InstallHook>,
    on_load: Option<AsyncHook>,
    on_loaded: Option<AsyncHook>,
    on_update: Option<UpdateHook>,
    on_late_update: Option<LateUpdateHook>,
    on_resume: Option<AsyncHook>,
    on_stop: Option<AsyncHook>,
    on_destroy: Option<AsyncHook>,
}

fn async_slot(hooks: &mut ScriptHooks, stage: HookStage) -> &mut Option<AsyncHook> {
    match stage {
        HookStage::Load => &mut hooks.on_load,
        HookStage::Loaded => &mut hooks.on_loaded,
        HookStage::Resume => &mut hooks.on_resume,
        HookStage::Stop => &mut hooks.on_stop,
        HookStage::Destroy => &mut hooks.on_destroy,
    }
}

#[derive(Default)]
struct ScriptSlot {
    label: Option<String>,
    actived: Option<bool>,
    app: Option<AppHandle>,
    hooks: ScriptHooks,
}

/// A shared handle to a logic unit.
///
/// Cloning the handle does not clone the script: both handles refer to the same
/// hooks and flags. Registering the same handle twice therefore registers the
/// same script twice, and its hooks run once per registration.
///
/// ```rust
/// use lumen_sdk::{HookResult, Script};
///
/// let script = Script::named("spinner")
///     .on_load(|_app| async { HookResult::Ok(()) })
///     .on_update(|_app, dt| log::trace!("spin by {dt}"));
/// assert_eq!(script.label(), "spinner");
/// ```
#[derive(Clone, Default)]
pub struct Script(Rc<RefCell<ScriptSlot>>);

impl Script {
    /// Creates a script with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script with a label used in diagnostics.
    pub fn named(label: impl Into<String>) -> Self {
        let script = Self::new();
        script.0.borrow_mut().label = Some(label.into());
        script
    }

    /// Sets the active flag before registration.
    ///
    /// Left unset, registration turns it on.
    pub fn active(self, active: bool) -> Self {
        self.0.borrow_mut().actived = Some(active);
        self
    }

    /// Installs the `on_installed` hook, run synchronously at registration.
    pub fn on_installed(self, hook: impl FnMut(&AppHandle) + 'static) -> Self {
        self.0.borrow_mut().hooks.on_installed = Some(Box::new(hook));
        self
    }

    /// Installs the `on_load` hook.
    pub fn on_load<F, Fut>(self, hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.with_async(HookStage::Load, hook)
    }

    /// Installs the `on_loaded` hook.
    pub fn on_loaded<F, Fut>(self, hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.with_async(HookStage::Loaded, hook)
    }

    /// Installs the `on_resume` hook.
    pub fn on_resume<F, Fut>(self, hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.with_async(HookStage::Resume, hook)
    }

    /// Installs the `on_stop` hook.
    pub fn on_stop<F, Fut>(self, hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.with_async(HookStage::Stop, hook)
    }

    /// Installs the `on_destroy` hook.
    pub fn on_destroy<F, Fut>(self, hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.with_async(HookStage::Destroy, hook)
    }

    /// Installs the per-frame `on_update` hook. It receives the delta time in seconds.
    pub fn on_update(self, hook: impl FnMut(&AppHandle, f64) + 'static) -> Self {
        self.0.borrow_mut().hooks.on_update = Some(Box::new(hook));
        self
    }

    /// Installs the per-frame `on_late_update` hook.
    pub fn on_late_update(self, hook: impl FnMut(&AppHandle) + 'static) -> Self {
        self.0.borrow_mut().hooks.on_late_update = Some(Box::new(hook));
        self
    }

    fn with_async<F, Fut>(self, stage: HookStage, mut hook: F) -> Self
    where
        F: FnMut(AppHandle) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        let boxed: AsyncHook = Box::new(move |app| -> HookFuture { Box::pin(hook(app)) });
        *async_slot(&mut self.0.borrow_mut().hooks, stage) = Some(boxed);
        self
    }

    /// Turns per-frame participation on or off.
    pub fn set_active(&self, active: bool) {
        self.0.borrow_mut().actived = Some(active);
    }

    /// Returns `true` if the script takes part in update passes.
    ///
    /// An unregistered script with an unset flag reports `false`.
    pub fn is_active(&self) -> bool {
        self.0.borrow().actived == Some(true)
    }

    /// Returns the application this script was registered with.
    pub fn app(&self) -> Option<AppHandle> {
        self.0.borrow().app.clone()
    }

    /// Returns the diagnostic label.
    pub fn label(&self) -> String {
        self.0
            .borrow()
            .label
            .clone()
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    /// Returns `true` if both handles refer to the same script.
    pub fn ptr_eq(&self, other: &Script) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Binds the script to its application and defaults the active flag.
    pub(crate) fn bind(&self, app: AppHandle) {
        let mut slot = self.0.borrow_mut();
        slot.actived.get_or_insert(true);
        slot.app = Some(app);
    }

    // Hooks are taken out of their slot while they run, so a hook may freely use
    // its own handle. A hook that is already running is not entered again.

    pub(crate) fn installed(&self, app: &AppHandle) {
        let Some(mut hook) = self.0.borrow_mut().hooks.on_installed.take() else {
            return;
        };
        hook(app);
        self.0
            .borrow_mut()
            .hooks
            .on_installed
            .get_or_insert(hook);
    }

    /// Starts a suspending hook, returning its future if the slot is filled.
    pub(crate) fn begin(&self, stage: HookStage, app: &AppHandle) -> Option<HookFuture> {
        let mut hook = async_slot(&mut self.0.borrow_mut().hooks, stage).take()?;
        let pending = hook(app.clone());
        async_slot(&mut self.0.borrow_mut().hooks, stage).get_or_insert(hook);
        Some(pending)
    }

    pub(crate) fn update(&self, app: &AppHandle, delta_time: f64) {
        if !self.is_active() {
            return;
        }
        let Some(mut hook) = self.0.borrow_mut().hooks.on_update.take() else {
            return;
        };
        hook(app, delta_time);
        self.0.borrow_mut().hooks.on_update.get_or_insert(hook);
    }

    pub(crate) fn late_update(&self, app: &AppHandle) {
        if !self.is_active() {
            return;
        }
        let Some(mut hook) = self.0.borrow_mut().hooks.on_late_update.take() else {
            return;
        };
        hook(app);
        self.0
            .borrow_mut()
            .hooks
            .on_late_update
            .get_or_insert(hook);
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.0.borrow();
        let hooks = &slot.hooks;
        let present: Vec<&str> = [
            ("on_installed", hooks.on_installed.is_some()),
            ("on_load", hooks.on_load.is_some()),
            ("on_loaded", hooks.on_loaded.is_some()),
            ("on_update", hooks.on_update.is_some()),
            ("on_late_update", hooks.on_late_update.is_some()),
            ("on_resume", hooks.on_resume.is_some()),
            ("on_stop", hooks.on_stop.is_some()),
            ("on_destroy", hooks.on_destroy.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        f.debug_struct("Script")
            .field("label", &slot.label)
            .field("actived", &slot.actived)
            .field("bound", &slot.app.is_some())
            .field("hooks", &present)
            .finish()
    }
}
