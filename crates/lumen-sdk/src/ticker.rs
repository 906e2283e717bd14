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

//! The built-in periodic driver.
//!
//! The [`Ticker`] is an ordinary script. Once the application is running it
//! spawns a local task that calls [`Application::update`](crate::Application::update)
//! on a fixed period. It listens to lifecycle events to pause while the
//! application is stopped, and exits on `on_destroy` or when the application
//! is dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use lumen_core::AppState;
use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::app::AppHandle;
use crate::config::{TickMode, TickerConfig};
use crate::script::{HookResult, Script};

/// Periodically drives the update dispatcher.
///
/// The ticker task is spawned with [`tokio::task::spawn_local`], so the
/// application must be started from inside a [`tokio::task::LocalSet`].
#[derive(Debug, Clone)]
pub struct Ticker {
    config: TickerConfig,
    ticks: Rc<Cell<u64>>,
    shutdown: Rc<RefCell<Option<oneshot::Sender<()>>>>,
}

impl Ticker {
    /// Creates a ticker with the given timings.
    pub fn new(config: TickerConfig) -> Self {
        Self {
            config,
            ticks: Rc::new(Cell::new(0)),
            shutdown: Rc::new(RefCell::new(None)),
        }
    }

    /// Returns the timings of this ticker.
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Returns how many frames the ticker has dispatched so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Returns `true` while the ticker task is alive.
    pub fn is_running(&self) -> bool {
        self.shutdown
            .borrow()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Builds the script that owns the ticker task.
    ///
    /// The script's `on_loaded` hook fails if no tokio runtime is entered.
    ///
    /// # Panics
    ///
    /// The `on_loaded` hook panics if a runtime is entered but the application
    /// is not driven from a [`tokio::task::LocalSet`].
    pub fn script(&self) -> Script {
        let loaded = self.clone();
        let destroyed = self.clone();
        Script::named("ticker")
            .on_loaded(move |app| {
                let spawned = loaded.spawn(app);
                async move { spawned }
            })
            .on_destroy(move |_app| {
                destroyed.shut_down();
                async { HookResult::Ok(()) }
            })
    }

    fn spawn(&self, app: AppHandle) -> HookResult {
        if self.is_running() {
            log::debug!("Ticker already running, not spawning another task.");
            return Ok(());
        }
        if tokio::runtime::Handle::try_current().is_err() {
            anyhow::bail!("the ticker needs a tokio runtime and a LocalSet to run on");
        }
        let Some(events) = app.upgrade().map(|app| app.subscribe()) else {
            return Ok(());
        };
        let (sender, receiver) = oneshot::channel();
        *self.shutdown.borrow_mut() = Some(sender);
        tokio::task::spawn_local(drive(
            app,
            self.config.clone(),
            Rc::clone(&self.ticks),
            receiver,
            events,
        ));
        Ok(())
    }

    fn shut_down(&self) {
        if let Some(sender) = self.shutdown.borrow_mut().take() {
            // The task may already be gone with its application.
            let _ = sender.send(());
        }
    }
}

/// The delta time reported for a frame, given the time since the previous one.
fn frame_delta(config: &TickerConfig, elapsed: Duration) -> Duration {
    match config.mode {
        TickMode::Fixed => config.interval(),
        TickMode::Variable => elapsed.min(config.max_delta()),
    }
}

async fn drive(
    app: AppHandle,
    config: TickerConfig,
    ticks: Rc<Cell<u64>>,
    mut shutdown: oneshot::Receiver<()>,
    events: flume::Receiver<AppState>,
) {
    let period = config.interval();
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut paused = false;
    let mut last = Instant::now();
    log::info!(
        "Ticker started: every {} ms, {:?} delta.",
        config.interval_ms,
        config.mode
    );

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,
            event = events.recv_async() => match event {
                Ok(AppState::Stop) => {
                    paused = true;
                    log::debug!("Ticker paused.");
                }
                Ok(AppState::Running) if paused => {
                    paused = false;
                    last = Instant::now();
                    interval.reset();
                    log::debug!("Ticker resumed.");
                }
                Ok(_) => {}
                Err(_) => break,
            },
            now = interval.tick() => {
                if paused {
                    continue;
                }
                let Some(app) = app.upgrade() else {
                    break;
                };
                let delta = frame_delta(&config, now - last);
                last = now;
                ticks.set(ticks.get() + 1);
                app.update(delta.as_secs_f64());
            }
        }
    }

    log::info!("Ticker stopped after {} tick(s).", ticks.get());
}
