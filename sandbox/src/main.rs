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


// Lumen Sandbox
// Runs a small application through start, pause, resume and teardown.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use lumen_sdk::prelude::*;
use lumen_sdk::{logging, AppState, TickMode, TickerConfig};
use tokio::task::LocalSet;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/lumen.json");

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f64,
    y: f64,
}

impl Component for Position {}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    dx: f64,
    dy: f64,
}

impl Component for Velocity {}

fn load_config() -> AppConfig {
    match AppConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("Using default configuration: {error}");
            AppConfig {
                use_ticker: true,
                ticker: TickerConfig {
                    mode: TickMode::Fixed,
                    ..TickerConfig::default()
                },
            }
        }
    }
}

/// Spawns a moving entity on load and integrates its position every frame.
fn mover(position: ComponentKind<Position>, velocity: ComponentKind<Velocity>) -> Script {
    let body = Rc::new(Cell::new(None::<EntityId>));
    let spawned = Rc::clone(&body);
    let reported = Rc::clone(&body);

    Script::named("mover")
        .on_load(move |handle: AppHandle| {
            let spawned = Rc::clone(&spawned);
            async move {
                let app = handle
                    .upgrade()
                    .ok_or_else(|| anyhow::anyhow!("application dropped during load"))?;
                let entity = app.entity();
                app.with_components(|components| {
                    components.attach(entity, &position, None)?;
                    components.attach(entity, &velocity, Some(Velocity { dx: 1.0, dy: 0.5 }))
                })?;
                spawned.set(Some(entity));
                log::info!("Spawned entity {entity}.");
                HookResult::Ok(())
            }
        })
        .on_update(move |handle, dt| {
            let (Some(app), Some(entity)) = (handle.upgrade(), body.get()) else {
                return;
            };
            app.with_components(|components| {
                let Some(&Velocity { dx, dy }) = components.get(entity, &velocity) else {
                    return;
                };
                if let Some(position) = components.get_mut(entity, &position) {
                    position.x += dx * dt;
                    position.y += dy * dt;
                }
            });
        })
        .on_stop(move |handle: AppHandle| {
            let reported = Rc::clone(&reported);
            async move {
                if let (Some(app), Some(entity)) = (handle.upgrade(), reported.get()) {
                    if let Some(p) = app.with_components(|c| c.get(entity, &position).copied()) {
                        log::info!("Entity {entity} paused at ({:.3}, {:.3}).", p.x, p.y);
                    }
                }
                HookResult::Ok(())
            }
        })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init("info");
    log::info!("Starting Lumen sandbox...");

    LocalSet::new().run_until(run()).await?;

    log::info!("Sandbox finished.");
    Ok(())
}

async fn run() -> Result<()> {
    let app = Application::with_config(load_config())?;

    let position = app.component::<Position>(
        "position",
        Some(Box::new(|_| Position { x: 0.0, y: 0.0 })),
    )?;
    let velocity = app.component::<Velocity>("velocity", None)?;
    app.script(mover(position, velocity)).await?;

    let transitions = app.subscribe();

    app.start().await?;
    tokio::time::sleep(Duration::from_millis(250)).await;

    app.stop().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    app.start().await?;
    tokio::time::sleep(Duration::from_millis(250)).await;

    app.destroy().await?;

    let states: Vec<AppState> = transitions.try_iter().collect();
    log::info!(
        "Transitions: {}",
        states
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    if let Some(ticker) = app.ticker() {
        log::info!("Ticker dispatched {} frame(s).", ticker.ticks());
    }
    Ok(())
}
