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


use lumen_sdk::{AppError, AppHandle, Application, Component, ComponentError, HookResult, Script};

#[derive(Debug, Clone, PartialEq)]
struct Health(u32);
impl Component for Health {}

#[derive(Debug, Clone, PartialEq)]
struct Tag(&'static str);
impl Component for Tag {}

#[test]
fn created_entities_are_alive_and_observed() {
    let app = Application::new();

    let first = app.entity();
    let second = app.entity();

    assert_ne!(first, second);
    assert!(app.with_entities(|entities| entities.is_alive(first) && entities.is_alive(second)));
    assert!(app.with_components(|components| components.is_observed(first)));
    assert!(app.with_components(|components| components.is_observed(second)));
}

#[test]
fn despawn_drops_the_entity_and_its_components() {
    // --- 1. ARRANGE ---
    let app = Application::new();
    let health = app.component::<Health>("health", None).unwrap();
    let entity = app.entity();
    app.with_components(|components| components.attach(entity, &health, Some(Health(5))))
        .unwrap();

    // --- 2. ACT ---
    let despawned = app.despawn(entity);

    // --- 3. ASSERT ---
    assert!(despawned);
    assert!(!app.with_entities(|entities| entities.is_alive(entity)));
    assert!(!app.with_components(|components| components.is_observed(entity)));
    assert_eq!(
        app.with_components(|components| components.get(entity, &health).cloned()),
        None
    );
    let reattached =
        app.with_components(|components| components.attach(entity, &health, Some(Health(1))));
    assert_eq!(reattached, Err(ComponentError::EntityNotObserved(entity)));
}

#[test]
fn despawning_a_stale_id_leaves_the_recycled_entity_alone() {
    let app = Application::new();
    let tag = app.component::<Tag>("tag", None).unwrap();
    let stale = app.entity();
    assert!(app.despawn(stale));

    let recycled = app.entity();
    app.with_components(|components| components.attach(recycled, &tag, Some(Tag("fresh"))))
        .unwrap();

    assert!(!app.despawn(stale));
    assert!(!app.despawn(stale), "Despawning twice is a no-op");
    assert_eq!(
        app.with_components(|components| components.get(recycled, &tag).cloned()),
        Some(Tag("fresh"))
    );
}

#[test]
fn component_initializer_builds_default_values() {
    // --- 1. ARRANGE ---
    let app = Application::new();
    let health = app
        .component::<Health>("health", Some(Box::new(|_| Health(100))))
        .unwrap();
    let entity = app.entity();

    // --- 2. ACT ---
    let attached = app.with_components(|components| components.attach(entity, &health, None));

    // --- 3. ASSERT ---
    assert_eq!(attached, Ok(()));
    assert_eq!(
        app.with_components(|components| components.get(entity, &health).cloned()),
        Some(Health(100))
    );
}

#[test]
fn explicit_value_wins_over_initializer() {
    let app = Application::new();
    let health = app
        .component::<Health>("health", Some(Box::new(|_| Health(100))))
        .unwrap();
    let entity = app.entity();

    app.with_components(|components| components.attach(entity, &health, Some(Health(7))))
        .unwrap();

    let value = app.with_components(|components| components.get(entity, &health).cloned());
    assert_eq!(value, Some(Health(7)));
}

#[test]
fn registering_a_name_twice_with_another_type_is_rejected() {
    let app = Application::new();
    app.component::<Health>("shared", None).unwrap();

    let result = app.component::<Tag>("shared", None);

    assert!(matches!(
        result,
        Err(AppError::Component(ComponentError::NameConflict { ref name, .. })) if name == "shared"
    ));
}

#[test]
fn registering_the_same_kind_again_returns_the_same_id() {
    let app = Application::new();
    let first = app.component::<Tag>("tag", None).unwrap();
    let second = app.component::<Tag>("tag", None).unwrap();

    assert_eq!(first.id(), second.id());
}

#[test]
fn attach_without_initializer_or_value_fails() {
    let app = Application::new();
    let tag = app.component::<Tag>("tag", None).unwrap();
    let entity = app.entity();

    let result = app.with_components(|components| components.attach(entity, &tag, None));

    assert_eq!(result, Err(ComponentError::MissingInitializer("tag".to_string())));
}

#[tokio::test]
async fn scripts_reach_the_facade_through_their_handle() {
    // --- 1. ARRANGE ---
    let app = Application::new();
    let health = app
        .component::<Health>("health", Some(Box::new(|_| Health(10))))
        .unwrap();
    let script = Script::named("spawner").on_load(move |handle: AppHandle| async move {
        let app = handle.upgrade().ok_or_else(|| anyhow::anyhow!("application dropped"))?;
        let entity = app.entity();
        app.with_components(|components| components.attach(entity, &health, None))?;
        HookResult::Ok(())
    });
    app.script(script).await.unwrap();

    // --- 2. ACT ---
    app.start().await.unwrap();

    // --- 3. ASSERT ---
    let spawned = app.with_entities(|entities| entities.iter().collect::<Vec<_>>());
    assert_eq!(spawned.len(), 1);
    let value = app.with_components(|components| components.get(spawned[0], &health).cloned());
    assert_eq!(value, Some(Health(10)));
}
