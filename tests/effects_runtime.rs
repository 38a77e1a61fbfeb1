mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use common::{assert_no_action, counter_store, counter_value, wait_for_action, FakeRecipeApi, INCREMENT};
use statehouse::effects::{
    register_effects, Concurrency, EffectDefinition, EffectError, EffectFailure, EFFECTS_INIT,
    EFFECT_FAILED,
};
use statehouse::features::recipes::actions::{types as recipe_types, FETCH_RECIPES};
use statehouse::features::recipes::{
    self, select_recipes, FetchRecipesEffect, Recipe, RecipesReducer, RecipesState,
};
use statehouse::store::{define_action, Action, ActionCreator, ReducerMap, Store};

const GO: ActionCreator<u32> = define_action("[Test] Go");
const DONE: ActionCreator<u32> = define_action("[Test] Done");

/// `DONE` carrying `n`.
fn done(n: u32) -> Result<Vec<Action>, EffectError> {
    Ok(vec![DONE.create(n)?])
}

/// `DONE` echoing the payload of a `GO` trigger.
fn echo(action: &Action) -> Result<Vec<Action>, EffectError> {
    done(GO.payload_of(action)?)
}

fn recipes_store() -> Store {
    Store::builder(ReducerMap::new().slice::<RecipesReducer>(recipes::FEATURE_KEY))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_register_dispatches_effects_init() {
    let store = counter_store();
    let mut actions = store.actions();
    let runtime = register_effects(&store, Vec::new());
    assert!(runtime.is_empty());
    wait_for_action(&mut actions, EFFECTS_INIT).await;
}

/// Test that a fetch resolving with recipes ends in SET_RECIPES and the
/// slice holding exactly those recipes.
#[tokio::test]
async fn test_fetch_recipes_sets_state() {
    let store = recipes_store();
    let remote = vec![Recipe {
        id: Some(1),
        ..Recipe::new("Schnitzel", "Crispy")
    }];
    let api = FakeRecipeApi::with_remote(remote.clone());
    let _runtime = register_effects(&store, vec![Arc::new(FetchRecipesEffect::new(api))]);
    let mut actions = store.actions();

    store.dispatch(FETCH_RECIPES.empty()).unwrap();
    wait_for_action(&mut actions, recipe_types::SET_RECIPES).await;

    assert_eq!(*store.select(select_recipes()).get().unwrap(), remote);
    assert_eq!(
        *store.state().get::<RecipesState>(recipes::FEATURE_KEY).unwrap(),
        RecipesState {
            recipes: remote,
            error: None
        }
    );
}

/// Test that a newer trigger cancels the in-flight run so only the second
/// trigger produces a result.
#[tokio::test]
async fn test_latest_only_discards_superseded_run() {
    let store = counter_store();
    let gate = Arc::new(Notify::new());
    let held = Arc::clone(&gate);
    let effect = EffectDefinition::new("latest")
        .triggers([GO.kind()])
        .concurrency(Concurrency::LatestOnly)
        .handler(move |action, _state| {
            let gate = Arc::clone(&held);
            async move {
                if GO.payload_of(&action).ok() == Some(1) {
                    gate.notified().await;
                }
                echo(&action)
            }
        });
    let _runtime = register_effects(&store, vec![effect]);
    let mut actions = store.actions();

    store.dispatch(GO.create(1).unwrap()).unwrap();
    store.dispatch(GO.create(2).unwrap()).unwrap();

    let done = wait_for_action(&mut actions, DONE.kind()).await;
    assert_eq!(DONE.payload_of(&done).unwrap(), 2);

    gate.notify_waiters();
    assert_no_action(&mut actions, DONE.kind(), Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_serial_runs_one_at_a_time_in_order() {
    let store = counter_store();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (in_flight_c, peak_c) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let effect = EffectDefinition::new("serial")
        .triggers([GO.kind()])
        .concurrency(Concurrency::Serial)
        .handler(move |action, _state| {
            let in_flight = Arc::clone(&in_flight_c);
            let peak = Arc::clone(&peak_c);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                echo(&action)
            }
        });
    let _runtime = register_effects(&store, vec![effect]);
    let mut actions = store.actions();

    for n in 1..=3 {
        store.dispatch(GO.create(n).unwrap()).unwrap();
    }
    let mut order = Vec::new();
    for _ in 0..3 {
        let done = wait_for_action(&mut actions, DONE.kind()).await;
        order.push(DONE.payload_of(&done).unwrap());
    }

    assert_eq!(order, [1, 2, 3]);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

/// Test that a failing effect reports through EFFECT_FAILED while the store
/// and other effects keep working.
#[tokio::test]
async fn test_failure_is_isolated() {
    let store = counter_store();
    let failing = EffectDefinition::new("failing")
        .triggers([GO.kind()])
        .handler(|_action, _state| async { Err(EffectError::failed("boom")) });
    let echo = EffectDefinition::new("echo")
        .triggers([GO.kind()])
        .handler(|action, _state| async move { echo(&action) });
    let _runtime = register_effects(&store, vec![failing, echo]);
    let mut actions = store.actions();
    let mut failures = store.actions();

    store.dispatch(GO.create(7).unwrap()).unwrap();

    let failed = wait_for_action(&mut failures, EFFECT_FAILED.kind()).await;
    assert_eq!(
        EFFECT_FAILED.payload_of(&failed).unwrap(),
        EffectFailure {
            effect: "failing".into(),
            trigger: "[Test] Go".into(),
            message: "boom".into(),
        }
    );
    wait_for_action(&mut actions, DONE.kind()).await;

    store.dispatch(INCREMENT.create(1).unwrap()).unwrap();
    assert_eq!(counter_value(&store), 1);
}

#[tokio::test]
async fn test_panic_becomes_failure() {
    let store = counter_store();
    let effect = EffectDefinition::new("panicky")
        .triggers([GO.kind()])
        .handler(|_action, _state| async {
            if true {
                panic!("handler exploded");
            }
            done(1)
        });
    let _runtime = register_effects(&store, vec![effect]);
    let mut actions = store.actions();

    store.dispatch(GO.create(1).unwrap()).unwrap();
    let failed = wait_for_action(&mut actions, EFFECT_FAILED.kind()).await;
    let failure = EFFECT_FAILED.payload_of(&failed).unwrap();
    assert!(failure.message.contains("handler exploded"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_becomes_failure_with_custom_action() {
    let store = counter_store();
    let effect = EffectDefinition::new("slow")
        .triggers([GO.kind()])
        .timeout(Duration::from_secs(1))
        .on_error(|_trigger, error| {
            assert!(matches!(error, EffectError::Timeout(_)));
            DONE.create(0).ok()
        })
        .handler(|_action, _state| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            done(1)
        });
    let _runtime = register_effects(&store, vec![effect]);
    let mut actions = store.actions();

    store.dispatch(GO.create(1).unwrap()).unwrap();
    let done = wait_for_action(&mut actions, DONE.kind()).await;
    assert_eq!(DONE.payload_of(&done).unwrap(), 0);
}

#[tokio::test]
async fn test_non_dispatching_effect_results_are_dropped() {
    let store = counter_store();
    let ran = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&ran);
    let effect = EffectDefinition::new("side-effect")
        .triggers([GO.kind()])
        .non_dispatching()
        .handler(move |_action, _state| {
            *counter.lock() += 1;
            async { done(1) }
        });
    let _runtime = register_effects(&store, vec![effect]);
    let mut actions = store.actions();

    store.dispatch(GO.create(1).unwrap()).unwrap();
    assert_no_action(&mut actions, DONE.kind(), Duration::from_millis(100)).await;
    assert_eq!(*ran.lock(), 1);
}

#[tokio::test]
async fn test_shutdown_stops_reacting() {
    let store = counter_store();
    let effect = EffectDefinition::new("echo")
        .triggers([GO.kind()])
        .handler(|action, _state| async move { echo(&action) });
    let runtime = register_effects(&store, vec![effect]);
    assert_eq!(runtime.len(), 1);
    runtime.shutdown().await;

    let mut actions = store.actions();
    store.dispatch(GO.create(1).unwrap()).unwrap();
    assert_no_action(&mut actions, DONE.kind(), Duration::from_millis(50)).await;
}
