mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use common::{assert_no_action, wait_for_action, FakeAuthApi, RecordingNavigator};
use statehouse::effects::{register_effects, EffectsRuntime};
use statehouse::features::auth::actions::{
    types, AuthSuccess, Credentials, AUTO_LOGIN, CLEAR_ERROR, LOGIN_START, LOGOUT, SIGNUP_START,
};
use statehouse::features::auth::{
    self, auth_effects, select_auth_error, select_auth_token, select_is_authenticated,
    AuthReducer, MemorySessionStorage, SessionStorage, User,
};
use statehouse::store::{ReducerMap, Store};

struct Harness {
    store: Store,
    storage: Arc<MemorySessionStorage>,
    navigator: Arc<RecordingNavigator>,
    _runtime: EffectsRuntime,
}

fn harness(api: Arc<FakeAuthApi>) -> Harness {
    harness_with_storage(api, Arc::new(MemorySessionStorage::new()))
}

fn harness_with_storage(api: Arc<FakeAuthApi>, storage: Arc<MemorySessionStorage>) -> Harness {
    let store = Store::builder(ReducerMap::new().slice::<AuthReducer>(auth::FEATURE_KEY))
        .build()
        .unwrap();
    let navigator = Arc::new(RecordingNavigator::default());
    let shared_storage: Arc<MemorySessionStorage> = Arc::clone(&storage);
    let shared_navigator: Arc<RecordingNavigator> = Arc::clone(&navigator);
    let runtime = register_effects(&store, auth_effects(api, shared_storage, shared_navigator));
    Harness {
        store,
        storage,
        navigator,
        _runtime: runtime,
    }
}

fn stored_user(expires_in: chrono::Duration) -> User {
    User {
        email: "ada@example.com".into(),
        id: "id-ada".into(),
        token: "stored-token".into(),
        token_expiration_date: Utc::now() + expires_in,
    }
}

async fn wait_for_route(navigator: &RecordingNavigator, route: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !navigator.routes().iter().any(|r| r == route) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("never navigated to {route}"));
}

/// Test that a successful login stores the session, signs the user in and
/// navigates home.
#[tokio::test]
async fn test_login_success() {
    let api = FakeAuthApi::accepting();
    let h = harness(Arc::clone(&api));
    let mut actions = h.store.actions();

    h.store
        .dispatch(LOGIN_START.create(Credentials::new("ada@example.com", "pw")).unwrap())
        .unwrap();
    let success = wait_for_action(&mut actions, types::AUTHENTICATE_SUCCESS).await;

    let success: AuthSuccess = success.decode().unwrap();
    assert!(success.redirect);
    assert_eq!(success.token, "token-ada@example.com");
    assert!(*h.store.select(select_is_authenticated()).get().unwrap());
    assert_eq!(
        h.storage.load().unwrap().map(|u| u.email),
        Some("ada@example.com".to_string())
    );
    assert_eq!(*api.calls.lock(), [("login", "ada@example.com".to_string())]);
    wait_for_route(&h.navigator, "/").await;
}

#[tokio::test]
async fn test_signup_calls_signup_endpoint() {
    let api = FakeAuthApi::accepting();
    let h = harness(Arc::clone(&api));
    let mut actions = h.store.actions();

    h.store
        .dispatch(SIGNUP_START.create(Credentials::new("new@example.com", "pw")).unwrap())
        .unwrap();
    wait_for_action(&mut actions, types::AUTHENTICATE_SUCCESS).await;
    assert_eq!(api.calls.lock()[0].0, "signup");
}

/// Test that a rejection becomes a user-facing error and CLEAR_ERROR resets it.
#[tokio::test]
async fn test_rejected_login_sets_error() {
    let h = harness(FakeAuthApi::rejecting("EMAIL_NOT_FOUND"));
    let mut actions = h.store.actions();

    h.store
        .dispatch(LOGIN_START.create(Credentials::new("who@example.com", "pw")).unwrap())
        .unwrap();
    wait_for_action(&mut actions, types::AUTHENTICATE_FAIL).await;

    assert_eq!(
        h.store.select(select_auth_error()).get().unwrap().as_deref(),
        Some("This email does not exist.")
    );
    assert!(h.storage.load().unwrap().is_none());

    h.store.dispatch(CLEAR_ERROR.empty()).unwrap();
    assert_eq!(*h.store.select(select_auth_error()).get().unwrap(), None);
}

#[tokio::test]
async fn test_unparseable_expiry_is_unknown_error() {
    let api = FakeAuthApi::accepting();
    *api.expires_in.lock() = Some("soon".into());
    let h = harness(api);
    let mut actions = h.store.actions();

    h.store
        .dispatch(LOGIN_START.create(Credentials::new("ada@example.com", "pw")).unwrap())
        .unwrap();
    wait_for_action(&mut actions, types::AUTHENTICATE_FAIL).await;
    assert_eq!(
        h.store.select(select_auth_error()).get().unwrap().as_deref(),
        Some("An unknown error occurred!")
    );
}

/// Test that auto-login restores a stored session without redirecting.
#[tokio::test]
async fn test_auto_login_restores_session() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.save(&stored_user(chrono::Duration::hours(1))).unwrap();
    let h = harness_with_storage(FakeAuthApi::accepting(), storage);
    let mut actions = h.store.actions();

    h.store.dispatch(AUTO_LOGIN.empty()).unwrap();
    let success: AuthSuccess = wait_for_action(&mut actions, types::AUTHENTICATE_SUCCESS)
        .await
        .decode()
        .unwrap();

    assert!(!success.redirect);
    assert_eq!(
        h.store.select(select_auth_token()).get().unwrap().as_deref(),
        Some("stored-token")
    );
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_auto_login_without_session_does_nothing() {
    let h = harness(FakeAuthApi::accepting());
    let mut actions = h.store.actions();
    h.store.dispatch(AUTO_LOGIN.empty()).unwrap();
    assert_no_action(&mut actions, types::AUTHENTICATE_SUCCESS, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_auto_login_ignores_expired_session() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.save(&stored_user(chrono::Duration::hours(-1))).unwrap();
    let h = harness_with_storage(FakeAuthApi::accepting(), storage);
    let mut actions = h.store.actions();

    h.store.dispatch(AUTO_LOGIN.empty()).unwrap();
    assert_no_action(&mut actions, types::AUTHENTICATE_SUCCESS, Duration::from_millis(100)).await;
    assert!(!*h.store.select(select_is_authenticated()).get().unwrap());
}

#[tokio::test]
async fn test_logout_clears_session_and_navigates() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.save(&stored_user(chrono::Duration::hours(1))).unwrap();
    let h = harness_with_storage(FakeAuthApi::accepting(), storage);

    h.store.dispatch(LOGOUT.empty()).unwrap();
    wait_for_route(&h.navigator, "/auth").await;

    assert!(h.storage.load().unwrap().is_none());
    assert!(!*h.store.select(select_is_authenticated()).get().unwrap());
}

/// Test that the session ends on its own once the token expires.
#[tokio::test(start_paused = true)]
async fn test_auto_logout_after_expiry() {
    let api = FakeAuthApi::accepting();
    *api.expires_in.lock() = Some("2".into());
    let h = harness(api);
    let mut actions = h.store.actions();

    h.store
        .dispatch(LOGIN_START.create(Credentials::new("ada@example.com", "pw")).unwrap())
        .unwrap();
    wait_for_action(&mut actions, types::AUTHENTICATE_SUCCESS).await;
    wait_for_action(&mut actions, types::LOGOUT).await;

    assert!(!*h.store.select(select_is_authenticated()).get().unwrap());
}

/// Test that logging out by hand cancels the pending expiry logout.
#[tokio::test(start_paused = true)]
async fn test_manual_logout_cancels_timer() {
    let api = FakeAuthApi::accepting();
    *api.expires_in.lock() = Some("2".into());
    let h = harness(api);
    let mut actions = h.store.actions();

    h.store
        .dispatch(LOGIN_START.create(Credentials::new("ada@example.com", "pw")).unwrap())
        .unwrap();
    wait_for_action(&mut actions, types::AUTHENTICATE_SUCCESS).await;

    h.store.dispatch(LOGOUT.empty()).unwrap();
    let mut later = h.store.actions();
    assert_no_action(&mut later, types::LOGOUT, Duration::from_secs(5)).await;
}
