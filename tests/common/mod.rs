//! Shared test utilities and fake collaborators.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use statehouse::features::api::ApiError;
use statehouse::features::auth::{AuthApi, AuthResponse, Navigator};
use statehouse::features::recipes::{Recipe, RecipeApi};
use statehouse::store::{
    define_action, Action, ActionCreator, ActionStream, Reducer, ReducerError, ReducerMap, Slice,
    Store,
};

/// Minimal slice for store-level tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
}

impl Slice for Counter {}

pub const INCREMENT: ActionCreator<i64> = define_action("[Counter] Increment");
pub const RESET: ActionCreator<()> = define_action("[Counter] Reset");
/// Always rejected by [`CounterReducer`].
pub const BREAK: ActionCreator<()> = define_action("[Counter] Break");

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = Counter;

    fn reduce(state: &Arc<Counter>, action: &Action) -> Result<Arc<Counter>, ReducerError> {
        match action.kind() {
            "[Counter] Increment" => {
                let by: i64 = action.decode()?;
                Ok(Arc::new(Counter {
                    value: state.value + by,
                }))
            }
            "[Counter] Reset" => Ok(Arc::new(Counter::default())),
            "[Counter] Break" => Err(ReducerError::Invariant("counter broke".into())),
            _ => Ok(Arc::clone(state)),
        }
    }
}

/// Store with a single `counter` slice.
pub fn counter_store() -> Store {
    Store::builder(ReducerMap::new().slice::<CounterReducer>("counter"))
        .build()
        .expect("Failed to build counter store")
}

pub fn counter_value(store: &Store) -> i64 {
    store
        .state()
        .get::<Counter>("counter")
        .expect("counter slice")
        .value
}

/// Wait until an action of type `kind` arrives on `stream`.
pub async fn wait_for_action(stream: &mut ActionStream, kind: &str) -> Action {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let dispatched = stream.recv().await.expect("Store dropped");
            if dispatched.action.kind() == kind {
                return dispatched.action;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Timed out waiting for {kind}"))
}

/// Assert no action of type `kind` is dispatched within `window`.
pub async fn assert_no_action(stream: &mut ActionStream, kind: &str, window: Duration) {
    let seen = tokio::time::timeout(window, async {
        while let Some(dispatched) = stream.recv().await {
            if dispatched.action.kind() == kind {
                return;
            }
        }
        std::future::pending::<()>().await
    })
    .await;
    assert!(seen.is_err(), "Unexpected {kind}");
}

/// In-memory recipe backend.
#[derive(Default)]
pub struct FakeRecipeApi {
    pub remote: Mutex<Vec<Recipe>>,
    pub fail_with: Mutex<Option<String>>,
    pub stored: Mutex<Vec<Vec<Recipe>>>,
}

impl FakeRecipeApi {
    pub fn with_remote(recipes: Vec<Recipe>) -> Arc<Self> {
        let api = Self::default();
        *api.remote.lock() = recipes;
        Arc::new(api)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let api = Self::default();
        *api.fail_with.lock() = Some(message.to_string());
        Arc::new(api)
    }
}

#[async_trait]
impl RecipeApi for FakeRecipeApi {
    async fn fetch(&self) -> Result<Vec<Recipe>, ApiError> {
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(ApiError::Status {
                status: 500,
                message,
            });
        }
        Ok(self.remote.lock().clone())
    }

    async fn store(&self, recipes: &[Recipe]) -> Result<(), ApiError> {
        self.stored.lock().push(recipes.to_vec());
        Ok(())
    }
}

/// Identity backend that accepts every password unless told to reject
/// with an error code.
#[derive(Default)]
pub struct FakeAuthApi {
    pub reject_with: Mutex<Option<String>>,
    pub expires_in: Mutex<Option<String>>,
    pub calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeAuthApi {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(code: &str) -> Arc<Self> {
        let api = Self::default();
        *api.reject_with.lock() = Some(code.to_string());
        Arc::new(api)
    }

    fn answer(&self, method: &'static str, email: &str) -> Result<AuthResponse, ApiError> {
        self.calls.lock().push((method, email.to_string()));
        if let Some(code) = self.reject_with.lock().clone() {
            return Err(ApiError::Rejected { code });
        }
        Ok(AuthResponse {
            id_token: format!("token-{email}"),
            email: email.to_string(),
            refresh_token: String::new(),
            expires_in: self
                .expires_in
                .lock()
                .clone()
                .unwrap_or_else(|| "3600".to_string()),
            local_id: format!("id-{email}"),
            registered: None,
        })
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn signup(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.answer("signup", email)
    }

    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.answer("login", email)
    }
}

/// Navigator that records every route.
#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.routes.lock().push(path.to_string());
    }
}
