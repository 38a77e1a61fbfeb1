use std::sync::Arc;

use async_trait::async_trait;

use super::actions::{types, FETCH_RECIPES_FAIL, SET_RECIPES};
use super::api::RecipeApi;
use super::selectors::select_recipes;
use crate::effects::{Concurrency, Effect, EffectError};
use crate::store::{Action, StateTree};

/// Loads recipes on `FETCH_RECIPES` and dispatches `SET_RECIPES`.
pub struct FetchRecipesEffect {
    api: Arc<dyn RecipeApi>,
}

impl FetchRecipesEffect {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Effect for FetchRecipesEffect {
    fn name(&self) -> &str {
        "recipes.fetch"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::FETCH_RECIPES]
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::LatestOnly
    }

    async fn run(&self, _action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        let recipes = self
            .api
            .fetch()
            .await
            .map_err(|e| EffectError::failed(e.to_string()))?;
        tracing::info!(count = recipes.len(), "Recipes fetched");
        Ok(vec![SET_RECIPES.create(recipes)?])
    }

    fn on_error(&self, _trigger: &Action, error: &EffectError) -> Option<Action> {
        FETCH_RECIPES_FAIL.create(error.to_string()).ok()
    }
}

/// Saves the recipes of the post-trigger state on `STORE_RECIPES`.
pub struct StoreRecipesEffect {
    api: Arc<dyn RecipeApi>,
}

impl StoreRecipesEffect {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Effect for StoreRecipesEffect {
    fn name(&self) -> &str {
        "recipes.store"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::STORE_RECIPES]
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::LatestOnly
    }

    fn dispatches(&self) -> bool {
        false
    }

    async fn run(&self, _action: Action, state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        let recipes = select_recipes()
            .select(&state)
            .map_err(|e| EffectError::failed(e.to_string()))?;
        self.api
            .store(&recipes)
            .await
            .map_err(|e| EffectError::failed(e.to_string()))?;
        tracing::info!(count = recipes.len(), "Recipes stored");
        Ok(Vec::new())
    }
}
