//! Recipe book: the recipe list and its remote persistence.

pub mod actions;
mod api;
mod effects;
mod reducer;
mod selectors;
mod state;

use std::sync::Arc;

use crate::effects::Effect;

pub use api::{HttpRecipeApi, RecipeApi};
pub use effects::{FetchRecipesEffect, StoreRecipesEffect};
pub use reducer::RecipesReducer;
pub use selectors::{select_recipes, select_recipes_error, select_recipes_state};
pub use state::{Recipe, RecipesState};

pub const FEATURE_KEY: &str = "recipes";

/// Fetch and store effects sharing one API client.
pub fn recipe_effects(api: Arc<dyn RecipeApi>) -> Vec<Arc<dyn Effect>> {
    vec![
        Arc::new(FetchRecipesEffect::new(Arc::clone(&api))),
        Arc::new(StoreRecipesEffect::new(api)),
    ]
}
