use std::sync::{Arc, OnceLock};

use super::state::{Recipe, RecipesState};
use super::FEATURE_KEY;
use crate::selector::{create_selector, feature_selector, SelectorRef};

pub fn select_recipes_state() -> SelectorRef<RecipesState> {
    static SELECTOR: OnceLock<SelectorRef<RecipesState>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(FEATURE_KEY)))
}

pub fn select_recipes() -> SelectorRef<Vec<Recipe>> {
    static SELECTOR: OnceLock<SelectorRef<Vec<Recipe>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_recipes_state(),), |state: &RecipesState| {
            state.recipes.clone()
        })
    }))
}

pub fn select_recipes_error() -> SelectorRef<Option<String>> {
    static SELECTOR: OnceLock<SelectorRef<Option<String>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_recipes_state(),), |state: &RecipesState| {
            state.error.clone()
        })
    }))
}
