use serde::{Deserialize, Serialize};

use super::state::Recipe;
use crate::store::{define_action, ActionCreator};

pub mod types {
    pub const SET_RECIPES: &str = "[Recipes] Set Recipes";
    pub const FETCH_RECIPES: &str = "[Recipes] Fetch Recipes";
    pub const FETCH_RECIPES_FAIL: &str = "[Recipes] Fetch Recipes Fail";
    pub const ADD_RECIPE: &str = "[Recipe] Add Recipe";
    pub const UPDATE_RECIPE: &str = "[Recipe] Update Recipe";
    pub const DELETE_RECIPE: &str = "[Recipe] Delete Recipe";
    pub const STORE_RECIPES: &str = "[Recipe] Store Recipes";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipe {
    pub index: usize,
    pub new_recipe: Recipe,
}

pub const SET_RECIPES: ActionCreator<Vec<Recipe>> = define_action(types::SET_RECIPES);
pub const FETCH_RECIPES: ActionCreator<()> = define_action(types::FETCH_RECIPES);
/// Carries the failure message of a fetch.
pub const FETCH_RECIPES_FAIL: ActionCreator<String> = define_action(types::FETCH_RECIPES_FAIL);
pub const ADD_RECIPE: ActionCreator<Recipe> = define_action(types::ADD_RECIPE);
pub const UPDATE_RECIPE: ActionCreator<UpdateRecipe> = define_action(types::UPDATE_RECIPE);
pub const DELETE_RECIPE: ActionCreator<usize> = define_action(types::DELETE_RECIPE);
pub const STORE_RECIPES: ActionCreator<()> = define_action(types::STORE_RECIPES);
