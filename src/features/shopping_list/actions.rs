use super::state::Ingredient;
use crate::store::{define_action, ActionCreator};

pub mod types {
    pub const ADD_INGREDIENT: &str = "[Shopping List] Add Ingredient";
    pub const ADD_INGREDIENTS: &str = "[Shopping List] Add Ingredients";
    pub const UPDATE_INGREDIENT: &str = "[Shopping List] Update Ingredient";
    pub const DELETE_INGREDIENT: &str = "[Shopping List] Delete Ingredient";
    pub const START_EDIT: &str = "[Shopping List] Start Edit";
    pub const STOP_EDIT: &str = "[Shopping List] Stop Edit";
}

pub const ADD_INGREDIENT: ActionCreator<Ingredient> = define_action(types::ADD_INGREDIENT);
pub const ADD_INGREDIENTS: ActionCreator<Vec<Ingredient>> = define_action(types::ADD_INGREDIENTS);
/// Replaces the ingredient currently being edited.
pub const UPDATE_INGREDIENT: ActionCreator<Ingredient> = define_action(types::UPDATE_INGREDIENT);
/// Removes the ingredient currently being edited.
pub const DELETE_INGREDIENT: ActionCreator<()> = define_action(types::DELETE_INGREDIENT);
pub const START_EDIT: ActionCreator<usize> = define_action(types::START_EDIT);
pub const STOP_EDIT: ActionCreator<()> = define_action(types::STOP_EDIT);
