use std::sync::Arc;

use super::actions::{types, UpdateRecipe};
use super::state::{Recipe, RecipesState};
use crate::store::{Action, Reducer, ReducerError};

pub struct RecipesReducer;

impl Reducer for RecipesReducer {
    type State = RecipesState;

    fn reduce(state: &Arc<RecipesState>, action: &Action) -> Result<Arc<RecipesState>, ReducerError> {
        let next = match action.kind() {
            types::SET_RECIPES => RecipesState {
                recipes: action.decode()?,
                error: None,
            },
            types::FETCH_RECIPES => RecipesState {
                recipes: state.recipes.clone(),
                error: None,
            },
            types::FETCH_RECIPES_FAIL => RecipesState {
                recipes: state.recipes.clone(),
                error: Some(action.decode()?),
            },
            types::ADD_RECIPE => {
                let recipe: Recipe = action.decode()?;
                let mut next = RecipesState::clone(state);
                next.recipes.push(recipe);
                next
            }
            types::UPDATE_RECIPE => {
                let UpdateRecipe { index, new_recipe } = action.decode()?;
                check_index(state, index)?;
                let mut next = RecipesState::clone(state);
                next.recipes[index] = new_recipe;
                next
            }
            types::DELETE_RECIPE => {
                let index: usize = action.decode()?;
                check_index(state, index)?;
                let mut next = RecipesState::clone(state);
                next.recipes.remove(index);
                next
            }
            _ => return Ok(Arc::clone(state)),
        };
        Ok(Arc::new(next))
    }
}

fn check_index(state: &RecipesState, index: usize) -> Result<(), ReducerError> {
    if index < state.recipes.len() {
        Ok(())
    } else {
        Err(ReducerError::IndexOutOfRange {
            index,
            len: state.recipes.len(),
        })
    }
}
