use std::sync::Arc;

use super::actions::types;
use super::state::{Ingredient, ShoppingListState};
use crate::store::{Action, Reducer, ReducerError};

pub struct ShoppingListReducer;

impl Reducer for ShoppingListReducer {
    type State = ShoppingListState;

    fn reduce(
        state: &Arc<ShoppingListState>,
        action: &Action,
    ) -> Result<Arc<ShoppingListState>, ReducerError> {
        let next = match action.kind() {
            types::ADD_INGREDIENT => {
                let ingredient: Ingredient = action.decode()?;
                let mut next = ShoppingListState::clone(state);
                next.ingredients.push(ingredient);
                next
            }
            types::ADD_INGREDIENTS => {
                let ingredients: Vec<Ingredient> = action.decode()?;
                let mut next = ShoppingListState::clone(state);
                next.ingredients.extend(ingredients);
                next
            }
            types::UPDATE_INGREDIENT => {
                let ingredient: Ingredient = action.decode()?;
                let index = edited_index(state)?;
                let mut next = stop_edit(state);
                next.ingredients[index] = ingredient;
                next
            }
            types::DELETE_INGREDIENT => {
                let index = edited_index(state)?;
                let mut next = stop_edit(state);
                next.ingredients.remove(index);
                next
            }
            types::START_EDIT => {
                let index: usize = action.decode()?;
                let ingredient = state.ingredients.get(index).cloned().ok_or(
                    ReducerError::IndexOutOfRange {
                        index,
                        len: state.ingredients.len(),
                    },
                )?;
                ShoppingListState {
                    ingredients: state.ingredients.clone(),
                    edited_ingredient: Some(ingredient),
                    edited_ingredient_index: Some(index),
                }
            }
            types::STOP_EDIT => stop_edit(state),
            _ => return Ok(Arc::clone(state)),
        };
        Ok(Arc::new(next))
    }
}

/// The index under edit, checked against the current list.
fn edited_index(state: &ShoppingListState) -> Result<usize, ReducerError> {
    let index = state
        .edited_ingredient_index
        .ok_or_else(|| ReducerError::Invariant("no ingredient is being edited".into()))?;
    if index >= state.ingredients.len() {
        return Err(ReducerError::IndexOutOfRange {
            index,
            len: state.ingredients.len(),
        });
    }
    Ok(index)
}

fn stop_edit(state: &ShoppingListState) -> ShoppingListState {
    ShoppingListState {
        ingredients: state.ingredients.clone(),
        edited_ingredient: None,
        edited_ingredient_index: None,
    }
}
