use std::sync::{Arc, OnceLock};

use super::state::{Ingredient, ShoppingListState};
use super::FEATURE_KEY;
use crate::selector::{create_selector, feature_selector, SelectorRef};

pub fn select_shopping_list() -> SelectorRef<ShoppingListState> {
    static SELECTOR: OnceLock<SelectorRef<ShoppingListState>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(FEATURE_KEY)))
}

pub fn select_ingredients() -> SelectorRef<Vec<Ingredient>> {
    static SELECTOR: OnceLock<SelectorRef<Vec<Ingredient>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_shopping_list(),), |list: &ShoppingListState| {
            list.ingredients.clone()
        })
    }))
}

/// The ingredient under edit and its index, if any.
pub fn select_edited_ingredient() -> SelectorRef<Option<(usize, Ingredient)>> {
    static SELECTOR: OnceLock<SelectorRef<Option<(usize, Ingredient)>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_shopping_list(),), |list: &ShoppingListState| {
            list.edited_ingredient_index
                .zip(list.edited_ingredient.clone())
        })
    }))
}
