//! Shopping list: ingredients plus an index-based edit in progress.

pub mod actions;
mod reducer;
mod selectors;
mod state;

pub use reducer::ShoppingListReducer;
pub use selectors::{select_edited_ingredient, select_ingredients, select_shopping_list};
pub use state::{Ingredient, ShoppingListState};

pub const FEATURE_KEY: &str = "shoppingList";
