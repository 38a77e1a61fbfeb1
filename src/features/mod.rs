//! Application feature slices built on the store.
//!
//! Each feature owns a state type, its action creators, a reducer and
//! memoized selectors. Features with remote collaborators also provide
//! effects.

pub mod api;
pub mod auth;
pub mod books;
pub mod cars;
pub mod recipes;
pub mod shopping_list;

use crate::store::ReducerMap;

/// Reducers for every feature under its conventional key.
pub fn root_reducers() -> ReducerMap {
    ReducerMap::new()
        .slice::<shopping_list::ShoppingListReducer>(shopping_list::FEATURE_KEY)
        .slice::<recipes::RecipesReducer>(recipes::FEATURE_KEY)
        .slice::<auth::AuthReducer>(auth::FEATURE_KEY)
        .slice::<books::BooksReducer>(books::BOOKS_KEY)
        .slice::<books::CollectionReducer>(books::COLLECTION_KEY)
        .slice::<cars::CarsReducer>(cars::FEATURE_KEY)
}
