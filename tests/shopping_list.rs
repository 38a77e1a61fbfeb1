use serde_json::json;

use statehouse::features::root_reducers;
use statehouse::features::shopping_list::actions::{
    ADD_INGREDIENT, DELETE_INGREDIENT, START_EDIT, STOP_EDIT, UPDATE_INGREDIENT,
};
use statehouse::features::shopping_list::{
    self, select_edited_ingredient, Ingredient, ShoppingListReducer, ShoppingListState,
};
use statehouse::store::{ReducerError, ReducerMap, Store, StoreError};

fn store_with(ingredients: Vec<Ingredient>) -> Store {
    Store::builder(ReducerMap::new().slice::<ShoppingListReducer>(shopping_list::FEATURE_KEY))
        .with_state(
            shopping_list::FEATURE_KEY,
            ShoppingListState {
                ingredients,
                edited_ingredient: None,
                edited_ingredient_index: None,
            },
        )
        .build()
        .unwrap()
}

fn list(store: &Store) -> serde_json::Value {
    store.state().to_json().unwrap()[shopping_list::FEATURE_KEY].clone()
}

#[test]
fn test_add_ingredient_to_empty_list() {
    let store = store_with(vec![]);
    store
        .dispatch(ADD_INGREDIENT.create(Ingredient::new("Apples", 5)).unwrap())
        .unwrap();
    assert_eq!(list(&store)["ingredients"], json!([{"name": "Apples", "amount": 5}]));
}

/// Test that editing replaces the ingredient and ends the edit.
#[test]
fn test_start_edit_then_update() {
    let store = store_with(vec![Ingredient::new("Apples", 5)]);
    store.dispatch(START_EDIT.create(0).unwrap()).unwrap();
    assert_eq!(
        *store.select(select_edited_ingredient()).get().unwrap(),
        Some((0, Ingredient::new("Apples", 5)))
    );

    store
        .dispatch(UPDATE_INGREDIENT.create(Ingredient::new("Pears", 3)).unwrap())
        .unwrap();

    assert_eq!(
        list(&store),
        json!({
            "ingredients": [{"name": "Pears", "amount": 3}],
            "editedIngredient": null,
            "editedIngredientIndex": -1
        })
    );
}

#[test]
fn test_delete_edited_ingredient() {
    let store = store_with(vec![Ingredient::new("Apples", 5), Ingredient::new("Eggs", 6)]);
    store.dispatch(START_EDIT.create(0).unwrap()).unwrap();
    store.dispatch(DELETE_INGREDIENT.empty()).unwrap();
    assert_eq!(list(&store)["ingredients"], json!([{"name": "Eggs", "amount": 6}]));
    assert_eq!(*store.select(select_edited_ingredient()).get().unwrap(), None);
}

#[test]
fn test_update_without_edit_is_rejected() {
    let store = store_with(vec![Ingredient::new("Apples", 5)]);
    let before = store.state();
    let err = store
        .dispatch(UPDATE_INGREDIENT.create(Ingredient::new("Pears", 3)).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Reducer {
            source: ReducerError::Invariant(_),
            ..
        }
    ));
    assert_eq!(*before, *store.state());
}

#[test]
fn test_start_edit_out_of_range() {
    let store = store_with(vec![Ingredient::new("Apples", 5)]);
    let err = store.dispatch(START_EDIT.create(3).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Reducer {
            source: ReducerError::IndexOutOfRange { index: 3, len: 1 },
            ..
        }
    ));
}

#[test]
fn test_stop_edit_clears_selection() {
    let store = store_with(vec![Ingredient::new("Apples", 5)]);
    store.dispatch(START_EDIT.create(0).unwrap()).unwrap();
    store.dispatch(STOP_EDIT.empty()).unwrap();
    assert_eq!(list(&store)["editedIngredientIndex"], json!(-1));
}

/// Test that the default list seeds the app store.
#[test]
fn test_root_store_starts_with_default_list() {
    let store = Store::builder(root_reducers()).build().unwrap();
    let state = store
        .state()
        .get::<ShoppingListState>(shopping_list::FEATURE_KEY)
        .unwrap();
    assert_eq!(
        state.ingredients,
        [Ingredient::new("Apples", 5), Ingredient::new("Tomatoes", 10)]
    );
}
