use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::store::Slice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: u32,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: u32) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Shopping list slice, stored under [`super::FEATURE_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListState {
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub edited_ingredient: Option<Ingredient>,
    /// Position of the ingredient being edited; `-1` in JSON when idle.
    #[serde(default, with = "edit_index")]
    pub edited_ingredient_index: Option<usize>,
}

impl ShoppingListState {
    pub fn is_editing(&self) -> bool {
        self.edited_ingredient_index.is_some()
    }
}

impl Default for ShoppingListState {
    fn default() -> Self {
        Self {
            ingredients: vec![Ingredient::new("Apples", 5), Ingredient::new("Tomatoes", 10)],
            edited_ingredient: None,
            edited_ingredient_index: None,
        }
    }
}

impl Slice for ShoppingListState {}

mod edit_index {
    use super::*;

    pub fn serialize<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(index) => serializer.serialize_i64(*index as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|index| usize::try_from(index).ok()))
    }
}
