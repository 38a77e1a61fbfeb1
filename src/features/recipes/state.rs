use serde::{Deserialize, Deserializer, Serialize};

use crate::features::shopping_list::Ingredient;
use crate::store::Slice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: String,
    /// Stored recipes may omit ingredients or store `null`; both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            image_path: String::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Ingredient>, D::Error> {
    Ok(Option::<Vec<Ingredient>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Recipes slice, stored under [`super::FEATURE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipesState {
    pub recipes: Vec<Recipe>,
    /// Last fetch failure, cleared by the next fetch or set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Slice for RecipesState {}
