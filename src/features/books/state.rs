use serde::{Deserialize, Serialize};

use crate::store::Slice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub volume_info: VolumeInfo,
}

/// Books retrieved from the catalogue, stored under [`super::BOOKS_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookList(pub Vec<Book>);

impl Slice for BookList {}

/// Ids of collected books in collection order, stored under
/// [`super::COLLECTION_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(pub Vec<String>);

impl Slice for Collection {}
