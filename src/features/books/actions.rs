use serde::{Deserialize, Serialize};

use super::state::Book;
use crate::store::{define_action, ActionCreator};

pub mod types {
    pub const ADD_BOOK: &str = "[Book List] Add Book";
    pub const REMOVE_BOOK: &str = "[Book List] Remove Book";
    pub const RETRIEVED_BOOK_LIST: &str = "[Book List/API] Retrieve Books Success";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookId {
    pub book_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedBooks {
    pub books: Vec<Book>,
}

pub const ADD_BOOK: ActionCreator<BookId> = define_action(types::ADD_BOOK);
pub const REMOVE_BOOK: ActionCreator<BookId> = define_action(types::REMOVE_BOOK);
pub const RETRIEVED_BOOK_LIST: ActionCreator<RetrievedBooks> =
    define_action(types::RETRIEVED_BOOK_LIST);
