use std::sync::{Arc, OnceLock};

use super::state::{Book, BookList, Collection};
use super::{BOOKS_KEY, COLLECTION_KEY};
use crate::selector::{create_selector, feature_selector, SelectorRef};

pub fn select_books() -> SelectorRef<BookList> {
    static SELECTOR: OnceLock<SelectorRef<BookList>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(BOOKS_KEY)))
}

pub fn select_collection_state() -> SelectorRef<Collection> {
    static SELECTOR: OnceLock<SelectorRef<Collection>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(COLLECTION_KEY)))
}

/// Collected books in collection order. Ids with no retrieved book are
/// skipped.
pub fn select_book_collection() -> SelectorRef<Vec<Book>> {
    static SELECTOR: OnceLock<SelectorRef<Vec<Book>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector(
            (select_books(), select_collection_state()),
            |books: &BookList, collection: &Collection| {
                collection
                    .0
                    .iter()
                    .filter_map(|id| books.0.iter().find(|book| book.id == *id).cloned())
                    .collect()
            },
        )
    }))
}
