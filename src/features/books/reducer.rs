use std::sync::Arc;

use super::actions::{types, BookId, RetrievedBooks};
use super::state::{BookList, Collection};
use crate::store::{Action, Reducer, ReducerError};

pub struct BooksReducer;

impl Reducer for BooksReducer {
    type State = BookList;

    fn reduce(state: &Arc<BookList>, action: &Action) -> Result<Arc<BookList>, ReducerError> {
        match action.kind() {
            types::RETRIEVED_BOOK_LIST => {
                let RetrievedBooks { books } = action.decode()?;
                Ok(Arc::new(BookList(books)))
            }
            _ => Ok(Arc::clone(state)),
        }
    }
}

pub struct CollectionReducer;

impl Reducer for CollectionReducer {
    type State = Collection;

    fn reduce(state: &Arc<Collection>, action: &Action) -> Result<Arc<Collection>, ReducerError> {
        match action.kind() {
            types::ADD_BOOK => {
                let BookId { book_id } = action.decode()?;
                if state.0.contains(&book_id) {
                    return Ok(Arc::clone(state));
                }
                let mut ids = state.0.clone();
                ids.push(book_id);
                Ok(Arc::new(Collection(ids)))
            }
            types::REMOVE_BOOK => {
                let BookId { book_id } = action.decode()?;
                let ids = state.0.iter().filter(|id| **id != book_id).cloned().collect();
                Ok(Arc::new(Collection(ids)))
            }
            _ => Ok(Arc::clone(state)),
        }
    }
}
