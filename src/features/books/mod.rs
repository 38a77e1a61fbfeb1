//! Book catalogue and the user's collection of book ids.

pub mod actions;
mod reducer;
mod selectors;
mod state;

pub use reducer::{BooksReducer, CollectionReducer};
pub use selectors::{select_book_collection, select_books, select_collection_state};
pub use state::{Book, BookList, Collection, VolumeInfo};

pub const BOOKS_KEY: &str = "books";
pub const COLLECTION_KEY: &str = "collection";
