use std::sync::Arc;

use statehouse::entity;
use statehouse::features::books::actions::{
    BookId, RetrievedBooks, ADD_BOOK, REMOVE_BOOK, RETRIEVED_BOOK_LIST,
};
use statehouse::features::books::{select_book_collection, select_books, Book, VolumeInfo};
use statehouse::features::cars::actions::{InitCars, APP_INIT};
use statehouse::features::cars::{self, select_car, select_cars, Car, CarsReducer, CarsState};
use statehouse::features::root_reducers;
use statehouse::selector::{feature_selector, Selector};
use statehouse::store::{ReducerMap, Store};

fn book(id: &str, title: &str) -> Book {
    Book {
        id: id.into(),
        volume_info: VolumeInfo {
            title: title.into(),
            authors: vec!["Oliver Sacks".into()],
        },
    }
}

fn fleet() -> Vec<Car> {
    vec![
        Car::new("1", "1966", "Ford", "Mustang"),
        Car::new("2", "2001", "Toyota", "Corolla"),
    ]
}

/// Test that app init seeds the car collection and the entity selectors
/// read it back in insertion order.
#[test]
fn test_cars_init_and_selectors() {
    let store = Store::builder(ReducerMap::new().slice::<CarsReducer>(cars::FEATURE_KEY))
        .build()
        .unwrap();
    store
        .dispatch(APP_INIT.create(InitCars { cars: fleet() }).unwrap())
        .unwrap();

    assert_eq!(*store.select(select_cars()).get().unwrap(), fleet());
    assert_eq!(
        *store.select(select_car("2")).get().unwrap(),
        Some(Car::new("2", "2001", "Toyota", "Corolla"))
    );
    assert_eq!(*store.select(select_car("9")).get().unwrap(), None);
}

#[test]
fn test_entity_selectors_memoize() {
    let store = Store::builder(ReducerMap::new().slice::<CarsReducer>(cars::FEATURE_KEY))
        .build()
        .unwrap();
    let selectors = entity::selectors(feature_selector::<CarsState>(cars::FEATURE_KEY));
    store
        .dispatch(APP_INIT.create(InitCars { cars: fleet() }).unwrap())
        .unwrap();

    let state = store.state();
    let first = selectors.select_all.select(&state).unwrap();
    let second = selectors.select_all.select(&state).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*selectors.select_total.select(&state).unwrap(), 2);
}

/// Test that the collection joins ids against retrieved books in
/// collection order, without duplicates.
#[test]
fn test_book_collection() {
    let store = Store::builder(root_reducers()).build().unwrap();
    store
        .dispatch(
            RETRIEVED_BOOK_LIST
                .create(RetrievedBooks {
                    books: vec![book("b1", "Awakenings"), book("b2", "Migraine")],
                })
                .unwrap(),
        )
        .unwrap();
    for id in ["b2", "b1", "b2"] {
        store
            .dispatch(ADD_BOOK.create(BookId { book_id: id.into() }).unwrap())
            .unwrap();
    }

    let titles: Vec<String> = store
        .select(select_book_collection())
        .get()
        .unwrap()
        .iter()
        .map(|b| b.volume_info.title.clone())
        .collect();
    assert_eq!(titles, ["Migraine", "Awakenings"]);

    store
        .dispatch(REMOVE_BOOK.create(BookId { book_id: "b2".into() }).unwrap())
        .unwrap();
    assert_eq!(store.select(select_book_collection()).get().unwrap().len(), 1);
    assert_eq!(store.select(select_books()).get().unwrap().0.len(), 2);
}

#[test]
fn test_book_json_shape() {
    let parsed: Book = serde_json::from_value(serde_json::json!({
        "id": "x",
        "volumeInfo": {"title": "Hallucinations", "authors": ["Oliver Sacks"]}
    }))
    .unwrap();
    assert_eq!(parsed, book("x", "Hallucinations"));
}
