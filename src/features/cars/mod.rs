//! Cars kept as a normalized entity collection.

pub mod actions;
mod reducer;
mod selectors;
mod state;

pub use reducer::CarsReducer;
pub use selectors::{select_car, select_car_entities, select_cars, select_cars_state};
pub use state::{Car, CarsState, CAR_ADAPTER};

pub const FEATURE_KEY: &str = "cars";
