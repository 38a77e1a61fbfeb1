use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use super::state::{Car, CarsState};
use super::FEATURE_KEY;
use crate::entity::{self, EntitySelectors};
use crate::selector::{create_selector, feature_selector, SelectorRef};

fn entity_selectors() -> &'static EntitySelectors<Car> {
    static SELECTORS: OnceLock<EntitySelectors<Car>> = OnceLock::new();
    SELECTORS.get_or_init(|| entity::selectors(select_cars_state()))
}

pub fn select_cars_state() -> SelectorRef<CarsState> {
    static SELECTOR: OnceLock<SelectorRef<CarsState>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(FEATURE_KEY)))
}

pub fn select_cars() -> SelectorRef<Vec<Car>> {
    Arc::clone(&entity_selectors().select_all)
}

pub fn select_car_entities() -> SelectorRef<BTreeMap<String, Car>> {
    Arc::clone(&entity_selectors().select_entities)
}

/// A fresh memoized selector for the car with `id`.
pub fn select_car(id: impl Into<String>) -> SelectorRef<Option<Car>> {
    let id = id.into();
    create_selector(
        (select_car_entities(),),
        move |entities: &BTreeMap<String, Car>| entities.get(&id).cloned(),
    )
}
