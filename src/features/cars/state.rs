use serde::{Deserialize, Serialize};

use crate::entity::{EntityAdapter, EntityState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub year: String,
    pub make: String,
    pub model: String,
}

impl Car {
    pub fn new(
        id: impl Into<String>,
        year: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            year: year.into(),
            make: make.into(),
            model: model.into(),
        }
    }
}

pub type CarsState = EntityState<Car>;

pub const CAR_ADAPTER: EntityAdapter<Car> = EntityAdapter::new(|car| car.id.clone());
