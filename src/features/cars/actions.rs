use serde::{Deserialize, Serialize};

use super::state::Car;
use crate::store::{define_action, ActionCreator};

pub mod types {
    pub const APP_INIT: &str = "[App] Init";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCars {
    pub cars: Vec<Car>,
}

/// Seeds the car collection at application start.
pub const APP_INIT: ActionCreator<InitCars> = define_action(types::APP_INIT);
