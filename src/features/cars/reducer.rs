use std::sync::Arc;

use super::actions::{types, InitCars};
use super::state::{CarsState, CAR_ADAPTER};
use crate::store::{Action, Reducer, ReducerError};

pub struct CarsReducer;

impl Reducer for CarsReducer {
    type State = CarsState;

    fn reduce(state: &Arc<CarsState>, action: &Action) -> Result<Arc<CarsState>, ReducerError> {
        match action.kind() {
            types::APP_INIT => {
                let InitCars { cars } = action.decode()?;
                Ok(Arc::new(CAR_ADAPTER.add_many(cars, state)))
            }
            _ => Ok(Arc::clone(state)),
        }
    }
}
