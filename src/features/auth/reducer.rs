use std::sync::Arc;

use super::actions::{types, AuthSuccess};
use super::state::{AuthState, User};
use crate::store::{Action, Reducer, ReducerError};

pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;

    fn reduce(state: &Arc<AuthState>, action: &Action) -> Result<Arc<AuthState>, ReducerError> {
        let next = match action.kind() {
            types::AUTHENTICATE_SUCCESS => {
                let success: AuthSuccess = action.decode()?;
                AuthState {
                    user: Some(User {
                        email: success.email,
                        id: success.user_id,
                        token: success.token,
                        token_expiration_date: success.expiration_date,
                    }),
                    auth_error: None,
                    loading: false,
                }
            }
            types::LOGOUT => AuthState {
                user: None,
                ..AuthState::clone(state)
            },
            types::LOGIN_START | types::SIGNUP_START => AuthState {
                auth_error: None,
                loading: true,
                ..AuthState::clone(state)
            },
            types::AUTHENTICATE_FAIL => AuthState {
                user: None,
                auth_error: Some(action.decode()?),
                loading: false,
            },
            types::CLEAR_ERROR => AuthState {
                auth_error: None,
                ..AuthState::clone(state)
            },
            _ => return Ok(Arc::clone(state)),
        };
        Ok(Arc::new(next))
    }
}
