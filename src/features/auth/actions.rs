use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{define_action, ActionCreator};

pub mod types {
    pub const LOGIN_START: &str = "[Auth] Login Start";
    pub const AUTHENTICATE_SUCCESS: &str = "[Auth] Login";
    pub const AUTHENTICATE_FAIL: &str = "[Auth] Login Fail";
    pub const SIGNUP_START: &str = "[Auth] Signup Start";
    pub const CLEAR_ERROR: &str = "[Auth] Clear Error";
    pub const AUTO_LOGIN: &str = "[Auth] Auto Login";
    pub const LOGOUT: &str = "[Auth] Logout";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccess {
    pub email: String,
    pub user_id: String,
    pub token: String,
    pub expiration_date: DateTime<Utc>,
    /// Navigate home after a fresh sign-in; auto-login stays put.
    pub redirect: bool,
}

pub const LOGIN_START: ActionCreator<Credentials> = define_action(types::LOGIN_START);
pub const SIGNUP_START: ActionCreator<Credentials> = define_action(types::SIGNUP_START);
pub const AUTHENTICATE_SUCCESS: ActionCreator<AuthSuccess> =
    define_action(types::AUTHENTICATE_SUCCESS);
/// Carries a user-facing error message.
pub const AUTHENTICATE_FAIL: ActionCreator<String> = define_action(types::AUTHENTICATE_FAIL);
pub const CLEAR_ERROR: ActionCreator<()> = define_action(types::CLEAR_ERROR);
pub const AUTO_LOGIN: ActionCreator<()> = define_action(types::AUTO_LOGIN);
pub const LOGOUT: ActionCreator<()> = define_action(types::LOGOUT);
