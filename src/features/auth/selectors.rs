use std::sync::{Arc, OnceLock};

use super::state::{AuthState, User};
use super::FEATURE_KEY;
use crate::selector::{create_selector, feature_selector, SelectorRef};

pub fn select_auth_state() -> SelectorRef<AuthState> {
    static SELECTOR: OnceLock<SelectorRef<AuthState>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| feature_selector(FEATURE_KEY)))
}

pub fn select_auth_user() -> SelectorRef<Option<User>> {
    static SELECTOR: OnceLock<SelectorRef<Option<User>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_auth_state(),), |auth: &AuthState| auth.user.clone())
    }))
}

/// Token of the signed-in user.
///
/// Expiry is checked when the auth slice changes; the auto-logout effect
/// dispatches a logout at expiry, which refreshes this value.
pub fn select_auth_token() -> SelectorRef<Option<String>> {
    static SELECTOR: OnceLock<SelectorRef<Option<String>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_auth_user(),), |user: &Option<User>| {
            user.as_ref().and_then(User::token).map(str::to_string)
        })
    }))
}

pub fn select_is_authenticated() -> SelectorRef<bool> {
    static SELECTOR: OnceLock<SelectorRef<bool>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_auth_token(),), |token: &Option<String>| token.is_some())
    }))
}

pub fn select_auth_error() -> SelectorRef<Option<String>> {
    static SELECTOR: OnceLock<SelectorRef<Option<String>>> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| {
        create_selector((select_auth_state(),), |auth: &AuthState| auth.auth_error.clone())
    }))
}
