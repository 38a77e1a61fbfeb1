//! Authentication: the signed-in user, sign-in/up flows and session
//! persistence.

pub mod actions;
mod api;
mod effects;
mod navigation;
mod reducer;
mod selectors;
mod session;
mod state;

use std::sync::Arc;

use crate::effects::Effect;

pub use api::{AuthApi, AuthResponse, HttpAuthApi};
pub use effects::{
    auth_error_message, AuthenticateEffect, AutoLoginEffect, AutoLogoutEffect, LogoutEffect,
    RedirectEffect,
};
pub use navigation::Navigator;
pub use reducer::AuthReducer;
pub use selectors::{
    select_auth_error, select_auth_state, select_auth_token, select_auth_user,
    select_is_authenticated,
};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError};
pub use state::{AuthState, User};

pub const FEATURE_KEY: &str = "auth";

/// Every auth effect wired to the same collaborators.
pub fn auth_effects(
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
) -> Vec<Arc<dyn Effect>> {
    vec![
        Arc::new(AuthenticateEffect::new(api, Arc::clone(&storage))),
        Arc::new(RedirectEffect::new(Arc::clone(&navigator))),
        Arc::new(AutoLoginEffect::new(Arc::clone(&storage))),
        Arc::new(AutoLogoutEffect),
        Arc::new(LogoutEffect::new(storage, navigator)),
    ]
}
