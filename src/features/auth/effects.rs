use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::actions::{
    types, AuthSuccess, Credentials, AUTHENTICATE_FAIL, AUTHENTICATE_SUCCESS, LOGOUT,
};
use super::api::{AuthApi, AuthResponse};
use super::navigation::Navigator;
use super::session::SessionStorage;
use super::state::User;
use crate::effects::{Concurrency, Effect, EffectError};
use crate::features::api::ApiError;
use crate::store::{Action, StateTree};

const UNKNOWN_ERROR: &str = "An unknown error occurred!";

/// User-facing message for a failed sign-in or sign-up.
pub fn auth_error_message(error: &ApiError) -> &'static str {
    match error {
        ApiError::Rejected { code } => match code.as_str() {
            "EMAIL_EXISTS" => "This email exists already",
            "EMAIL_NOT_FOUND" => "This email does not exist.",
            "INVALID_PASSWORD" => "This password is not correct.",
            _ => UNKNOWN_ERROR,
        },
        _ => UNKNOWN_ERROR,
    }
}

/// Signs in or up on `LOGIN_START` / `SIGNUP_START` and persists the session.
pub struct AuthenticateEffect {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
}

impl AuthenticateEffect {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { api, storage }
    }

    async fn authenticate(
        &self,
        signup: bool,
        credentials: &Credentials,
    ) -> Result<(AuthResponse, i64), ApiError> {
        let response = if signup {
            self.api.signup(&credentials.email, &credentials.password).await?
        } else {
            self.api.login(&credentials.email, &credentials.password).await?
        };
        let expires_in = response.expires_in_seconds()?;
        Ok((response, expires_in))
    }
}

#[async_trait]
impl Effect for AuthenticateEffect {
    fn name(&self) -> &str {
        "auth.authenticate"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::LOGIN_START, types::SIGNUP_START]
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::LatestOnly
    }

    async fn run(&self, action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        let credentials: Credentials = action.decode()?;
        let signup = action.kind() == types::SIGNUP_START;
        let (response, expires_in) = match self.authenticate(signup, &credentials).await {
            Ok(ok) => ok,
            Err(error) => {
                tracing::warn!(email = %credentials.email, error = %error, "Authentication failed");
                return Ok(vec![AUTHENTICATE_FAIL.create(auth_error_message(&error).to_string())?]);
            }
        };

        let user = User {
            email: response.email,
            id: response.local_id,
            token: response.id_token,
            token_expiration_date: Utc::now() + Duration::seconds(expires_in),
        };
        if let Err(error) = self.storage.save(&user) {
            tracing::warn!(error = %error, "Failed to persist session");
        }
        tracing::info!(email = %user.email, "Authenticated");

        Ok(vec![AUTHENTICATE_SUCCESS.create(AuthSuccess {
            email: user.email,
            user_id: user.id,
            token: user.token,
            expiration_date: user.token_expiration_date,
            redirect: true,
        })?])
    }

    fn on_error(&self, _trigger: &Action, _error: &EffectError) -> Option<Action> {
        AUTHENTICATE_FAIL.create(UNKNOWN_ERROR.to_string()).ok()
    }
}

/// Navigates home after an interactive sign-in.
pub struct RedirectEffect {
    navigator: Arc<dyn Navigator>,
}

impl RedirectEffect {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }
}

#[async_trait]
impl Effect for RedirectEffect {
    fn name(&self) -> &str {
        "auth.redirect"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::AUTHENTICATE_SUCCESS]
    }

    fn dispatches(&self) -> bool {
        false
    }

    async fn run(&self, action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        let success: AuthSuccess = action.decode()?;
        if success.redirect {
            self.navigator.navigate("/");
        }
        Ok(Vec::new())
    }
}

/// Restores a persisted, unexpired session on `AUTO_LOGIN`.
pub struct AutoLoginEffect {
    storage: Arc<dyn SessionStorage>,
}

impl AutoLoginEffect {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Effect for AutoLoginEffect {
    fn name(&self) -> &str {
        "auth.auto-login"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::AUTO_LOGIN]
    }

    async fn run(&self, _action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        let user = self
            .storage
            .load()
            .map_err(|e| EffectError::failed(e.to_string()))?;
        let Some(user) = user else {
            tracing::debug!("No stored session");
            return Ok(Vec::new());
        };
        if user.token().is_none() {
            tracing::debug!(email = %user.email, "Stored session expired");
            return Ok(Vec::new());
        }

        Ok(vec![AUTHENTICATE_SUCCESS.create(AuthSuccess {
            email: user.email,
            user_id: user.id,
            token: user.token,
            expiration_date: user.token_expiration_date,
            redirect: false,
        })?])
    }
}

/// Logs out when the token expires. A later sign-in or logout replaces
/// the pending timer.
pub struct AutoLogoutEffect;

#[async_trait]
impl Effect for AutoLogoutEffect {
    fn name(&self) -> &str {
        "auth.auto-logout"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::AUTHENTICATE_SUCCESS, types::LOGOUT]
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::LatestOnly
    }

    async fn run(&self, action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        if action.kind() == types::LOGOUT {
            return Ok(Vec::new());
        }
        let success: AuthSuccess = action.decode()?;
        let remaining = (success.expiration_date - Utc::now())
            .to_std()
            .unwrap_or_default();
        tracing::debug!(seconds = remaining.as_secs(), "Logout timer set");
        tokio::time::sleep(remaining).await;
        tracing::info!(email = %success.email, "Session expired");
        Ok(vec![LOGOUT.empty()])
    }
}

/// Clears the stored session and navigates to the sign-in page on `LOGOUT`.
pub struct LogoutEffect {
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
}

impl LogoutEffect {
    pub fn new(storage: Arc<dyn SessionStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self { storage, navigator }
    }
}

#[async_trait]
impl Effect for LogoutEffect {
    fn name(&self) -> &str {
        "auth.logout"
    }

    fn triggers(&self) -> &[&'static str] {
        &[types::LOGOUT]
    }

    fn dispatches(&self) -> bool {
        false
    }

    async fn run(&self, _action: Action, _state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        self.storage
            .clear()
            .map_err(|e| EffectError::failed(e.to_string()))?;
        self.navigator.navigate("/auth");
        Ok(Vec::new())
    }
}
