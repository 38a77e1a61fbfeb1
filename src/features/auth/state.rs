use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Slice;

/// A signed-in user and their identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub id: String,
    pub token: String,
    pub token_expiration_date: DateTime<Utc>,
}

impl User {
    /// The token, unless it has expired at `now`.
    pub fn token_at(&self, now: DateTime<Utc>) -> Option<&str> {
        (now < self.token_expiration_date).then_some(self.token.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.token_at(Utc::now())
    }
}

/// Auth slice, stored under [`super::FEATURE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub auth_error: Option<String>,
    pub loading: bool,
}

impl Slice for AuthState {}
