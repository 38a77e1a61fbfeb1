//! Identity service client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::features::api::ApiError;

/// Successful sign-in or sign-up answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id_token: String,
    pub email: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Token lifetime in seconds, sent as a string.
    pub expires_in: String,
    pub local_id: String,
    #[serde(default)]
    pub registered: Option<bool>,
}

impl AuthResponse {
    pub fn expires_in_seconds(&self) -> Result<i64, ApiError> {
        self.expires_in
            .trim()
            .parse()
            .map_err(|_| ApiError::Parse(format!("invalid expiresIn '{}'", self.expires_in)))
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity-toolkit style REST client:
/// `POST {base_url}/accounts:signUp?key=..` and `accounts:signInWithPassword`.
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpAuthApi {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn post(&self, endpoint: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let mut url = Url::parse(&format!("{}/{endpoint}", self.base_url.trim_end_matches('/')))
            .map_err(|e| ApiError::Parse(format!("invalid auth URL: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        tracing::debug!(endpoint = %endpoint, "Sending auth request");
        let response = self
            .client
            .post(url)
            .json(&AuthRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            // Rejections carry a code such as "EMAIL_EXISTS" or
            // "TOO_MANY_ATTEMPTS_TRY_LATER : details".
            return Err(match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => ApiError::Rejected {
                    code: envelope
                        .error
                        .message
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                },
                Err(_) => ApiError::Status {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post("accounts:signUp", email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post("accounts:signInWithPassword", email, password).await
    }
}
