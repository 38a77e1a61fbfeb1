//! Remote recipe storage.

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::state::Recipe;
use crate::features::api::{check_status, ApiError};
use crate::store::Observable;

/// Where recipes are fetched from and stored to.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Recipe>, ApiError>;

    async fn store(&self, recipes: &[Recipe]) -> Result<(), ApiError>;
}

/// `GET`/`PUT {base_url}/recipes.json` against a realtime-database style
/// endpoint.
pub struct HttpRecipeApi {
    client: Client,
    base_url: String,
    token: Option<Observable<Option<String>>>,
}

impl HttpRecipeApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach the signed-in user's token, read at request time, as the
    /// `auth` query parameter.
    pub fn with_token(mut self, token: Observable<Option<String>>) -> Self {
        self.token = Some(token);
        self
    }

    /// `{base_url}/recipes.json`, with the `auth` parameter when signed in.
    fn url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/recipes.json", self.base_url.trim_end_matches('/')))
            .map_err(|e| ApiError::Parse(format!("invalid recipes URL: {e}")))?;
        let token = self
            .token
            .as_ref()
            .and_then(|token| token.get().ok())
            .and_then(|token| (*token).clone());
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("auth", &token);
        }
        Ok(url)
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn fetch(&self) -> Result<Vec<Recipe>, ApiError> {
        let url = self.url()?;
        tracing::debug!(path = %url.path(), "Fetching recipes");
        let response = self.client.get(url).send().await?;
        let text = check_status(response).await?.text().await?;
        // An empty database answers `null`.
        let recipes: Option<Vec<Recipe>> =
            serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(recipes.unwrap_or_default())
    }

    async fn store(&self, recipes: &[Recipe]) -> Result<(), ApiError> {
        let url = self.url()?;
        tracing::debug!(path = %url.path(), count = recipes.len(), "Storing recipes");
        let response = self.client.put(url).json(recipes).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
