//! API client for communicating with the headache journal REST API.
//!
//! Every request goes through one shared `reqwest::Client`. The Authorization
//! header comes from the client's [`SessionContext`], so once a session is
//! established no call site passes the token explicitly.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionContext;
use crate::config::Config;
use crate::models::{
    CatalogItem, CatalogKind, Consumption, Drink, Food, HeadacheLog, HeadacheStats, Location,
    NewHeadache, RemedyResult,
};

use super::endpoints;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(rename = "isValid")]
    is_valid: bool,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful `POST /sessions/sign-in` body; extra fields are ignored
#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
struct AddRemedyRequest<'a> {
    id: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct RateRemedyRequest {
    result: RemedyResult,
}

/// Everything needed to edit what was eaten and drunk around a headache
#[derive(Debug, Clone)]
pub struct ConsumptionOptions {
    pub foods: Vec<Food>,
    pub drinks: Vec<Drink>,
    pub current: Consumption,
}

/// API client for the headache journal.
/// Clone is cheap and clones share both the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client for the configured endpoint with a fresh session
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_base_url, config.request_timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: SessionContext::new(),
        })
    }

    /// The shared Authorization slot used by every domain request
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Session Endpoints =====

    /// Ask the server whether `token` is still valid.
    ///
    /// Any transport failure or non-2xx status is returned as an error; the
    /// caller decides how to treat it. Never retried.
    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        let url = self.url(endpoints::SESSION_VERIFY);
        let response = self
            .client
            .post(&url)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to send verification request")?;

        let response = Self::check_response(response).await?;
        let body: VerifyResponse = response
            .json()
            .await
            .context("Failed to parse verification response")?;
        Ok(body.is_valid)
    }

    /// Exchange credentials for a session token. Does not touch the session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let url = self.url(endpoints::SESSION_SIGN_IN);
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&SignInRequest { email, password })
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to send sign-in request")?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse sign-in response")
    }

    // ===== Request Plumbing =====

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(value) = self.session.auth_header() {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send an authenticated request, backing off on 429.
    /// `build` is called once per attempt since a sent builder is consumed.
    async fn execute<F>(&self, method: Method, path: &str, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let request = self
                .client
                .request(method.clone(), &url)
                .headers(self.auth_headers());
            let response = build(request)
                .send()
                .await
                .map_err(ApiError::NetworkError)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    debug!(%method, path, "Request succeeded");
                    return Ok(response);
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(path, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, |r| r).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    /// Send a mutation and discard whatever the server answers with
    async fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        self.execute(method, path, |r| r.json(body)).await?;
        Ok(())
    }

    // ===== Headaches =====

    pub async fn list_headaches(&self) -> Result<Vec<HeadacheLog>> {
        self.get(endpoints::HEADACHES).await
    }

    pub async fn headache(&self, id: &str) -> Result<HeadacheLog> {
        self.get(&endpoints::headache(id)).await
    }

    /// The headache still in progress, if any
    pub async fn unended_headache(&self) -> Result<Option<HeadacheLog>> {
        match self.get::<Option<HeadacheLog>>(endpoints::HEADACHES_UNENDED).await {
            Ok(log) => Ok(log),
            Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_))) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Log a new headache. The location, when known, lets the server attach
    /// the weather at that place.
    pub async fn create_headache(
        &self,
        entry: &NewHeadache,
        location: Option<Location>,
    ) -> Result<()> {
        entry.validate().map_err(ApiError::InvalidRequest)?;

        self.execute(Method::POST, endpoints::HEADACHES, |r| {
            let r = match location {
                Some(loc) => r.query(&[("latitude", loc.latitude), ("longitude", loc.longitude)]),
                None => r,
            };
            r.json(entry)
        })
        .await
        .context("Failed to log headache")?;
        Ok(())
    }

    pub async fn end_headache(&self, id: &str) -> Result<()> {
        self.execute(Method::PATCH, &endpoints::headache_end(id), |r| r)
            .await
            .context("Failed to end headache")?;
        Ok(())
    }

    /// Record that `quantity` doses of catalog remedy `remedy_id` were taken
    pub async fn add_remedy(&self, id: &str, remedy_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(ApiError::InvalidRequest("quantity must be at least 1".to_string()).into());
        }
        self.send_json(
            Method::PATCH,
            &endpoints::headache_remedies(id),
            &AddRemedyRequest {
                id: remedy_id,
                quantity,
            },
        )
        .await
        .context("Failed to add remedy")
    }

    /// Rate how well a remedy taken for this headache worked, `+` or `++`.
    /// `headache_remedy_id` is the id of the entry in `HeadacheLog::remedies`.
    pub async fn rate_remedy(
        &self,
        id: &str,
        headache_remedy_id: &str,
        result: RemedyResult,
    ) -> Result<()> {
        if result == RemedyResult::NoRelief {
            return Err(ApiError::InvalidRequest("rating must be + or ++".to_string()).into());
        }
        self.send_json(
            Method::PATCH,
            &endpoints::headache_remedy_result(id, headache_remedy_id),
            &RateRemedyRequest { result },
        )
        .await
        .context("Failed to rate remedy")
    }

    /// Replace the foods and drinks recorded for a headache
    pub async fn set_consumption(&self, id: &str, consumption: &Consumption) -> Result<()> {
        self.send_json(
            Method::PATCH,
            &endpoints::headache_foods_and_drinks(id),
            consumption,
        )
        .await
        .context("Failed to save foods and drinks")
    }

    /// Fetch both catalogs and the headache's current selection concurrently
    pub async fn consumption_options(&self, id: &str) -> Result<ConsumptionOptions> {
        let (foods, drinks, log) = futures::try_join!(
            self.catalog(CatalogKind::Foods),
            self.catalog(CatalogKind::Drinks),
            self.headache(id),
        )?;

        let current = Consumption {
            foods: log.foods.into_iter().map(|f| f.id).collect(),
            drinks: log.drinks.into_iter().map(|d| d.id).collect(),
        };
        Ok(ConsumptionOptions {
            foods,
            drinks,
            current,
        })
    }

    // ===== Catalogs =====

    pub async fn catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogItem>> {
        self.get(endpoints::catalog(kind)).await
    }

    pub async fn create_catalog_item(&self, kind: CatalogKind, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidRequest("name must not be empty".to_string()).into());
        }
        self.send_json(
            Method::POST,
            endpoints::catalog(kind),
            &crate::models::catalog::NewCatalogItem { name },
        )
        .await
        .with_context(|| format!("Failed to create entry in {}", kind.title()))
    }

    // ===== Statistics =====

    pub async fn stats(&self) -> Result<HeadacheStats> {
        self.get(endpoints::STATS).await
    }
}
