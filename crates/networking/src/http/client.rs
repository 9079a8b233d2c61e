//! Backend HTTP client with bearer-token authentication
//!
//! Talks to a PostgREST-style REST API (`/rest/v1`), its auth service
//! (`/auth/v1`) and object storage (`/storage/v1`). Every request carries the
//! project `apikey`; once signed in, the session's access token is sent as the
//! bearer so row-level security scopes queries to the caller.

use chrono::Utc;
use gamegreeneco_core::{Error, Result, Session, TokenResponse, UserId};
use gamegreeneco_persistence::ProfileCache;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the GameGreenEco backend
pub struct BackendClient {
    http: Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
    /// Optional shared profile cache
    cache: Option<Arc<ProfileCache>>,
}

impl BackendClient {
    /// Create a client for the project at `base_url` using its public api key
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session: RwLock::new(None),
            cache: None,
        })
    }

    /// Create a client with a shared profile cache
    pub fn new_with_cache(base_url: &str, api_key: &str, cache: Arc<ProfileCache>) -> Result<Self> {
        let mut client = Self::new(base_url, api_key)?;
        client.cache = Some(cache);
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn cache(&self) -> Option<&Arc<ProfileCache>> {
        self.cache.as_ref()
    }

    // ─── Auth ────────────────────────────────────────────────────────

    /// Sign in with email + password and keep the session in memory
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .headers(self.anonymous_headers()?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status().as_u16() {
            400 | 401 => {
                warn!("Sign-in rejected for {}", email);
                return Err(Error::AuthenticationError("Invalid login credentials".to_string()));
            }
            _ => {}
        }

        let token: TokenResponse = Self::decode(response, "sign-in").await?;
        let session = token.into_session(Utc::now());
        info!("Signed in as {}", session.user_id);

        if let Ok(mut guard) = self.session.write() {
            *guard = Some(session.clone());
        }
        Ok(session)
    }

    /// End the session server-side; the local session is dropped regardless
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let headers = self.headers()?;
        let previous = self.session.write().ok().and_then(|mut guard| guard.take());

        if let Some(cache) = &self.cache {
            cache.clear();
        }

        let Some(session) = previous else {
            debug!("Sign-out without a session");
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self.http.post(&url).headers(headers).send().await?;
        if !response.status().is_success() {
            warn!("Logout for {} returned {}", session.user_id, response.status());
        }

        info!("Signed out {}", session.user_id);
        Ok(())
    }

    /// Current session, if signed in
    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    /// User id of the live session
    pub fn current_user_id(&self) -> Result<UserId> {
        let session = self.session().ok_or(Error::NotSignedIn)?;
        if session.is_expired(Utc::now()) {
            return Err(Error::TokenExpired);
        }
        Ok(session.user_id)
    }

    // ─── Request plumbing ────────────────────────────────────────────

    fn anonymous_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::InvalidData(format!("Invalid api key: {}", e)))?,
        );
        Ok(headers)
    }

    /// Default headers: api key plus the session bearer (or the api key when signed out)
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = self.anonymous_headers()?;
        let bearer = self
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.api_key.clone());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|e| Error::InvalidData(format!("Invalid access token: {}", e)))?,
        );
        Ok(headers)
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::TokenExpired),
            403 => Some(Error::AuthenticationError("Access forbidden".to_string())),
            _ => None,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let response = response.error_for_status().map_err(|e| {
            error!("{} request failed: {}", what, e);
            Error::ApiError(e.to_string())
        })?;

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", what, e);
            Error::InvalidData(e.to_string())
        })
    }

    async fn expect_success(response: Response, what: &str) -> Result<()> {
        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        response.error_for_status().map_err(|e| {
            error!("{} request failed: {}", what, e);
            Error::ApiError(e.to_string())
        })?;
        Ok(())
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    /// `GET /rest/v1/<table>` with PostgREST filters
    pub(crate) async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = self.rest_url(table);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await?;

        Self::decode(response, table).await
    }

    /// Insert/update rows and return the stored representation
    pub(crate) async fn write<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: &B,
        prefer: &'static str,
    ) -> Result<Vec<T>> {
        let url = self.rest_url(table);
        debug!("{} {} {:?}", method, url, query);

        let response = self
            .http
            .request(method, &url)
            .headers(self.headers()?)
            .header("Prefer", prefer)
            .query(query)
            .json(body)
            .send()
            .await?;

        Self::decode(response, table).await
    }

    /// Write without reading anything back
    pub(crate) async fn write_minimal<B: Serialize + ?Sized>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<()> {
        let url = self.rest_url(table);
        debug!("{} {} {:?}", method, url, query);

        let response = self
            .http
            .request(method, &url)
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .query(query)
            .json(body)
            .send()
            .await?;

        Self::expect_success(response, table).await
    }

    /// Call a stored procedure
    pub(crate) async fn rpc<T: DeserializeOwned, B: Serialize + ?Sized>(&self, function: &str, args: &B) -> Result<T> {
        let url = self.rest_url(&format!("rpc/{}", function));
        debug!("RPC {}", function);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(args)
            .send()
            .await?;

        Self::decode(response, function).await
    }

    /// `POST /storage/v1/<path>` returning JSON
    pub(crate) async fn storage_post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}/storage/v1/{}", self.base_url, path.trim_start_matches('/'));
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        Self::decode(response, "storage").await
    }
}
