//! The HTTP client.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sidequest_core::types::Timestamp;

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};
use crate::http::cache::{CachedResponse, ResponseCache};
use crate::http::options::{RequestBody, RequestOptions};
use crate::token::TokenStore;

/// A decoded response plus its transport envelope.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub headers: HeaderMap,
    /// When the payload was retrieved from the network; a cache hit keeps
    /// the original retrieval time.
    pub fetched_at: Timestamp,
}

/// Client for the Side Quest REST surface.
///
/// Clones are cheap on the inner reqwest client; this type is intended to be
/// shared behind an [`Arc`] by the session controller and the stores.
pub struct HttpClient {
    inner: reqwest::Client,
    /// Origin every request resolves against (profile base or proxy origin).
    origin: String,
    /// Versioned path prefix, e.g. `/api/v1`.
    api_base: String,
    default_headers: Vec<(String, String)>,
    tokens: Arc<TokenStore>,
    cache: ResponseCache,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>) -> Self {
        Self::with_cache(config, tokens, ResponseCache::default())
    }

    pub fn with_cache(config: &ClientConfig, tokens: Arc<TokenStore>, cache: ResponseCache) -> Self {
        Self {
            inner: reqwest::Client::new(),
            origin: config.origin().trim_end_matches('/').to_string(),
            api_base: config.api_base(),
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
            tokens,
            cache,
        }
    }

    /// Versioned endpoint path, e.g. `api_path("/auth/me")` -> `/api/v1/auth/me`.
    pub fn api_path(&self, rest: &str) -> String {
        format!("{}{rest}", self.api_base)
    }

    /// Clear the response cache, entirely or by key pattern.
    pub fn clear_cache(&self, pattern: Option<&Regex>) {
        self.cache.clear(pattern);
    }

    // -- request building ----------------------------------------------------

    fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        };
        let full = format!("{}{path}", self.origin);
        let mut url = Url::parse(&full)
            .map_err(|e| ApiError::Client(format!("Invalid request URL '{full}': {e}")))?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn prepare_headers(&self, options: &RequestOptions) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let merged = self.default_headers.iter().chain(options.headers.iter());
        for (name, value) in merged {
            let parsed = HeaderName::from_bytes(name.as_bytes())
                .ok()
                .zip(HeaderValue::from_str(value).ok());
            match parsed {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => tracing::warn!(header = %name, "dropping malformed request header"),
            }
        }

        if options.with_auth {
            match self.tokens.token() {
                Some(token) => {
                    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                        headers.insert(AUTHORIZATION, value);
                    }
                }
                // Not an error: the request proceeds unauthenticated and the
                // backend decides whether that is acceptable.
                None => tracing::warn!("no auth token available; sending request unauthenticated"),
            }
        }

        headers
    }

    // -- core request path ---------------------------------------------------

    /// Issue a request and return the raw response bytes.
    ///
    /// GET responses are served from and stored into the cache; successful
    /// mutating requests evict the cached entries of the resource families
    /// their path touches.
    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<CachedResponse, ApiError> {
        let url = self.build_url(endpoint, &options.params)?;
        let is_get = options.method == Method::GET;
        let cache_key = ResponseCache::cache_key(&options.method, url.as_str(), &options.headers);

        if is_get {
            if let Some(hit) = self.cache.get(&cache_key) {
                tracing::debug!(url = %url, "serving response from cache");
                return Ok(hit);
            }
        }

        let headers = self.prepare_headers(&options);
        let mut builder = self
            .inner
            .request(options.method.clone(), url.clone())
            .headers(headers);

        builder = match options.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            Some(RequestBody::Text(text)) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
                .body(text),
            None => builder,
        };

        tracing::debug!(
            method = %options.method,
            url = %url,
            with_auth = options.with_auth,
            "sending request"
        );

        let timeout = options.timeout;
        let work = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };

        // Losing the race drops the request future, which closes the
        // connection: a timed-out call does not keep running unobserved.
        let (status, resp_headers, body) = tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| ApiError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| ApiError::Client(format!("Request failed: {e}")))?;

        if !status.is_success() {
            let err = Self::decode_failure(status, &body);
            tracing::error!(status = status.as_u16(), url = %url, code = %err.code(), "request failed");
            return Err(err);
        }

        let raw = CachedResponse {
            status: status.as_u16(),
            headers: resp_headers,
            body,
            fetched_at: Utc::now(),
        };

        if is_get {
            self.cache
                .insert(cache_key, url.path().to_string(), raw.clone());
        } else {
            self.cache.invalidate_related(url.path());
        }

        Ok(raw)
    }

    /// Decode a failure body into a structured error.
    ///
    /// An undecodable body falls back to the generic unknown-error shape
    /// instead of surfacing the decode problem.
    fn decode_failure(status: StatusCode, body: &[u8]) -> ApiError {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(envelope) => ApiError::from_status(status.as_u16(), Some(envelope)),
            Err(_) => ApiError::from_status(status.as_u16(), None),
        }
    }

    // -- typed entry points ----------------------------------------------------

    /// Issue a request and decode the JSON body into `T`.
    ///
    /// A body that does not match `T` fails loudly with the endpoint name;
    /// there is no alternate-envelope guessing.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let raw = self.execute(endpoint, options).await?;
        let data = serde_json::from_slice(&raw.body).map_err(|e| ApiError::Schema {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })?;
        Ok(ApiResponse {
            data,
            status: raw.status,
            headers: raw.headers,
            fetched_at: raw.fetched_at,
        })
    }

    /// Issue a request returning the body as text (lossily decoded).
    pub async fn request_text(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<String>, ApiError> {
        let raw = self.execute(endpoint, options).await?;
        Ok(ApiResponse {
            data: String::from_utf8_lossy(&raw.body).into_owned(),
            status: raw.status,
            headers: raw.headers,
            fetched_at: raw.fetched_at,
        })
    }

    /// Issue a request returning the raw body bytes (binary payloads).
    pub async fn request_bytes(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<Bytes>, ApiError> {
        let raw = self.execute(endpoint, options).await?;
        Ok(ApiResponse {
            data: raw.body,
            status: raw.status,
            headers: raw.headers,
            fetched_at: raw.fetched_at,
        })
    }

    // -- convenience wrappers --------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let options = RequestOptions::new(Method::POST).json(body)?;
        self.request(endpoint, options).await
    }

    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::POST)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let options = RequestOptions::new(Method::PUT).json(body)?;
        self.request(endpoint, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let options = RequestOptions::new(Method::PATCH).json(body)?;
        self.request(endpoint, options).await
    }

    pub async fn patch_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::PATCH)).await
    }

    /// DELETE returning the body as text; the status is what matters.
    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse<String>, ApiError> {
        self.request_text(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    // -- internals shared with transfer ----------------------------------------

    pub(crate) fn transport(&self) -> &reqwest::Client {
        &self.inner
    }

    pub(crate) fn url_for(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Url, ApiError> {
        self.build_url(endpoint, params)
    }

    pub(crate) fn headers_for(&self, options: &RequestOptions) -> HeaderMap {
        self.prepare_headers(options)
    }

    pub(crate) fn decode_error_body(status: StatusCode, body: &[u8]) -> ApiError {
        Self::decode_failure(status, body)
    }

    pub(crate) fn invalidate_cache_for(&self, path: &str) {
        self.cache.invalidate_related(path);
    }
}
