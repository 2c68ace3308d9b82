//! Bindings for the `/auth` resource.

use serde::Deserialize;
use sidequest_core::user::{Credentials, RegisterUser, User};

use crate::error::ApiError;
use crate::http::{HttpClient, Method, RequestOptions};

/// Response of `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// Response of `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/v1/auth/login
///
/// The login route speaks the OAuth2 password shape: credentials go out as
/// a form-urlencoded body, and no bearer header is attached.
pub async fn login(http: &HttpClient, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
    let options = RequestOptions::new(Method::POST)
        .form(vec![
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.password.clone()),
        ])
        .auth(false);
    let response = http
        .request::<LoginResponse>(&http.api_path("/auth/login"), options)
        .await?;
    Ok(response.data)
}

/// POST /api/v1/auth/register
pub async fn register(
    http: &HttpClient,
    payload: &RegisterUser,
) -> Result<RegisterResponse, ApiError> {
    payload.check()?;
    let options = RequestOptions::new(Method::POST).json(payload)?.auth(false);
    let response = http
        .request::<RegisterResponse>(&http.api_path("/auth/register"), options)
        .await?;
    Ok(response.data)
}

/// POST /api/v1/auth/logout
///
/// The body is ignored; only the status matters.
pub async fn logout(http: &HttpClient) -> Result<(), ApiError> {
    http.request_text(
        &http.api_path("/auth/logout"),
        RequestOptions::new(Method::POST),
    )
    .await?;
    Ok(())
}

/// GET /api/v1/auth/me
pub async fn me(http: &HttpClient) -> Result<User, ApiError> {
    Ok(http.get::<User>(&http.api_path("/auth/me")).await?.data)
}
