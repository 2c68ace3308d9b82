//! Session lifecycle.
//!
//! One long-lived [`SessionController`] owns the authentication state
//! machine:
//!
//! ```text
//! Uninitialized -> Checking -> Authenticated(User) | Anonymous
//! ```
//!
//! Callers subscribe to the state instead of racing their own "already
//! checked" flags, so the startup check runs at most once no matter how many
//! entry points ask. A transient backend failure returns the machine to
//! `Uninitialized`, keeping the stored token so a later check can retry
//! without forcing a fresh login; only an explicit 401 clears it.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use sidequest_core::user::{Credentials, RegisterUser, User, UserUpdate};

use crate::api;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::token::TokenStore;

/// Message surfaced when the backend rejects the stored token.
const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Message surfaced on transient session-check failures.
const SESSION_CHECK_FAILED: &str = "Error connecting to server. Please try again later.";

/// Authentication state.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No check has run (or the last one failed transiently).
    Uninitialized,
    /// A check is in flight.
    Checking,
    /// The backend confirmed the stored token and returned the user.
    Authenticated(User),
    /// No usable session exists.
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// The session user, when authenticated.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Whether a session check has reached a settled outcome.
    fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated(_) | SessionState::Anonymous
        )
    }
}

/// Owner of the session state machine and the auth operations.
pub struct SessionController {
    http: Arc<HttpClient>,
    tokens: Arc<TokenStore>,
    state: watch::Sender<SessionState>,
    /// Serializes session checks so concurrent callers cannot duplicate the
    /// `/auth/me` fetch.
    check_lock: tokio::sync::Mutex<()>,
    last_error: Mutex<Option<String>>,
}

impl SessionController {
    pub fn new(http: Arc<HttpClient>, tokens: Arc<TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            http,
            tokens,
            state,
            check_lock: tokio::sync::Mutex::new(()),
            last_error: Mutex::new(None),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().expect("error slot poisoned").clone()
    }

    fn record_error(&self, message: impl Into<String>) {
        *self.last_error.lock().expect("error slot poisoned") = Some(message.into());
    }

    fn clear_error(&self) {
        *self.last_error.lock().expect("error slot poisoned") = None;
    }

    // -- operations ----------------------------------------------------------

    /// Reconcile local token state with the backend's view of the session.
    ///
    /// Outcomes:
    /// - no token: `Anonymous`, zero network calls;
    /// - locally expired token: token removed, `Anonymous`;
    /// - `/auth/me` succeeds: `Authenticated(user)`;
    /// - `/auth/me` rejects the token (401): token removed, `Anonymous`;
    /// - any other failure: token kept, back to `Uninitialized` so a later
    ///   call retries.
    ///
    /// A call that finds the machine already settled returns the settled
    /// state without touching the network.
    pub async fn check_auth_status(&self) -> SessionState {
        let _guard = self.check_lock.lock().await;
        if self.state.borrow().is_settled() {
            return self.state();
        }

        self.state.send_replace(SessionState::Checking);

        if !self.tokens.has_token() {
            tracing::debug!("no stored token; session is anonymous");
            return self.settle(SessionState::Anonymous);
        }

        if !self.tokens.is_token_valid() {
            tracing::debug!("stored token expired locally; clearing it");
            self.tokens.remove_token();
            return self.settle(SessionState::Anonymous);
        }

        match api::auth::me(&self.http).await {
            Ok(user) => {
                self.clear_error();
                self.settle(SessionState::Authenticated(user))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("backend rejected stored token; clearing it");
                self.tokens.remove_token();
                self.record_error(SESSION_EXPIRED);
                self.settle(SessionState::Anonymous)
            }
            Err(e) => {
                // Transient failure: keep the token, allow a retry later.
                tracing::warn!(code = %e.code(), error = %e, "session check failed transiently");
                self.record_error(SESSION_CHECK_FAILED);
                self.settle(SessionState::Uninitialized)
            }
        }
    }

    /// Exchange credentials for a token and user.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        match api::auth::login(&self.http, credentials).await {
            Ok(response) => {
                self.tokens.remove_token();
                self.tokens.set_token(&response.access_token);
                self.clear_error();
                self.state
                    .send_replace(SessionState::Authenticated(response.user.clone()));
                tracing::info!(user = %response.user.username, "login succeeded");
                Ok(response.user)
            }
            Err(e) => {
                self.record_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Create an account; the backend logs the new user straight in.
    pub async fn register(&self, payload: &RegisterUser) -> Result<User, ApiError> {
        match api::auth::register(&self.http, payload).await {
            Ok(response) => {
                match &response.auth_token {
                    Some(token) => self.tokens.set_token(token),
                    None => {
                        tracing::warn!("registration response carried no auth token")
                    }
                }
                self.clear_error();
                self.state
                    .send_replace(SessionState::Authenticated(response.user.clone()));
                Ok(response.user)
            }
            Err(e) => {
                self.record_error(e.to_string());
                Err(e)
            }
        }
    }

    /// End the session.
    ///
    /// The backend notification is best-effort: a network failure never
    /// blocks the local logout. The response cache is dropped with the
    /// session since everything cached was fetched as this user.
    pub async fn logout(&self) {
        if let Err(e) = api::auth::logout(&self.http).await {
            tracing::warn!(error = %e, "logout notification failed; clearing local session anyway");
        }
        self.tokens.remove_token();
        self.http.clear_cache(None);
        self.state.send_replace(SessionState::Anonymous);
    }

    /// Partially update the session user's profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        changes: &UserUpdate,
    ) -> Result<User, ApiError> {
        match api::users::update(&self.http, user_id, changes).await {
            Ok(user) => {
                self.clear_error();
                if self.state.borrow().is_authenticated() {
                    self.state
                        .send_replace(SessionState::Authenticated(user.clone()));
                }
                Ok(user)
            }
            Err(e) => {
                self.record_error(e.to_string());
                Err(e)
            }
        }
    }

    fn settle(&self, state: SessionState) -> SessionState {
        self.state.send_replace(state);
        self.state()
    }
}
