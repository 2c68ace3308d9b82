//! Client SDK for the Side Quest backend.
//!
//! The pieces compose bottom-up:
//!
//! - [`token`] -- bearer-token persistence and local expiry checks.
//! - [`http`] -- the request layer: URL building, header merge, auth
//!   injection, timeout handling, a TTL'd GET cache, file transfer helpers.
//! - [`api`] -- one typed request/response binding per backend endpoint.
//! - [`session`] -- the authentication state machine
//!   (`Uninitialized -> Checking -> Authenticated | Anonymous`).
//! - [`store`] -- adventurer/quest list state driven by the api layer.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod token;

pub use config::{ClientConfig, Environment};
pub use error::ApiError;
pub use http::{ApiResponse, HttpClient, RequestOptions};
pub use session::{SessionController, SessionState};
pub use store::{AdventurerStore, QuestStore};
pub use token::TokenStore;
