//! The request layer.
//!
//! [`HttpClient`] owns URL building, header merging, auth-token injection,
//! body serialization, timeout enforcement, response decoding, and a
//! TTL-bounded cache for GET responses. File transfer helpers live in
//! [`transfer`].

mod cache;
mod client;
mod options;
mod transfer;

pub use cache::{CachedResponse, ResponseCache, DEFAULT_CACHE_TTL};
pub use client::{ApiResponse, HttpClient};
pub use options::{Method, RequestBody, RequestOptions, DEFAULT_TIMEOUT_MS};
pub use transfer::ProgressFn;
