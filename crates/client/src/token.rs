//! Bearer-token storage and local validity checks.
//!
//! The store wraps a single persistent slot holding the session token. At
//! most one token exists at a time; it lives from a successful login or
//! registration until logout, expiry, or rejection by the backend.
//!
//! Validity is purely a local comparison of the embedded `exp` claim against
//! the current time. The signature is opaque to the client -- no secret is
//! held here and none is verified; the backend re-establishes trust on every
//! request. Every decode problem fails closed to "invalid".

use std::path::PathBuf;
use std::sync::Mutex;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use sidequest_core::types::Timestamp;

/// File name of the persisted token (the `auth_token` storage key).
pub const TOKEN_FILE_NAME: &str = "auth_token";

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A persistent slot holding at most one token string.
pub trait TokenSlot: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, token: &str);
    fn clear(&self);
}

/// In-memory slot for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenSlot {
    cell: Mutex<Option<String>>,
}

impl TokenSlot for MemoryTokenSlot {
    fn read(&self) -> Option<String> {
        self.cell.lock().expect("token slot poisoned").clone()
    }

    fn write(&self, token: &str) {
        *self.cell.lock().expect("token slot poisoned") = Some(token.to_string());
    }

    fn clear(&self) {
        *self.cell.lock().expect("token slot poisoned") = None;
    }
}

/// Slot persisted as a single file under a data directory.
///
/// Storage failures are logged rather than propagated: losing the slot only
/// means the user has to log in again.
pub struct FileTokenSlot {
    path: PathBuf,
}

impl FileTokenSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(TOKEN_FILE_NAME),
        }
    }
}

impl TokenSlot for FileTokenSlot {
    fn read(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn write(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!(error = %e, path = %parent.display(), "cannot create token directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, token) {
            tracing::error!(error = %e, path = %self.path.display(), "cannot persist token");
        }
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(error = %e, path = %self.path.display(), "cannot remove token");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The claims the client reads out of a session token.
///
/// Only `exp` matters locally; everything else is for the backend.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: i64,
}

/// Decode the claims without verifying the signature.
///
/// A missing `exp` claim is a decode error (the field is mandatory in
/// [`TokenClaims`]), so malformed and expiry-less tokens take the same
/// fail-closed path.
fn decode_claims(token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data =
        jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The session token store.
pub struct TokenStore {
    slot: Box<dyn TokenSlot>,
}

impl TokenStore {
    pub fn new(slot: Box<dyn TokenSlot>) -> Self {
        Self { slot }
    }

    /// Store keeping the token in memory only.
    pub fn in_memory() -> Self {
        Self::new(Box::<MemoryTokenSlot>::default())
    }

    /// Store persisting the token under `dir`.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileTokenSlot::new(dir)))
    }

    pub fn has_token(&self) -> bool {
        self.slot.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.slot.read()
    }

    pub fn set_token(&self, token: &str) {
        self.slot.write(token);
    }

    pub fn remove_token(&self) {
        self.slot.clear();
    }

    /// Whether a stored token exists and its `exp` claim is in the future.
    ///
    /// Absent, undecodable, and expiry-less tokens all yield `false`.
    pub fn is_token_valid(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        match decode_claims(&token) {
            Ok(claims) => claims.exp > chrono::Utc::now().timestamp(),
            Err(e) => {
                tracing::debug!(error = %e, "stored token failed to decode");
                false
            }
        }
    }

    /// The token's expiry as a UTC timestamp, `None` on any decode failure.
    pub fn expiration(&self) -> Option<Timestamp> {
        let token = self.token()?;
        let claims = decode_claims(&token).ok()?;
        chrono::DateTime::from_timestamp(claims.exp, 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    /// Mint an HS256 token whose `exp` is `offset_secs` from now.
    fn token_with_exp(offset_secs: i64) -> String {
        let claims = serde_json::json!({
            "sub": "user-1",
            "exp": chrono::Utc::now().timestamp() + offset_secs,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encoding should succeed")
    }

    fn token_without_exp() -> String {
        let claims = serde_json::json!({ "sub": "user-1" });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encoding should succeed")
    }

    // -- round trip ----------------------------------------------------------

    #[test]
    fn set_get_remove_round_trip() {
        let store = TokenStore::in_memory();
        assert!(!store.has_token());

        store.set_token("abc.def.ghi");
        assert_eq!(store.token().as_deref(), Some("abc.def.ghi"));

        store.remove_token();
        assert!(!store.has_token());
        assert!(store.token().is_none());
    }

    #[test]
    fn file_slot_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::on_disk(dir.path());

        store.set_token("abc.def.ghi");
        // A second store over the same directory sees the persisted token.
        let reopened = TokenStore::on_disk(dir.path());
        assert_eq!(reopened.token().as_deref(), Some("abc.def.ghi"));

        reopened.remove_token();
        assert!(!store.has_token());
    }

    // -- validity ------------------------------------------------------------

    #[test]
    fn future_exp_is_valid() {
        let store = TokenStore::in_memory();
        store.set_token(&token_with_exp(3600));
        assert!(store.is_token_valid());
    }

    #[test]
    fn past_exp_is_invalid() {
        let store = TokenStore::in_memory();
        store.set_token(&token_with_exp(-3600));
        assert!(!store.is_token_valid());
    }

    #[test]
    fn missing_token_is_invalid() {
        let store = TokenStore::in_memory();
        assert!(!store.is_token_valid());
    }

    #[test]
    fn malformed_token_is_invalid_without_panicking() {
        let store = TokenStore::in_memory();
        store.set_token("not-a-jwt");
        assert!(!store.is_token_valid());

        store.set_token("three.dot.segments-but-garbage");
        assert!(!store.is_token_valid());
    }

    #[test]
    fn token_without_exp_claim_is_invalid() {
        let store = TokenStore::in_memory();
        store.set_token(&token_without_exp());
        assert!(!store.is_token_valid());
        assert!(store.expiration().is_none());
    }

    // -- expiration ----------------------------------------------------------

    #[test]
    fn expiration_matches_claim() {
        let store = TokenStore::in_memory();
        store.set_token(&token_with_exp(3600));

        let exp = store.expiration().expect("expiration should decode");
        let delta = exp.timestamp() - chrono::Utc::now().timestamp();
        assert!((3590..=3610).contains(&delta));
    }
}
