//! TTL-bounded cache for GET responses.
//!
//! Entries are keyed by method + URL + caller-supplied headers and kept as
//! raw bytes; callers re-decode on a hit. Losing an entry is never a
//! correctness problem -- it only costs an extra network call.
//!
//! Mutating requests invalidate the cached entries of the resource families
//! their path touches (`POST /api/v1/quest` evicts `/api/v1/quests/...`
//! listings and `/api/v1/quest/{id}` reads), so a freshly written record is
//! re-fetched instead of served stale until TTL expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bytes::Bytes;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::Method;
use sidequest_core::types::Timestamp;

/// Default freshness window for cached GET responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A raw response as stored in (and served from) the cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// When the payload was actually retrieved from the network.
    pub fetched_at: Timestamp,
}

struct Entry {
    response: CachedResponse,
    /// URL path retained for resource-family invalidation.
    url_path: String,
    expires_at: Instant,
}

/// Shared response cache.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled,
        }
    }

    /// Disabled cache: every lookup misses, every insert is dropped.
    pub fn disabled() -> Self {
        Self::new(DEFAULT_CACHE_TTL, false)
    }

    /// Cache key: method, full URL, and the caller-supplied headers
    /// normalized to lowercase names and sorted so ordering does not split
    /// otherwise-identical requests.
    pub fn cache_key(method: &Method, url: &str, headers: &[(String, String)]) -> String {
        let mut pairs: Vec<String> = headers
            .iter()
            .map(|(name, value)| format!("{}={value}", name.to_ascii_lowercase()))
            .collect();
        pairs.sort();
        format!("{method}:{url}:{}", pairs.join("&"))
    }

    /// Fetch a fresh entry, dropping it if the freshness window has passed.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        if !self.enabled {
            return None;
        }
        let mut entries = self.entries.lock().expect("cache poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, url_path: String, response: CachedResponse) {
        if !self.enabled {
            return;
        }
        let entry = Entry {
            response,
            url_path,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().expect("cache poisoned").insert(key, entry);
    }

    /// Clear everything, or only the entries whose key matches `pattern`.
    pub fn clear(&self, pattern: Option<&Regex>) {
        let mut entries = self.entries.lock().expect("cache poisoned");
        match pattern {
            None => entries.clear(),
            Some(pattern) => entries.retain(|key, _| !pattern.is_match(key)),
        }
    }

    /// Evict entries belonging to the resource families named by `path`.
    ///
    /// Family stems are the alphabetic path segments (minus the `api` and
    /// version segments) trimmed of a trailing `s`, so `quest` and `quests`
    /// fall in one family.
    pub fn invalidate_related(&self, path: &str) {
        let stems = family_stems(path);
        if stems.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().expect("cache poisoned");
        entries.retain(|_, entry| {
            !family_stems(&entry.url_path)
                .iter()
                .any(|stem| stems.contains(stem))
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("cache poisoned").len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, true)
    }
}

/// Resource-family stems of a URL path.
///
/// Id segments are skipped by requiring purely alphabetic segments, which
/// also drops version segments like `v1`.
fn family_stems(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| segment.chars().all(|c| c.is_ascii_alphabetic()))
        .filter(|segment| *segment != "api")
        .map(|segment| segment.trim_end_matches('s').to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
