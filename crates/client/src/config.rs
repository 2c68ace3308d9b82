//! Environment-profile configuration.
//!
//! A named environment selector chooses among fixed profiles, each supplying
//! an API base URL and API version segment. The development profile keeps an
//! empty base URL: requests then resolve against a local proxy origin, the
//! native analog of same-origin proxying in the browser build.

use std::fmt;
use std::str::FromStr;

/// API version segment used by every profile.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Origin used when a profile carries no base URL (local development).
pub const DEFAULT_PROXY_ORIGIN: &str = "http://localhost:5000";

/// Deployment environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: '{other}'")),
        }
    }
}

/// Client configuration resolved from an environment profile.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Absolute API origin, or empty to route through the proxy origin.
    pub api_url: String,
    /// Version segment inserted into every endpoint path (e.g. `v1`).
    pub api_version: String,
    /// Origin substituted when `api_url` is empty.
    pub proxy_origin: String,
}

impl ClientConfig {
    /// The built-in profile for an environment.
    pub fn for_env(environment: Environment) -> Self {
        let api_url = match environment {
            // Empty: relative paths through the local proxy.
            Environment::Development => "",
            Environment::Test => "https://test-api.side-quest.example.com",
            Environment::Production => "https://api.side-quest.example.com",
        };
        Self {
            environment,
            api_url: api_url.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            proxy_origin: DEFAULT_PROXY_ORIGIN.to_string(),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                   |
    /// |--------------------------|---------------------------|
    /// | `SIDEQUEST_ENV`          | `development`             |
    /// | `SIDEQUEST_API_URL`      | per-profile base URL      |
    /// | `SIDEQUEST_PROXY_ORIGIN` | `http://localhost:5000`   |
    ///
    /// An unknown `SIDEQUEST_ENV` value falls back to the development
    /// profile, matching the permissive selector of the browser build.
    pub fn from_env() -> Self {
        let environment = std::env::var("SIDEQUEST_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Development);

        let mut config = Self::for_env(environment);

        if let Ok(url) = std::env::var("SIDEQUEST_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(origin) = std::env::var("SIDEQUEST_PROXY_ORIGIN") {
            config.proxy_origin = origin.trim_end_matches('/').to_string();
        }

        config
    }

    /// A config pointing at an explicit base URL (tests, custom deployments).
    pub fn with_base(base_url: impl Into<String>) -> Self {
        let mut config = Self::for_env(Environment::Test);
        config.api_url = base_url.into().trim_end_matches('/').to_string();
        config
    }

    /// The origin every request resolves against.
    pub fn origin(&self) -> &str {
        if self.api_url.is_empty() {
            &self.proxy_origin
        } else {
            &self.api_url
        }
    }

    /// Path prefix for versioned endpoints (e.g. `/api/v1`).
    pub fn api_base(&self) -> String {
        format!("/api/{}", self.api_version)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
