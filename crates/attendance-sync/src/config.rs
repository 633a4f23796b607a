//! Client configuration, injected at construction instead of read from
//! process-global state.

use std::fmt;

/// Default contents API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default branch that writes target.
pub const DEFAULT_BRANCH: &str = "main";

/// Access token for the remote repository.
///
/// `Debug` output is redacted so the token never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Configuration for a [`DocumentStore`](crate::store::DocumentStore)
/// backed by the GitHub contents API.
#[derive(Debug, Clone)]
pub struct Config {
    /// Access token. Operations fail with
    /// [`StoreError::CredentialMissing`](crate::contents::StoreError::CredentialMissing)
    /// when unset, without touching the network.
    pub token: Option<AccessToken>,
    /// Target repository in `owner/name` form.
    pub repo: String,
    /// Branch that writes target.
    pub branch: String,
    /// Contents API base URL.
    pub api_base: String,
}

impl Config {
    /// Configuration for a repository with the default branch and endpoint.
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            token: None,
            repo: repo.into(),
            branch: DEFAULT_BRANCH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ATTENDANCE_REPO`: target repository in `owner/name` form
    ///
    /// Optional:
    /// - `GITHUB_TOKEN`: access token. A missing or empty token still loads;
    ///   each operation then reports the missing credential itself.
    pub fn from_env() -> Result<Self, ConfigError> {
        let repo = std::env::var("ATTENDANCE_REPO").map_err(|_| ConfigError::MissingRepo)?;

        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);

        Ok(Self {
            token,
            ..Self::new(repo)
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ATTENDANCE_REPO environment variable not set")]
    MissingRepo,
}
