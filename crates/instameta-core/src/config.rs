//! Configuration for instameta-core
//!
//! Endpoint templates, request timeouts and the fallback session credential.
//! The binary builds this once (file, then environment overrides) and passes
//! it down; nothing below reads the process environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{InstametaError, Result};

/// Placeholder replaced with the post shortcode in endpoint templates
pub const SHORTCODE_PLACEHOLDER: &str = "{shortcode}";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstametaConfig {
    pub instagram: InstagramConfig,
    pub host: HostConfig,
}

/// Instagram request settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    /// Cookie-authenticated post JSON endpoint, `{shortcode}` is substituted
    pub authenticated_url: String,
    /// Unauthenticated web GraphQL endpoint
    pub public_url: String,
    /// Persisted query hash for the shortcode media lookup
    pub public_query_hash: String,
    pub user_agent: String,
    /// Web app id sent as `X-IG-App-ID`
    pub app_id: String,
    pub timeout_secs: u64,
    /// Fallback `sessionid` cookie when the task does not supply one
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            authenticated_url: "https://www.instagram.com/p/{shortcode}/?__a=1&__d=dis".to_string(),
            public_url: "https://www.instagram.com/graphql/query/".to_string(),
            public_query_hash: "b3055c01b4b222b8a47dc12b090e4e64".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
            app_id: "936619743392459".to_string(),
            timeout_secs: 15,
            session_id: None,
        }
    }
}

// Hand-written so the credential never ends up in logs
impl fmt::Debug for InstagramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstagramConfig")
            .field("authenticated_url", &self.authenticated_url)
            .field("public_url", &self.public_url)
            .field("public_query_hash", &self.public_query_hash)
            .field("user_agent", &self.user_agent)
            .field("app_id", &self.app_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("session_id", &self.session_id.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl InstagramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Authenticated endpoint for a shortcode
    pub fn authenticated_url_for(&self, shortcode: &str) -> String {
        self.authenticated_url
            .replace(SHORTCODE_PLACEHOLDER, shortcode)
    }
}

/// Host GraphQL client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { timeout_secs: 20 }
    }
}

impl HostConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl InstametaConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            InstametaError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Use `session_id` as the fallback credential when it is non-blank
    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        if let Some(id) = session_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            self.instagram.session_id = Some(id);
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.instagram.timeout_secs == 0 || self.host.timeout_secs == 0 {
            return Err(InstametaError::Config(
                "timeouts must be positive".to_string(),
            ));
        }
        if !self.instagram.authenticated_url.contains(SHORTCODE_PLACEHOLDER) {
            return Err(InstametaError::Config(format!(
                "instagram.authenticated_url must contain {}",
                SHORTCODE_PLACEHOLDER
            )));
        }
        url::Url::parse(&self.instagram.public_url).map_err(|e| {
            InstametaError::Config(format!("instagram.public_url: {}", e))
        })?;
        Ok(())
    }
}
