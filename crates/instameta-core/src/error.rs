//! Error types for instameta-core

use instameta_domain::ItemKind;
use instameta_identifiers::IdentifierError;
use thiserror::Error;

use crate::host::HostError;
use crate::http::HttpError;
use crate::sources::FetchError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, InstametaError>;

/// Main error type; every variant ends the current invocation
#[derive(Error, Debug)]
pub enum InstametaError {
    /// No resolution source yielded a URL
    #[error("No Instagram URL found (provide args.url or ensure item.url/sidecar contains it)")]
    NoUrlFound,

    /// URL is not a recognized post URL shape
    #[error("Could not extract shortcode from URL: {0}")]
    InvalidUrl(String),

    /// Authenticated and fallback requests both failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Fetched JSON lacks required fields
    #[error("Instagram response did not contain expected fields: {0}")]
    MalformedResponse(String),

    /// A host mutation (tag create or item update) failed
    #[error("Host update failed: {0}")]
    Update(HostError),

    /// A host read query failed
    #[error("Host query failed: {0}")]
    Host(#[from] HostError),

    /// No scene/image id in the plugin input
    #[error("Unable to determine target Scene/Image id from hookContext or args")]
    Target,

    #[error("{0} {1} not found")]
    ItemNotFound(ItemKind, String),

    /// Stdin could not be parsed
    #[error("Failed to parse input JSON: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),
}

impl From<IdentifierError> for InstametaError {
    fn from(err: IdentifierError) -> Self {
        match err {
            IdentifierError::NoUrlFound => InstametaError::NoUrlFound,
            IdentifierError::InvalidUrl(url) => InstametaError::InvalidUrl(url),
        }
    }
}

impl From<serde_json::Error> for InstametaError {
    fn from(err: serde_json::Error) -> Self {
        InstametaError::Input(err.to_string())
    }
}

impl From<toml::de::Error> for InstametaError {
    fn from(err: toml::de::Error) -> Self {
        InstametaError::Config(err.to_string())
    }
}
