//! Error types for URL resolution and shortcode extraction

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentifierError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// None of the resolution sources yielded a URL
    #[error("No Instagram URL found (provide args.url or ensure item.url/sidecar contains it)")]
    NoUrlFound,

    /// A URL was found but is not a recognized post URL
    #[error("Not an Instagram post URL: {0}")]
    InvalidUrl(String),
}
