//! Host application API (item reads, item updates, tags)

pub mod queries;
pub mod stash;

pub use stash::*;

use instameta_domain::{Item, ItemKind, ItemUpdate, TagRef};
use thiserror::Error;

/// Errors from the host API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// The operations the pipeline needs from the host.
///
/// Implementations must treat tag names as unique so that find-or-create
/// stays idempotent across runs.
#[allow(async_fn_in_trait)]
pub trait HostApi {
    /// Read an item by id; `Ok(None)` when it does not exist
    async fn find_item(&self, kind: ItemKind, id: &str) -> Result<Option<Item>, HostError>;

    /// Apply a patch to an item
    async fn update_item(&self, kind: ItemKind, update: &ItemUpdate) -> Result<(), HostError>;

    /// Find a tag by exact name
    async fn find_tag(&self, name: &str) -> Result<Option<TagRef>, HostError>;

    /// Create a tag with the given name
    async fn create_tag(&self, name: &str) -> Result<TagRef, HostError>;
}
