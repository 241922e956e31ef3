//! # instameta-core
//!
//! Instagram metadata enrichment for Stash scenes and images.
//!
//! A run resolves the Instagram post URL for an item, fetches the post JSON,
//! maps it to a [`PostRecord`](instameta_domain::PostRecord) and writes
//! title, date, URL and a username tag back to the host.

pub mod apply;
pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod pipeline;
pub mod plugin;
pub mod sources;

pub use apply::{apply_post, plan_field_updates, should_write, ApplyOutcome};
pub use config::{HostConfig, InstagramConfig, InstametaConfig};
pub use error::{InstametaError, Result};
pub use host::{HostApi, HostError, ServerConnection, StashClient};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, HttpTransport};
pub use pipeline::{scrape_post, Pipeline, RunReport};
pub use plugin::{
    read_scrape_url, HookEvent, Invocation, ItemTarget, PluginInput, PluginOutput,
    ScrapedFragment, ScrapedTag,
};
pub use sources::{map_post, FetchError, InstagramSource};

// Re-export domain types for convenience
pub use instameta_domain::{
    Item, ItemKind, ItemUpdate, PostKind, PostRecord, PostRef, TagRef, TaskArgs,
};
