//! Domain types shared by the instameta crates
//!
//! This crate provides the models that flow through the enrichment pipeline:
//! - Item: a scene or image record owned by the host application
//! - TaskArgs: the per-invocation arguments supplied by the host
//! - PostRef: an Instagram post shortcode plus the URL path kind it came from
//! - PostRecord: caption, date, permalink and username mapped from a post
//! - ItemUpdate: the patch written back onto the host item

pub mod args;
pub mod item;
pub mod post;
pub mod update;

pub use args::*;
pub use item::*;
pub use post::*;
pub use update::*;
