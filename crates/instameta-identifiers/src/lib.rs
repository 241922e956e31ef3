//! Instagram post identifiers
//!
//! This crate turns "something that points at an Instagram post" into a post
//! reference:
//! - Shortcode extraction from `/p/`, `/reel/` and `/tv/` URLs
//! - Post URL resolution from task arguments, the item URL, or a sidecar file
//! - Sidecar lookup for yt-dlp / gallery-dl style `.json` metadata files

pub mod error;
pub mod extractors;
pub mod resolver;
pub mod sidecar;

pub use error::*;
pub use extractors::*;
pub use resolver::*;
pub use sidecar::*;
