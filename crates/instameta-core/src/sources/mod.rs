//! Post metadata sources

pub mod instagram;
pub mod payload;

pub use instagram::*;
pub use payload::*;
