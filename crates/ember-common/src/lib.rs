//! # Ember Common
//!
//! Common types shared by the Ember client crates.
//!
//! This crate provides:
//! - Tile coordinates with the distance metric used for audio falloff
//! - ID types for sound effects and music tracks
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
