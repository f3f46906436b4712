//! # Ember Client
//!
//! Glue between the client shell and the audio core:
//! - `config`: the `ember.toml` file (profile, login music, assets)
//! - `focus`: routes window focus events into the coordinator
//! - `frame`: fixed-rate frame loop driving the coordinator

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod focus;
pub mod frame;

pub use config::ClientConfig;
pub use focus::FocusRouter;
pub use frame::{FrameLoop, StopReason};
