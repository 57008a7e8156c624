//! # videolog Common Library
//!
//! Shared code for the videolog crates including:
//! - Error types
//! - Event types (VideologEvent enum) and the EventBus
//! - Configuration loading
//! - Geographic coordinates and great-circle distance
//! - Acceptance window (timestamp cutoff) rules
//! - Utility functions

pub mod config;
pub mod error;
pub mod events;
pub mod geo;
pub mod time;
pub mod uuid_utils;
pub mod window;

pub use error::{Error, Result};
pub use geo::Coordinate;
pub use window::AcceptanceWindow;
