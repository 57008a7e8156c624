//! videolog-browser library interface
//!
//! Browse video clips from a media library that were recorded near named
//! studio locations. The platform library is reached through the
//! [`library::MediaLibrary`] trait; [`session::BrowseSession`] ties the
//! pieces together for a UI.

pub mod config;
pub mod error;
pub mod filter;
pub mod library;
pub mod manifest;
pub mod metadata;
pub mod permission;
pub mod session;
pub mod studio;
pub mod thumbnails;

pub use crate::error::{SessionError, SessionResult};
pub use crate::filter::{AssetCache, AssetList};
pub use crate::library::{LibraryError, MediaAsset, MediaLibrary};
pub use crate::session::BrowseSession;
pub use crate::studio::{Studio, StudioId, StudioRegistry};
