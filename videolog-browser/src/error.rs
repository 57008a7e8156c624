//! Error types for videolog-browser

use thiserror::Error;

use crate::library::LibraryError;
use crate::metadata::InspectError;
use crate::studio::StudioId;

/// Browse session error type
#[derive(Debug, Error)]
pub enum SessionError {
    /// Studio id is not in the registry
    #[error("Unknown studio: {0}")]
    UnknownStudio(StudioId),

    /// Thumbnails were requested before the studio's assets were loaded
    #[error("Studio {0} has not been opened")]
    StudioNotLoaded(StudioId),

    /// Asset id not present in the library
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// Library access has not been granted
    #[error("Media library access not granted")]
    NotAuthorized,

    /// Media library error
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Metadata inspection error
    #[error(transparent)]
    Inspect(#[from] InspectError),

    /// videolog-common error
    #[error("Common error: {0}")]
    Common(#[from] videolog_common::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
