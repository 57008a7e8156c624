//! Supporting types carried by events

use serde::{Deserialize, Serialize};

/// Media library authorization status
///
/// Mirrors the states a platform photo library reports. Only `Authorized`
/// permits enumerating the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// User has not answered the prompt yet
    #[default]
    NotDetermined,
    /// Access blocked by policy; the user cannot change it
    Restricted,
    /// User refused access
    Denied,
    /// User granted access to a selection of items only
    Limited,
    /// Full read access
    Authorized,
}

impl AuthorizationStatus {
    /// Whether the library may be enumerated
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }

    /// Whether a request is still outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, AuthorizationStatus::NotDetermined)
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthorizationStatus::NotDetermined => "not determined",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Limited => "limited",
            AuthorizationStatus::Authorized => "authorized",
        };
        f.write_str(s)
    }
}

/// Pixel dimensions of a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self::new(200, 200)
    }
}
