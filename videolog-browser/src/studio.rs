//! Studio registry
//!
//! A studio is a named point of interest with an acceptance radius. The
//! registry is built once and never mutated.
//!
//! Studio equality and hashing use identity only. Two studios at the same
//! place with the same name are still different studios; use
//! [`Studio::same_site`] to compare values.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use videolog_common::config::StudioEntry;
use videolog_common::{uuid_utils, Coordinate, Error, Result};

/// Built-in studio used when configuration lists none
pub const DEFAULT_STUDIO_NAME: &str = "Inspiration Studios";
pub const DEFAULT_STUDIO_LATITUDE: f64 = 37.484778;
pub const DEFAULT_STUDIO_LONGITUDE: f64 = -122.228150;

/// Namespace for ids of configured studios
const STUDIO_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a0e_2c41_94d7_4f0b_8e35_1b7c_d9f2_a460);

/// Opaque studio identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudioId(Uuid);

impl StudioId {
    pub fn new() -> Self {
        Self(uuid_utils::generate())
    }

    /// Stable id for a configured site
    ///
    /// The same name and center give the same id in every process, so an id
    /// printed by one run can be looked up by the next.
    pub fn for_site(name: &str, center: Coordinate) -> Self {
        let key = format!("{}|{}|{}", name.trim(), center.latitude, center.longitude);
        Self(uuid_utils::name_based(&STUDIO_ID_NAMESPACE, &key))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StudioId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StudioId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for StudioId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        uuid_utils::parse(s).map(Self)
    }
}

impl std::fmt::Display for StudioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named geographic location with a search radius
#[derive(Debug, Clone)]
pub struct Studio {
    id: StudioId,
    name: String,
    center: Coordinate,
    radius_m: f64,
}

impl Studio {
    /// Create a studio with a fresh identity
    pub fn new(name: impl Into<String>, center: Coordinate, radius_m: f64) -> Result<Self> {
        Self::with_id(StudioId::new(), name, center, radius_m)
    }

    /// Create a studio with a caller-chosen identity
    pub fn with_id(
        id: StudioId,
        name: impl Into<String>,
        center: Coordinate,
        radius_m: f64,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("studio name is empty".to_string()));
        }
        center.validate()?;
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(Error::InvalidInput(format!(
                "studio '{}' has invalid radius {}",
                name, radius_m
            )));
        }
        Ok(Self {
            id,
            name,
            center,
            radius_m,
        })
    }

    pub fn id(&self) -> StudioId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Acceptance radius in meters
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Value comparison: same name, center and radius, identity ignored
    pub fn same_site(&self, other: &Studio) -> bool {
        self.name == other.name && self.center == other.center && self.radius_m == other.radius_m
    }
}

impl PartialEq for Studio {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Studio {}

impl Hash for Studio {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Ordered, immutable list of studios
#[derive(Debug, Clone)]
pub struct StudioRegistry {
    studios: Vec<Studio>,
}

impl StudioRegistry {
    pub fn new(studios: Vec<Studio>) -> Self {
        Self { studios }
    }

    /// Registry holding only the built-in default studio
    pub fn builtin() -> Self {
        let center = Coordinate {
            latitude: DEFAULT_STUDIO_LATITUDE,
            longitude: DEFAULT_STUDIO_LONGITUDE,
        };
        let studio = Studio {
            id: StudioId::for_site(DEFAULT_STUDIO_NAME, center),
            name: DEFAULT_STUDIO_NAME.to_string(),
            center,
            radius_m: videolog_common::config::DEFAULT_RADIUS_M,
        };
        Self::new(vec![studio])
    }

    /// Build from `[[studios]]` entries, falling back to the built-in studio
    ///
    /// Ids are derived from each entry's name and center, so rebuilding from
    /// the same configuration yields the same ids.
    pub fn from_entries(entries: &[StudioEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Ok(Self::builtin());
        }

        let mut studios: Vec<Studio> = Vec::with_capacity(entries.len());
        for e in entries {
            let center = Coordinate::new(e.latitude, e.longitude)
                .map_err(|err| Error::Config(format!("studio '{}': {}", e.name, err)))?;
            let id = StudioId::for_site(&e.name, center);
            if studios.iter().any(|s| s.id == id) {
                return Err(Error::Config(format!(
                    "studio '{}' is listed twice at the same location",
                    e.name
                )));
            }
            studios.push(Studio::with_id(id, e.name.clone(), center, e.radius_m)?);
        }
        Ok(Self::new(studios))
    }

    /// Studios in registration order
    pub fn studios(&self) -> &[Studio] {
        &self.studios
    }

    pub fn get(&self, id: StudioId) -> Option<&Studio> {
        self.studios.iter().find(|s| s.id == id)
    }

    /// Case-insensitive name lookup; first match wins
    pub fn find_by_name(&self, name: &str) -> Option<&Studio> {
        let wanted = name.trim();
        self.studios
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
    }

    /// Look up by id string, falling back to name
    pub fn lookup(&self, key: &str) -> Option<&Studio> {
        key.parse::<StudioId>()
            .ok()
            .and_then(|id| self.get(id))
            .or_else(|| self.find_by_name(key))
    }

    pub fn len(&self) -> usize {
        self.studios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.studios.is_empty()
    }
}
