//! Acceptance window for asset creation timestamps
//!
//! An asset is eligible when its creation timestamp is on or after the
//! window's cutoff. Assets with no timestamp are never eligible. There is no
//! upper bound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::months_before;

/// Default length of a rolling window in months
pub const DEFAULT_ROLLING_MONTHS: u32 = 6;

/// Rule that decides the earliest acceptable creation timestamp
///
/// Serialized with a `kind` tag so it reads naturally in TOML:
///
/// ```toml
/// [acceptance_window]
/// kind = "rolling"
/// months = 6
/// ```
///
/// or
///
/// ```toml
/// [acceptance_window]
/// kind = "since"
/// cutoff = "2024-12-27T00:00:00Z"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcceptanceWindow {
    /// Fixed calendar cutoff
    Since { cutoff: DateTime<Utc> },

    /// Cutoff is `now` minus a number of calendar months
    Rolling { months: u32 },
}

impl Default for AcceptanceWindow {
    fn default() -> Self {
        AcceptanceWindow::Rolling {
            months: DEFAULT_ROLLING_MONTHS,
        }
    }
}

impl AcceptanceWindow {
    /// Earliest accepted timestamp, evaluated at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            AcceptanceWindow::Since { cutoff } => cutoff,
            AcceptanceWindow::Rolling { months } => months_before(now, months),
        }
    }

    /// Whether an asset created at `created_at` falls inside the window
    pub fn accepts(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let cutoff = self.cutoff(now);
        created_at.is_some_and(|t| t >= cutoff)
    }
}

impl std::fmt::Display for AcceptanceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptanceWindow::Since { cutoff } => write!(f, "since {}", cutoff.to_rfc3339()),
            AcceptanceWindow::Rolling { months } => write!(f, "last {} months", months),
        }
    }
}
