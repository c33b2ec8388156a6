//! Security classification and trading venue.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Security group used to filter search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    /// Shares and depositary receipts.
    Share,
    /// Bonds.
    Bond,
    /// Indices.
    Index,
    /// Futures.
    Future,
}

impl SecurityKind {
    /// Returns the substring the exchange's `group` column contains for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Bond => "bond",
            Self::Index => "index",
            Self::Future => "future",
        }
    }
}

impl std::fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SecurityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "share" | "shares" | "stock" => Ok(Self::Share),
            "bond" | "bonds" => Ok(Self::Bond),
            "index" | "indices" => Ok(Self::Index),
            "future" | "futures" => Ok(Self::Future),
            _ => Err(format!(
                "Unknown security kind: {s}. Valid options: share, bond, index, future"
            )),
        }
    }
}

/// Primary trading venue of a security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Security code.
    pub sec_id: String,
    /// Board code, e.g. `TQCB`.
    pub board: String,
    /// Market code, e.g. `bonds`.
    pub market: String,
    /// Engine code, e.g. `stock`.
    pub engine: String,
    /// Trading currency, if reported.
    pub currency: Option<String>,
}

impl Listing {
    /// Returns true if the security trades on the futures engine.
    #[must_use]
    pub fn is_futures(&self) -> bool {
        self.engine == "futures"
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}/{}/{})",
            self.sec_id, self.engine, self.market, self.board
        )
    }
}
