//! Enumeration types for the Peril game.
//!
//! Both sets are closed: the board has six territories and every unit is
//! one of three ranks. Wire and CLI spellings are lowercase.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Territories
// ---------------------------------------------------------------------------

/// A territory on the board.
///
/// Declaration order is significant: it is the order in which contested
/// locations are searched during war resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// North and South America.
    Americas,
    /// Europe.
    Europe,
    /// Africa.
    Africa,
    /// Asia.
    Asia,
    /// Antarctica.
    Antarctica,
    /// Australia.
    Australia,
}

impl Location {
    /// Every territory, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Americas,
        Self::Europe,
        Self::Africa,
        Self::Asia,
        Self::Antarctica,
        Self::Australia,
    ];

    /// The lowercase name used on the wire and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Americas => "americas",
            Self::Europe => "europe",
            Self::Africa => "africa",
            Self::Asia => "asia",
            Self::Antarctica => "antarctica",
            Self::Australia => "australia",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|location| location.as_str() == s)
            .ok_or_else(|| UnknownName::new("location", s))
    }
}

// ---------------------------------------------------------------------------
// Unit ranks
// ---------------------------------------------------------------------------

/// The combat class of a unit.
///
/// Declared weakest first; see [`UnitRank::power`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UnitRank {
    /// Foot soldiers.
    Infantry,
    /// Mounted troops.
    Cavalry,
    /// Heavy guns.
    Artillery,
}

impl UnitRank {
    /// Every rank, weakest first.
    pub const ALL: [Self; 3] = [Self::Infantry, Self::Cavalry, Self::Artillery];

    /// The lowercase name used on the wire and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infantry => "infantry",
            Self::Cavalry => "cavalry",
            Self::Artillery => "artillery",
        }
    }

    /// Combat power contributed by one unit of this rank.
    pub const fn power(self) -> u32 {
        match self {
            Self::Infantry => 1,
            Self::Cavalry => 5,
            Self::Artillery => 10,
        }
    }
}

impl fmt::Display for UnitRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitRank {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str() == s)
            .ok_or_else(|| UnknownName::new("rank", s))
    }
}

// ---------------------------------------------------------------------------
// Parse error
// ---------------------------------------------------------------------------

/// A name that does not belong to a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName {
    /// Which enumeration was being parsed (`"location"` or `"rank"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownName {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownName {}
