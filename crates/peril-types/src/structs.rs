//! Core entity structs and message payloads.
//!
//! Payloads embed [`Player`] values by copy. A snapshot placed in a
//! published message is never touched again by its producer.

use core::fmt;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Location, UnitRank};

/// Identifier of a unit, unique within its owning player.
///
/// Allocated from a per-player counter and never reused, even after the
/// unit is destroyed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single army unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier within the owning player.
    pub id: UnitId,
    /// Territory the unit currently occupies.
    pub location: Location,
    /// Combat class.
    pub rank: UnitRank,
}

/// A player's full order of battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable, process-local identity.
    pub username: String,
    /// Units keyed by id.
    pub units: BTreeMap<UnitId, Unit>,
}

impl Player {
    /// A player with no units.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            units: BTreeMap::new(),
        }
    }

    /// Units stationed at `location`, in id order.
    pub fn units_at(&self, location: Location) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |unit| unit.location == location)
    }

    /// Whether at least one unit is stationed at `location`.
    pub fn has_units_at(&self, location: Location) -> bool {
        self.units_at(location).next().is_some()
    }
}

/// A move published by one player and consumed by every other replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyMove {
    /// Snapshot of the mover, with the moved units already at
    /// [`to_location`](Self::to_location).
    pub player: Player,
    /// The units that moved.
    pub units: Vec<Unit>,
    /// Destination territory.
    pub to_location: Location,
}

/// Two player snapshots captured when a war is triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionOfWar {
    /// The player whose move caused the conflict.
    pub attacker: Player,
    /// The player already holding the territory.
    pub defender: Player,
}

/// Broadcast pause/resume control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingState {
    /// `true` while the coordinator holds the game paused.
    pub is_paused: bool,
}

/// A write-once audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    /// When the record was written, by the writer's clock.
    pub current_time: DateTime<Utc>,
    /// The writer.
    pub username: String,
    /// Free text.
    pub message: String,
}

impl GameLog {
    /// A record stamped with the current time.
    pub fn now(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            current_time: Utc::now(),
            username: username.into(),
            message: message.into(),
        }
    }
}
