//! Error types for the peril-game crate.
//!
//! Only command input can fail. Event handlers never return errors: their
//! result is an acknowledgment verdict.

use peril_types::{Location, UnitId};

/// Bad command input. Reported to the user; no state is mutated and no
/// message is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Usernames must be a single word usable inside a routing key.
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Too few arguments for the command.
    #[error("usage: {usage}")]
    Usage {
        /// The expected invocation.
        usage: &'static str,
    },

    /// The location is not one of the six territories.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// The rank is not one of the three unit ranks.
    #[error("unknown rank: {0}")]
    UnknownRank(String),

    /// A unit id argument is not a number.
    #[error("invalid unit id: {0}")]
    InvalidUnitId(String),

    /// The referenced unit does not belong to this player.
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),

    /// The same unit id was given twice.
    #[error("unit {0} listed more than once")]
    DuplicateUnit(UnitId),

    /// The units of one move are not all at the same origin.
    #[error("unit {unit} is in {found}, not {expected} with the other units")]
    MixedOrigins {
        /// The first offending unit.
        unit: UnitId,
        /// Origin of the first listed unit.
        expected: Location,
        /// Where the offending unit actually is.
        found: Location,
    },

    /// The spam count is not an integer up to
    /// [`MAX_SPAM_COUNT`](crate::commands::MAX_SPAM_COUNT).
    #[error("invalid count: {0}")]
    InvalidCount(String),

    /// The per-player unit id counter is exhausted.
    #[error("no unit ids left")]
    UnitIdsExhausted,

    /// Spawning and moving are refused while the game is paused.
    #[error("the game is paused")]
    Paused,
}
