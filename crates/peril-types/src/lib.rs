//! Shared type definitions for the Peril game.
//!
//! Every value that crosses the broker is defined here. Clients and the
//! coordinator exchange *snapshots* of these types; nothing in this crate
//! refers to live process state.
//!
//! # Modules
//!
//! - [`enums`] -- Closed sets: territories and unit ranks
//! - [`structs`] -- Units, players, and the message payloads
//! - [`routing`] -- Exchange names, routing keys, and queue names

pub mod enums;
pub mod routing;
pub mod structs;

pub use enums::{Location, UnitRank};
pub use structs::{ArmyMove, GameLog, Player, PlayingState, RecognitionOfWar, Unit, UnitId};
