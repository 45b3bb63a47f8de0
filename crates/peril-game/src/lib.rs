//! Peril game logic.
//!
//! Each client process keeps a [`GameState`] replica. Local commands
//! mutate it directly; events from other players arrive through the
//! handlers in [`handlers`], which return acknowledgment verdicts instead
//! of errors.

pub mod combat;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod spam;
pub mod state;
pub mod terminal;

pub use commands::{Command, parse_username};
pub use error::ValidationError;
pub use outcome::{Battle, MoveOutcome, WarOutcome, WarResolution};
pub use state::{GameState, Replica, Status};
