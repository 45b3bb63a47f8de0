//! What an inbound event means for the local replica.

use std::fmt;

use peril_types::Location;

/// Classification of an incoming [`ArmyMove`](peril_types::ArmyMove).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move is this replica's own, echoed back by the broker.
    SamePlayer,
    /// No conflict at the destination.
    Safe,
    /// Units of two players now share the destination.
    MakeWar,
}

/// Classification of an incoming
/// [`RecognitionOfWar`](peril_types::RecognitionOfWar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarOutcome {
    /// This replica is neither attacker nor defender.
    NotInvolved,
    /// No territory holds units of both sides.
    NoUnits,
    /// The other side won.
    OpponentWon,
    /// This replica's side won.
    YouWon,
    /// Equal power.
    Draw,
}

/// A fought battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    /// Where it was fought.
    pub location: Location,
    /// Result from this replica's side.
    pub outcome: WarOutcome,
    /// Winner's username; the attacker on a draw.
    pub winner: String,
    /// Loser's username; the defender on a draw.
    pub loser: String,
    /// Local units destroyed by this resolution.
    pub units_lost: usize,
}

impl Battle {
    /// The audit-log line for this battle.
    pub fn log_message(&self) -> String {
        if self.outcome == WarOutcome::Draw {
            format!(
                "A war between {} and {} resulted in a draw",
                self.winner, self.loser
            )
        } else {
            format!("{} won a war against {}", self.winner, self.loser)
        }
    }
}

/// Full result of resolving a war recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarResolution {
    /// See [`WarOutcome::NotInvolved`].
    NotInvolved,
    /// See [`WarOutcome::NoUnits`].
    NoUnits,
    /// The battle took place.
    Fought(Battle),
}

impl WarResolution {
    /// The outcome alone.
    pub const fn outcome(&self) -> WarOutcome {
        match self {
            Self::NotInvolved => WarOutcome::NotInvolved,
            Self::NoUnits => WarOutcome::NoUnits,
            Self::Fought(battle) => battle.outcome,
        }
    }
}

impl fmt::Display for WarOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotInvolved => "not involved",
            Self::NoUnits => "no units",
            Self::OpponentWon => "opponent won",
            Self::YouWon => "you won",
            Self::Draw => "draw",
        };
        f.write_str(name)
    }
}
