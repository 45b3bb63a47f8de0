//! Deterministic battle resolution.
//!
//! Every replica that receives the same [`RecognitionOfWar`] computes the
//! same result, because the inputs are the two snapshots carried in the
//! message and nothing else.

use peril_types::{Location, Player, RecognitionOfWar, Unit};

/// Result of a battle, from a neutral point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    /// The attacker's power was strictly higher.
    AttackerWon,
    /// The defender's power was strictly higher.
    DefenderWon,
    /// Equal power.
    Draw,
}

/// First territory, in [`Location::ALL`] order, where both players have
/// units.
pub fn contested_location(attacker: &Player, defender: &Player) -> Option<Location> {
    Location::ALL
        .into_iter()
        .find(|&location| attacker.has_units_at(location) && defender.has_units_at(location))
}

/// Combined power of `units`.
pub fn power<'a>(units: impl IntoIterator<Item = &'a Unit>) -> u32 {
    units
        .into_iter()
        .fold(0u32, |total, unit| total.saturating_add(unit.rank.power()))
}

/// Fight at `location` using the snapshots in `war`.
pub fn fight(war: &RecognitionOfWar, location: Location) -> BattleResult {
    let attacker = power(war.attacker.units_at(location));
    let defender = power(war.defender.units_at(location));
    match attacker.cmp(&defender) {
        std::cmp::Ordering::Greater => BattleResult::AttackerWon,
        std::cmp::Ordering::Less => BattleResult::DefenderWon,
        std::cmp::Ordering::Equal => BattleResult::Draw,
    }
}
